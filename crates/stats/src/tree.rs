//! The statistics tree and its dotted-path resolver.
//!
//! The tree is a plain nested map. Interior nodes group categories
//! (`commands`, `triggers`, `components`) and carry no counter of their own;
//! leaves carry one. `events` is both: it counts every registered event and
//! also holds one child bucket per event name, grown lazily by
//! [`StatisticsTree::ensure_event_bucket`].

use std::collections::BTreeMap;

use {
    serde::{Deserialize, Serialize},
    tracing::{trace, warn},
};

use crate::{
    counter::Counter,
    error::{Error, Result},
    paths,
};

#[derive(Debug, Clone, Default)]
struct Node {
    counter: Option<Counter>,
    children: BTreeMap<String, Node>,
}

impl Node {
    fn leaf() -> Self {
        Self {
            counter: Some(Counter::new()),
            children: BTreeMap::new(),
        }
    }

    fn group<const N: usize>(children: [(&str, Node); N]) -> Self {
        Self {
            counter: None,
            children: children
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        }
    }
}

/// Nested usage counters with a fixed shape plus per-event buckets.
#[derive(Debug, Clone)]
pub struct StatisticsTree {
    root: Node,
}

impl Default for StatisticsTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsTree {
    /// Build the tree with every counter at zero and no event buckets.
    pub fn new() -> Self {
        let root = Node::group([
            (
                paths::COMMANDS,
                Node::group([("text", Node::leaf()), ("slash", Node::leaf())]),
            ),
            (
                paths::TRIGGERS,
                Node::group([
                    ("message", Node::leaf()),
                    ("channel", Node::leaf()),
                    ("role", Node::leaf()),
                    ("user", Node::leaf()),
                ]),
            ),
            (paths::EVENTS, Node::leaf()),
            (
                paths::COMPONENTS,
                Node::group([
                    ("buttons", Node::leaf()),
                    ("contextMenus", Node::leaf()),
                    ("selectMenus", Node::leaf()),
                    ("modals", Node::leaf()),
                ]),
            ),
            (paths::PREDEFINED_MESSAGES, Node::leaf()),
        ]);
        Self { root }
    }

    /// Create the `events.<name>` bucket unless it already exists.
    ///
    /// Returns `true` when a new bucket was created. An existing bucket keeps
    /// its counts. Names that are empty or contain `.` cannot be addressed by
    /// a path and are refused.
    pub fn ensure_event_bucket(&mut self, name: &str) -> bool {
        if name.is_empty() || name.contains('.') {
            warn!(event = name, "event name is not a valid path segment, no bucket created");
            return false;
        }
        let Some(events) = self.root.children.get_mut(paths::EVENTS) else {
            return false;
        };
        if events.children.contains_key(name) {
            return false;
        }
        events.children.insert(name.to_string(), Node::leaf());
        trace!(event = name, "event bucket created");
        true
    }

    /// Add one to `registered` at `path`, returning the new value.
    ///
    /// # Errors
    ///
    /// [`Error::PathNotFound`] when `path` does not name a counter. The tree
    /// is left untouched in that case.
    pub fn increment_registered(&mut self, path: &str) -> Result<u64> {
        let value = self.resolve_mut(path)?.register();
        #[cfg(feature = "metrics")]
        herald_metrics::counter!(
            herald_metrics::stats::REGISTERED_TOTAL,
            herald_metrics::labels::PATH => path.to_string()
        )
        .increment(1);
        trace!(path, registered = value, "registered counter incremented");
        Ok(value)
    }

    /// Add one to `executed` at `path`, returning the new value.
    ///
    /// # Errors
    ///
    /// [`Error::PathNotFound`] when `path` does not name a counter. The tree
    /// is left untouched in that case.
    pub fn increment_executed(&mut self, path: &str) -> Result<u64> {
        let value = self.resolve_mut(path)?.execute();
        #[cfg(feature = "metrics")]
        herald_metrics::counter!(
            herald_metrics::stats::EXECUTED_TOTAL,
            herald_metrics::labels::PATH => path.to_string()
        )
        .increment(1);
        trace!(path, executed = value, "executed counter incremented");
        Ok(value)
    }

    /// Current value of the counter at `path`, if there is one.
    pub fn get(&self, path: &str) -> Option<Counter> {
        let mut node = &self.root;
        for segment in path.split('.') {
            if segment.is_empty() {
                return None;
            }
            node = node.children.get(segment)?;
        }
        node.counter
    }

    /// Names of all event buckets, sorted.
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.root
            .children
            .get(paths::EVENTS)
            .into_iter()
            .flat_map(|events| events.children.keys().map(String::as_str))
    }

    /// A serializable copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        let at = |path: &str| self.get(path).unwrap_or_default();
        StatsSnapshot {
            commands: CommandStats {
                text: at(paths::COMMANDS_TEXT),
                slash: at(paths::COMMANDS_SLASH),
            },
            triggers: TriggerStats {
                message: at(paths::TRIGGERS_MESSAGE),
                channel: at(paths::TRIGGERS_CHANNEL),
                role: at(paths::TRIGGERS_ROLE),
                user: at(paths::TRIGGERS_USER),
            },
            events: EventStats {
                total: at(paths::EVENTS),
                buckets: self
                    .event_names()
                    .map(|name| (name.to_string(), at(&paths::event(name))))
                    .collect(),
            },
            components: ComponentStats {
                buttons: at(paths::COMPONENTS_BUTTONS),
                context_menus: at(paths::COMPONENTS_CONTEXT_MENUS),
                select_menus: at(paths::COMPONENTS_SELECT_MENUS),
                modals: at(paths::COMPONENTS_MODALS),
            },
            predefined_messages: at(paths::PREDEFINED_MESSAGES),
        }
    }

    fn resolve_mut(&mut self, path: &str) -> Result<&mut Counter> {
        let mut node = &mut self.root;
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(missing(path));
            }
            node = node
                .children
                .get_mut(segment)
                .ok_or_else(|| missing(path))?;
        }
        node.counter
            .as_mut()
            .ok_or_else(|| missing(path))
    }
}

fn missing(path: &str) -> Error {
    #[cfg(feature = "metrics")]
    herald_metrics::counter!(
        herald_metrics::stats::PATH_NOT_FOUND_TOTAL,
        herald_metrics::labels::PATH => path.to_string()
    )
    .increment(1);
    Error::path_not_found(path)
}

// ── Snapshot ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub commands: CommandStats,
    pub triggers: TriggerStats,
    pub events: EventStats,
    pub components: ComponentStats,
    pub predefined_messages: Counter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStats {
    pub text: Counter,
    pub slash: Counter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerStats {
    pub message: Counter,
    pub channel: Counter,
    pub role: Counter,
    pub user: Counter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStats {
    /// Registered and executed across all events.
    pub total: Counter,
    /// Per-event buckets keyed by event name.
    pub buckets: BTreeMap<String, Counter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStats {
    pub buttons: Counter,
    pub context_menus: Counter,
    pub select_menus: Counter,
    pub modals: Counter,
}
