use std::fmt;

use serde::{Deserialize, Serialize};

/// The four UI component families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Button,
    ContextMenu,
    Modal,
    SelectMenu,
}

impl ComponentKind {
    pub const ALL: [Self; 4] = [
        Self::Button,
        Self::ContextMenu,
        Self::SelectMenu,
        Self::Modal,
    ];

    /// Statistics path counting components of this kind.
    pub fn stats_path(self) -> &'static str {
        use herald_stats::paths;
        match self {
            Self::Button => paths::COMPONENTS_BUTTONS,
            Self::ContextMenu => paths::COMPONENTS_CONTEXT_MENUS,
            Self::Modal => paths::COMPONENTS_MODALS,
            Self::SelectMenu => paths::COMPONENTS_SELECT_MENUS,
        }
    }

    /// Context menus are application commands and must be published.
    pub fn is_interaction(self) -> bool {
        matches!(self, Self::ContextMenu)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Button => "button",
            Self::ContextMenu => "context menu",
            Self::Modal => "modal",
            Self::SelectMenu => "select menu",
        })
    }
}

/// Every kind of registrable entry, used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Command,
    Trigger,
    Event,
    Component(ComponentKind),
    CannedMessage,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => f.write_str("command"),
            Self::Trigger => f.write_str("trigger"),
            Self::Event => f.write_str("event"),
            Self::Component(kind) => fmt::Display::fmt(kind, f),
            Self::CannedMessage => f.write_str("canned message"),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(ComponentKind::Button, "components.buttons", "button")]
    #[case(ComponentKind::ContextMenu, "components.contextMenus", "context menu")]
    #[case(ComponentKind::SelectMenu, "components.selectMenus", "select menu")]
    #[case(ComponentKind::Modal, "components.modals", "modal")]
    fn component_kind_paths_and_labels(
        #[case] kind: ComponentKind,
        #[case] path: &str,
        #[case] label: &str,
    ) {
        assert_eq!(kind.stats_path(), path);
        assert_eq!(kind.to_string(), label);
        assert_eq!(
            EntryKind::Component(kind).to_string(),
            label,
            "entry kind delegates to the component label"
        );
    }

    #[test]
    fn only_context_menus_are_interactions() {
        let interactions: Vec<_> = ComponentKind::ALL
            .into_iter()
            .filter(|k| k.is_interaction())
            .collect();
        assert_eq!(interactions, vec![ComponentKind::ContextMenu]);
    }
}
