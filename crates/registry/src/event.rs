use std::{fmt, sync::Arc};

use herald_common::Handler;

use crate::{
    error::{Error, Result},
    kind::EntryKind,
};

/// A handler for one platform event, e.g. `ready` or `messageCreate`.
pub struct Event {
    name: String,
    handler: Arc<dyn Handler>,
}

impl Event {
    /// # Errors
    ///
    /// [`Error::InvalidEntry`] when `name` is blank or contains a `.`, which
    /// would make its statistics bucket unreachable.
    pub fn new(name: impl Into<String>, handler: Arc<dyn Handler>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid(EntryKind::Event, name, "event name must not be empty"));
        }
        if name.contains('.') {
            return Err(Error::invalid(EntryKind::Event, name, "event name must not contain '.'"));
        }
        Ok(Self { name, handler })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("handler", &self.handler.name())
            .finish()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, herald_common::handler_fn, serde_json::Value};

    #[test]
    fn validates_names() {
        let noop = handler_fn("noop", |_| async { Ok::<_, anyhow::Error>(Value::Null) });
        assert_eq!(Event::new("ready", noop.clone()).unwrap().name(), "ready");
        assert!(Event::new("", noop.clone()).is_err());
        assert!(Event::new("guild.create", noop).is_err());
    }
}
