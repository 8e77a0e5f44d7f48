use std::{fmt, sync::Arc};

use {herald_common::Handler, serde_json::Value};

use crate::{
    error::{Error, Result},
    kind::EntryKind,
};

/// A reusable message whose content is produced on demand.
pub struct CannedMessage {
    name: String,
    display_name: String,
    producer: Arc<dyn Handler>,
}

impl CannedMessage {
    /// # Errors
    ///
    /// [`Error::InvalidEntry`] when `name` is blank.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        producer: Arc<dyn Handler>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid(EntryKind::CannedMessage, name, "name must not be empty"));
        }
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            name.clone()
        } else {
            display_name
        };
        Ok(Self {
            name,
            display_name,
            producer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Produce the message content.
    pub async fn value(&self, payload: &Value) -> anyhow::Result<Value> {
        self.producer.handle(payload).await
    }

    pub(crate) fn with_producer(self, producer: Arc<dyn Handler>) -> Self {
        Self { producer, ..self }
    }

    pub(crate) fn producer(&self) -> &Arc<dyn Handler> {
        &self.producer
    }
}

impl fmt::Debug for CannedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CannedMessage")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, herald_common::handler_fn, serde_json::json};

    #[tokio::test]
    async fn produces_value_and_defaults_display_name() {
        let rules = CannedMessage::new(
            "rules",
            "",
            handler_fn("rules", |_| async { Ok::<_, anyhow::Error>(json!({"content": "Be nice"})) }),
        )
        .unwrap();
        assert_eq!(rules.display_name(), "rules");
        assert_eq!(rules.value(&Value::Null).await.unwrap()["content"], "Be nice");
    }
}
