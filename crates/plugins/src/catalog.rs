use std::{collections::HashMap, fmt, path::Path, sync::Arc};

use herald_common::Handler;

use crate::{
    error::{Error, Result},
    manifest::HandlerRef,
    shell_handler::ShellHandler,
};

/// Native handlers the host application exposes to manifests by name.
#[derive(Clone, Default)]
pub struct HandlerCatalog {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handler` under `key`, returning any handler it replaces.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Option<Arc<dyn Handler>> {
        self.handlers.insert(key.into(), handler)
    }

    /// Builder form of [`insert`](Self::insert), keyed by the handler's own
    /// name.
    #[must_use]
    pub fn with(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.insert(handler.name().to_string(), handler);
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Turn a manifest reference into a handler. Shell handlers are named
    /// `label` and run in `working_dir`.
    pub fn resolve(
        &self,
        reference: &HandlerRef,
        label: &str,
        working_dir: Option<&Path>,
    ) -> Result<Arc<dyn Handler>> {
        match reference {
            HandlerRef::Named(key) => self.get(key).ok_or_else(|| Error::unknown_handler(key)),
            HandlerRef::Shell(config) => Ok(Arc::new(ShellHandler::from_config(
                label,
                config,
                working_dir,
            ))),
        }
    }
}

impl fmt::Debug for HandlerCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("HandlerCatalog")
            .field("handlers", &keys)
            .finish()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::manifest::ShellHandlerConfig,
        herald_common::handler_fn,
        serde_json::{Value, json},
    };

    #[tokio::test]
    async fn resolves_named_and_shell_handlers() {
        let catalog = HandlerCatalog::new().with(handler_fn("pong", |_| async {
            Ok::<_, anyhow::Error>(json!("pong"))
        }));
        assert_eq!(catalog.len(), 1);

        let named = catalog
            .resolve(&HandlerRef::Named("pong".into()), "ping", None)
            .unwrap();
        assert_eq!(named.name(), "pong");
        assert_eq!(named.handle(&Value::Null).await.unwrap(), json!("pong"));

        let shell = catalog
            .resolve(
                &HandlerRef::Shell(ShellHandlerConfig {
                    command: "echo 1".into(),
                    timeout: 5,
                    env: HashMap::new(),
                }),
                "ping:slash",
                None,
            )
            .unwrap();
        assert_eq!(shell.name(), "ping:slash");
        assert_eq!(shell.handle(&Value::Null).await.unwrap(), json!(1));
    }

    #[test]
    fn missing_key_is_unknown_handler() {
        let err = HandlerCatalog::new()
            .resolve(&HandlerRef::Named("nope".into()), "x", None)
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown handler 'nope'");
    }
}
