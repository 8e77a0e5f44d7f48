//! Buttons, context menus, select menus and modals.

use std::{fmt, sync::Arc};

use {
    herald_common::Handler,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::{
    error::{Error, Result},
    kind::{ComponentKind, EntryKind},
};

/// Descriptive metadata for help listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentInfo {
    pub name: String,
    pub description: String,
    /// Free-form type label, e.g. `utility`.
    #[serde(rename = "type")]
    pub type_label: String,
}

pub struct Component {
    kind: ComponentKind,
    name: String,
    info: ComponentInfo,
    descriptor: Option<Value>,
    handler: Arc<dyn Handler>,
}

impl Component {
    pub fn builder(kind: ComponentKind, name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder {
            kind,
            name: name.into(),
            info: ComponentInfo::default(),
            descriptor: None,
            handler: None,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> &ComponentInfo {
        &self.info
    }

    /// Platform descriptor. Always present for context menus.
    pub fn descriptor(&self) -> Option<&Value> {
        self.descriptor.as_ref()
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

pub struct ComponentBuilder {
    kind: ComponentKind,
    name: String,
    info: ComponentInfo,
    descriptor: Option<Value>,
    handler: Option<Arc<dyn Handler>>,
}

impl ComponentBuilder {
    #[must_use]
    pub fn info(mut self, info: ComponentInfo) -> Self {
        self.info = info;
        self
    }

    #[must_use]
    pub fn descriptor(mut self, descriptor: Value) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    #[must_use]
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// # Errors
    ///
    /// [`Error::InvalidEntry`] when the name is blank, the handler is
    /// missing, or a context menu has no descriptor.
    pub fn build(self) -> Result<Component> {
        let kind = EntryKind::Component(self.kind);
        if self.name.trim().is_empty() {
            return Err(Error::invalid(kind, self.name, "name must not be empty"));
        }
        let Some(handler) = self.handler else {
            return Err(Error::invalid(kind, self.name, "a handler is required"));
        };
        if self.kind.is_interaction() && !self.descriptor.as_ref().is_some_and(Value::is_object) {
            return Err(Error::invalid(
                kind,
                self.name,
                "context menus need a JSON object descriptor",
            ));
        }
        Ok(Component {
            kind: self.kind,
            name: self.name,
            info: self.info,
            descriptor: self.descriptor,
            handler,
        })
    }
}
