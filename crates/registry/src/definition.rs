use crate::{
    command::Command,
    component::Component,
    event::Event,
    kind::EntryKind,
    message::CannedMessage,
    trigger::Trigger,
};

/// One discovered entry on its way into the registry.
#[derive(Debug)]
pub enum PluginDefinition {
    Command(Command),
    Trigger(Trigger),
    Event(Event),
    Component(Component),
    CannedMessage(CannedMessage),
}

impl PluginDefinition {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Command(_) => EntryKind::Command,
            Self::Trigger(_) => EntryKind::Trigger,
            Self::Event(_) => EntryKind::Event,
            Self::Component(c) => EntryKind::Component(c.kind()),
            Self::CannedMessage(_) => EntryKind::CannedMessage,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Command(c) => c.name(),
            Self::Trigger(t) => t.name(),
            Self::Event(e) => e.name(),
            Self::Component(c) => c.name(),
            Self::CannedMessage(m) => m.name(),
        }
    }
}

impl From<Command> for PluginDefinition {
    fn from(value: Command) -> Self {
        Self::Command(value)
    }
}

impl From<Trigger> for PluginDefinition {
    fn from(value: Trigger) -> Self {
        Self::Trigger(value)
    }
}

impl From<Event> for PluginDefinition {
    fn from(value: Event) -> Self {
        Self::Event(value)
    }
}

impl From<Component> for PluginDefinition {
    fn from(value: Component) -> Self {
        Self::Component(value)
    }
}

impl From<CannedMessage> for PluginDefinition {
    fn from(value: CannedMessage) -> Self {
        Self::CannedMessage(value)
    }
}
