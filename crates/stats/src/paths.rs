//! Well-known statistics paths.

pub const COMMANDS: &str = "commands";
pub const COMMANDS_TEXT: &str = "commands.text";
pub const COMMANDS_SLASH: &str = "commands.slash";

pub const TRIGGERS: &str = "triggers";
pub const TRIGGERS_MESSAGE: &str = "triggers.message";
pub const TRIGGERS_CHANNEL: &str = "triggers.channel";
pub const TRIGGERS_ROLE: &str = "triggers.role";
pub const TRIGGERS_USER: &str = "triggers.user";

pub const EVENTS: &str = "events";

pub const COMPONENTS: &str = "components";
pub const COMPONENTS_BUTTONS: &str = "components.buttons";
pub const COMPONENTS_CONTEXT_MENUS: &str = "components.contextMenus";
pub const COMPONENTS_SELECT_MENUS: &str = "components.selectMenus";
pub const COMPONENTS_MODALS: &str = "components.modals";

pub const PREDEFINED_MESSAGES: &str = "predefinedMessages";

/// Path of the per-event bucket for `event`.
pub fn event(event: &str) -> String {
    format!("{EVENTS}.{event}")
}
