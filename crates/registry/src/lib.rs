//! Registration scaffolding for herald.
//!
//! Entries (commands, triggers, events, UI components and canned messages)
//! are built with validating builders and handed to a [`Registry`], either
//! directly through the `register_*` methods or as a [`PluginDefinition`]
//! through [`Registry::push`]. Registration stores the entry, bumps the
//! matching counter in the statistics tree, queues interaction descriptors
//! for slash commands and context menus, and subscribes event entries on the
//! [`EventBus`].

pub mod bus;
pub mod collection;
pub mod command;
pub mod component;
pub mod definition;
pub mod error;
pub mod event;
pub mod kind;
pub mod message;
pub mod registry;
pub mod trigger;

pub use {
    bus::{DispatchReport, EventBus, LocalEventBus},
    collection::Collection,
    command::{Command, CommandBuilder, CommandInfo, CommandModes, CommandRestrictions},
    component::{Component, ComponentBuilder, ComponentInfo},
    definition::PluginDefinition,
    error::{Error, Result},
    event::Event,
    kind::{ComponentKind, EntryKind},
    message::CannedMessage,
    registry::{Registry, RegistryOptions, RegistrySummary},
    trigger::{
        ChannelCondition, IdCondition, MessageCondition, Trigger, TriggerBlock, TriggerBuilder,
    },
};
