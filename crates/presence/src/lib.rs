//! Presence statuses and the task that rotates through them.

pub mod activity;
pub mod rotation;

pub use {
    activity::{Activity, ActivityKind, Error},
    rotation::{DEFAULT_INTERVAL, PresenceHandle, PresenceRotation, PresenceSink},
};
