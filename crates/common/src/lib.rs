//! Shared error plumbing and the handler contract used across all herald crates.

pub mod error;
pub mod handler;

pub use {
    error::FromMessage,
    handler::{FnHandler, Handler, HandlerStats, handler_fn},
};
