//! Plugin discovery: TOML manifests in per-kind directories, resolved against
//! a [`HandlerCatalog`] and pushed into a [`herald_registry::Registry`].
//!
//! A manifest names its handler either by catalog key or inline as a shell
//! command:
//!
//! ```toml
//! name = "ping"
//!
//! [text]
//! handler = "ping"
//!
//! [slash]
//! handler = { command = "./ping.sh", timeout = 5 }
//! descriptor = { name = "ping", description = "Replies with pong" }
//! ```

pub mod catalog;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod shell_handler;

pub use {
    catalog::HandlerCatalog,
    discovery::{LoadReport, PluginLoader, load_file, load_from_directory},
    error::{Error, PluginFailure, Result},
    manifest::{HandlerRef, PluginKind, ShellHandlerConfig},
    shell_handler::ShellHandler,
};
