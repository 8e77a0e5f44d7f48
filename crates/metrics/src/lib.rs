//! Metrics collection and export for herald.
//!
//! Crates record through the `metrics` facade, gated behind their own
//! `metrics` feature. Nothing is exported until a recorder is installed with
//! [`init_metrics`]; with the `prometheus` feature that recorder renders the
//! Prometheus text format.
//!
//! ```rust,ignore
//! use herald_metrics::{counter, labels, stats};
//!
//! counter!(stats::REGISTERED_TOTAL, labels::PATH => "commands.text").increment(1);
//! ```

mod definitions;
mod error;
mod recorder;

pub use {
    definitions::*,
    error::{Error, Result},
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
