//! Metric name and label definitions.
//!
//! Every metric herald emits is named here so that dashboards and the code
//! agree on spelling.

/// Registration and usage counters mirrored from the statistics tree.
pub mod stats {
    /// Entries registered, labelled by statistics path
    pub const REGISTERED_TOTAL: &str = "herald_registered_total";
    /// Entries executed, labelled by statistics path
    pub const EXECUTED_TOTAL: &str = "herald_executed_total";
    /// Statistics lookups that hit an unknown path
    pub const PATH_NOT_FOUND_TOTAL: &str = "herald_stats_path_not_found_total";
}

/// Event bus and handler dispatch metrics
pub mod events {
    /// Total number of events dispatched on the local bus
    pub const DISPATCHED_TOTAL: &str = "herald_events_dispatched_total";
    /// Handler invocations that returned an error
    pub const HANDLER_ERRORS_TOTAL: &str = "herald_event_handler_errors_total";
    /// Handler invocations that panicked
    pub const HANDLER_PANICS_TOTAL: &str = "herald_event_handler_panics_total";
    /// Handler invocations that exceeded the configured timeout
    pub const HANDLER_TIMEOUTS_TOTAL: &str = "herald_event_handler_timeouts_total";
    /// Handler execution duration in seconds
    pub const HANDLER_DURATION_SECONDS: &str = "herald_event_handler_duration_seconds";
}

/// Plugin discovery metrics
pub mod plugins {
    /// Plugin definition files loaded successfully
    pub const LOADED_TOTAL: &str = "herald_plugins_loaded_total";
    /// Plugin definition files skipped (`example.*`)
    pub const SKIPPED_TOTAL: &str = "herald_plugins_skipped_total";
    /// Plugin definition files that failed to load
    pub const LOAD_ERRORS_TOTAL: &str = "herald_plugin_load_errors_total";
    /// Shell handler execution duration in seconds
    pub const SHELL_DURATION_SECONDS: &str = "herald_plugin_shell_duration_seconds";
}

/// Presence rotation metrics
pub mod presence {
    /// Presence updates sent to the platform
    pub const UPDATES_TOTAL: &str = "herald_presence_updates_total";
    /// Presence updates the platform rejected
    pub const UPDATE_ERRORS_TOTAL: &str = "herald_presence_update_errors_total";
    /// Number of presence rotations currently running
    pub const ROTATION_ACTIVE: &str = "herald_presence_rotation_active";
}

/// Host and process metrics
pub mod system {
    /// Resident memory of the bot process in bytes
    pub const PROCESS_MEMORY_BYTES: &str = "herald_process_memory_bytes";
    /// Gateway round-trip latency in milliseconds
    pub const PING_MILLISECONDS: &str = "herald_ping_milliseconds";
}

/// Common label keys
pub mod labels {
    pub const PATH: &str = "path";
    pub const EVENT: &str = "event";
    pub const KIND: &str = "kind";
    pub const HANDLER: &str = "handler";
}

/// Standard histogram buckets for different metric types
pub mod buckets {
    use once_cell::sync::Lazy;

    /// Event handler duration buckets (in seconds)
    /// Covers 1ms to 60s
    pub static HANDLER_DURATION: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ]
    });

    /// Shell handler duration buckets (in seconds)
    /// Covers 10ms to 5 minutes, process spawn dominates the low end
    pub static SHELL_DURATION: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
        ]
    });
}
