//! Logging and metrics initialisation for host binaries.

use {
    herald_config::LoggingConfig,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::error::{Error, Result};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level` when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init()
    };
    installed.map_err(|e| Error::message(format!("failed to install tracing subscriber: {e}")))
}

/// Install the metrics recorder described by `config`, labelling every
/// metric with the bot id when one is configured.
#[cfg(feature = "metrics")]
pub fn init_metrics(
    config: &herald_config::MetricsConfig,
    bot_id: Option<&str>,
) -> Result<herald_metrics::MetricsHandle> {
    let global_labels = bot_id
        .map(|id| vec![("bot_id".to_string(), id.to_string())])
        .unwrap_or_default();
    Ok(herald_metrics::init_metrics(
        herald_metrics::MetricsRecorderConfig {
            enabled: config.enabled,
            global_labels,
        },
    )?)
}
