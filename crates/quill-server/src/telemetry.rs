//! Logging and metrics setup.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use quill_config::ObservabilityConfig;
use quill_core::{QuillError, QuillResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the log filter: `RUST_LOG` wins, otherwise the configured level
/// with debug output for the feed crates and the HTTP layer.
#[must_use]
pub fn log_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},quill=debug,tower_http=debug",
            config.log_level.to_lowercase()
        ))
    })
}

/// Installs the global tracing subscriber.
///
/// A second call is a no-op.
pub fn init_logging(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(log_filter(config));

    let result = if config.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Installs the Prometheus recorder when metrics are enabled.
pub fn install_metrics(config: &ObservabilityConfig) -> QuillResult<Option<PrometheusHandle>> {
    if !config.metrics_enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| QuillError::internal(format!("Failed to install metrics recorder: {}", e)))?;
    quill_service::telemetry::register_metrics();

    Ok(Some(handle))
}
