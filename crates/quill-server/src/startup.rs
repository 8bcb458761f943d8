//! Server startup utilities.

use quill_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r#"
   ____        _ _ _
  / __ \__  __(_) | |
 / / / / / / / / | |
/ /_/ / /_/ / / /| |
\___\_\__,_/_/_/ |_|   feed service
    "#
    );
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("Feed API:  http://{}/api/v1/posts", addr);
    info!("Health:    http://{}/health", addr);
    info!("API Docs:  http://{}/api-docs/openapi.json", addr);
    if config.observability.metrics_enabled {
        info!("Metrics:   http://{}{}", addr, config.observability.metrics_path);
    }
    info!(
        "Cache:     {} (ttl {}s)",
        if config.redis.enabled { "redis" } else { "memory" },
        config.cache.ttl_secs
    );
    info!("{}", separator);
}
