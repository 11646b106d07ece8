pub mod catalog;
pub mod config;
pub mod geo;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod selection;
pub mod service;
pub mod state;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and examples embedding this crate.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the default filter.
/// Embedding applications that install their own subscriber should skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("imdaad core starting v{}", config::APP_VERSION);
}
