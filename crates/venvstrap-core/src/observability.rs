//! Tracing initialization.
//!
//! Uses config::ObservabilityConfig for VENVSTRAP_QUIET, VENVSTRAP_LOG_LEVEL
//! and VENVSTRAP_LOG_JSON. Diagnostics go to stderr; stdout carries installer
//! output only.

use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize tracing. Call once at process startup.
/// When VENVSTRAP_QUIET=1 only WARN and above are logged.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "venvstrap=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("venvstrap=info"));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

/// Whether user-facing progress lines should be suppressed.
pub fn is_quiet() -> bool {
    ObservabilityConfig::from_env().quiet
}
