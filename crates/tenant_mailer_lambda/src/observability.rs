//! Logging setup for the Lambda runtime.
//!
//! Emits one JSON object per event on stdout, which CloudWatch ingests as-is.
//! The filter comes from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_current_span(false)
        .try_init();
}
