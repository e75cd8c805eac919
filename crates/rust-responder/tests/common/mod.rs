//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use rust_responder::{Responder, SessionConfig};
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber; `RUST_LOG=debug` shows the driver's
/// line-by-line trace.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A configuration that keeps tests fast.
pub fn fast_config() -> SessionConfig {
    SessionConfig::new(Duration::from_secs(5)).submit_delay(Duration::ZERO)
}

/// A responder with [`fast_config`].
pub fn responder() -> Responder {
    init_tracing();
    Responder::new().with_config(fast_config())
}
