//! Structured logging setup for hosts embedding the engine.
//!
//! The engine only emits `tracing` events; installing a subscriber is left to
//! the caller. [`init_tracing`] is a convenience for hosts that want JSON logs.
//!
//! # Telemetry invariants
//!
//! - **No key material or plaintext** appears in any event field. Events carry
//!   algorithm identifiers and error codes only.
//! - `RUST_LOG` takes precedence over the configured level.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global JSON-formatted subscriber filtered at `log_level`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .context("failed to initialise tracing subscriber")?;

    Ok(())
}
