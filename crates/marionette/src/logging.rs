//! Tracing subscriber setup for test binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is up
//! to the embedder. These helpers cover the common cases. `RUST_LOG`
//! overrides the filter passed in.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::result::{MarionetteError, MarionetteResult};

/// Default filter when neither the caller nor `RUST_LOG` sets one
pub const DEFAULT_FILTER: &str = "marionette=info";

fn filter(default_filter: &str) -> MarionetteResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| MarionetteError::config(format!("invalid log filter: {e}"))),
    }
}

/// Install a human-readable subscriber on stderr.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> MarionetteResult<bool> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true);
    let subscriber = Registry::default().with(filter(default_filter)?).with(layer);
    Ok(tracing::subscriber::set_global_default(subscriber).is_ok())
}

/// Install a JSON subscriber on stderr, one object per line
pub fn init_json(default_filter: &str) -> MarionetteResult<bool> {
    let layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_thread_names(true);
    let subscriber = Registry::default().with(filter(default_filter)?).with(layer);
    Ok(tracing::subscriber::set_global_default(subscriber).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_config_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = init("marionette=notalevel").unwrap_err();
        assert!(matches!(err, MarionetteError::Config { .. }));
    }

    #[test]
    fn test_second_init_reports_false() {
        let _ = init(DEFAULT_FILTER).unwrap();
        assert!(!init_json(DEFAULT_FILTER).unwrap());
    }
}
