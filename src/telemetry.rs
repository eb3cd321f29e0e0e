//! Logging setup for binaries embedding the client.
//!
//! The library itself only emits `tracing` events. Applications that do not
//! install their own subscriber can call [`init`].

use std::env;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::error::{SlurmError, SlurmResult};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` (a plain level such as
/// `"debug"` or a full filter such as `"info,slurm_client=trace"`) is used,
/// falling back to `info`.
pub fn init(level: Option<&str>) -> SlurmResult<()> {
    let filter = if env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        parse_filter(level.unwrap_or("info"))?
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| SlurmError::validation(format!("failed to init logging: {e}")))
}

fn parse_filter(level: &str) -> SlurmResult<EnvFilter> {
    EnvFilter::builder()
        .parse(level.trim())
        .map_err(|e| SlurmError::validation(format!("invalid log level '{level}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert!(parse_filter("debug").is_ok());
        assert!(parse_filter("info,slurm_client=trace").is_ok());
        assert!(parse_filter("slurm_client=loud").is_err());
    }
}
