//! Tracing subscriber setup.
//!
//! Logs go to stderr, or to the configured file, so that traces written to
//! stdout stay machine-readable. `RUST_LOG` overrides the configured filter.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::RigResult;

/// Install the global subscriber.
///
/// Fails only when the log file cannot be opened. A subscriber installed
/// earlier is left in place.
pub fn init_logging(config: &LoggingConfig) -> RigResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let writer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(writer);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).ok();
    } else {
        let subscriber = builder
            .with_target(true)
            .with_ansi(config.file.is_none())
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let config = LoggingConfig {
            file: Some("/nonexistent-camrig-dir/rig.log".into()),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }
}
