//! Structured logging setup.
//!
//! Installs a `tracing` subscriber built from [`LoggingConfig`]: one layer per
//! enabled output, each filtered by `RUST_LOG` when set and by the configured
//! level otherwise.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{CodecError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// Fails if the configuration is invalid, the log file cannot be opened, or a
/// global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(CodecError::ConfigError(errors.join("; ")));
    }

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.log_to_console {
        layers.push(console_layer(config));
    }

    if config.log_to_file {
        if let Some(path) = &config.log_file_path {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            layers.push(file_layer(config, file));
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| CodecError::ConfigError(format!("Failed to install subscriber: {e}")))?;

    info!(
        app = %config.app_name,
        level = %config.log_level,
        "Logging initialized"
    );
    Ok(())
}

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy()
}

fn console_layer(config: &LoggingConfig) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);
    match config.format {
        LogFormat::Compact => layer.compact().with_filter(filter(config)).boxed(),
        LogFormat::Json => layer.json().with_filter(filter(config)).boxed(),
    }
}

fn file_layer(config: &LoggingConfig, file: std::fs::File) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);
    match config.format {
        LogFormat::Compact => layer.compact().with_filter(filter(config)).boxed(),
        LogFormat::Json => layer.json().with_filter(filter(config)).boxed(),
    }
}
