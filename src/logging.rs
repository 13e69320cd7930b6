use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Send tracing output to `path`. The terminal is busy drawing, so there is
/// no stderr logging. `RUST_LOG` overrides the default `info` level.
pub fn init_file_logging(path: &Path) -> Result<()> {
    let log_file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(())
}
