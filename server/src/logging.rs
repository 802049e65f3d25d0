use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{Result, ServerError};

pub const LOG_FILE: &str = "app.log";

/// Install the global subscriber: compact stdout plus an append-only `{log_dir}/app.log`.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .map_err(|e| ServerError::Config(format!("failed to install tracing subscriber: {e}")))
}
