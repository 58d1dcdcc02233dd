//! Tracing subscriber setup.
//!
//! The terminal UI owns the screen, so interactive runs log to a file.
//! Headless runs log to stderr.

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSettings, default_log_path};

pub fn init(settings: &LoggingSettings, to_stderr: bool) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| -> Box<dyn Error> { e })?;
        return Ok(());
    }

    let Some(path) = settings.file.clone().or_else(default_log_path) else {
        // Nowhere to write; keep the UI clean.
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init()
            .map_err(|e| -> Box<dyn Error> { e })?;
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
            .map_err(|e| -> Box<dyn Error> { e })?;
    Ok(())
}
