//! Tracing setup for the binary.
//!
//!   RUST_LOG=todolists=debug todolists lists   # fine-grained control
//!   todolists --debug lists                     # debug unless RUST_LOG is set

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

fn filter(debug: bool) -> EnvFilter {
    let default = if debug { "debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Compact logs on stderr, keeping stdout for command output.
pub fn init_tracing(debug: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Appends to a log file; used while the terminal UI owns the screen.
pub fn init_file_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter(true))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow!(err))
}
