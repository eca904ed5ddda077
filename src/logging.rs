/// Tracing setup.
///
/// The terminal is in raw mode on the alternate screen while playing, so
/// log lines go to a file instead of stderr. `RUST_LOG` overrides the
/// configured level. Any failure here just leaves logging off.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Returns true if a subscriber was installed.
pub fn init(cfg: &LogConfig) -> bool {
    if cfg.file.is_empty() { return false; }

    let file = match OpenOptions::new().create(true).append(true).open(&cfg.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", cfg.file);
            return false;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
