//! Logging setup built on `log` + `fern`.
//!
//! Records always go to stderr so stdout stays clean for `--json` and `--plain`
//! output. When `logging.enabled` is set they are also appended to `ticky.log`.

use crate::config::LoggingConfig;
use crate::constants::LOG_FILE;
use anyhow::{Context, Result};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Effective level for a `-v` count and the configured default.
pub fn level_for(verbosity: u8, configured: &str) -> LevelFilter {
    let configured = LevelFilter::from_str(configured).unwrap_or(LevelFilter::Warn);
    let requested = match verbosity {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    configured.max(requested)
}

/// Path of the log file inside `config_dir`
pub fn log_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(LOG_FILE)
}

/// Install the global logger. Must be called at most once per process.
pub fn init(config: &LoggingConfig, verbosity: u8, config_dir: &Path) -> Result<()> {
    let level = level_for(verbosity, &config.level);

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(std::io::stderr());

    if config.enabled {
        std::fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create log directory: {}", config_dir.display()))?;
        let path = log_file_path(config_dir);
        let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch = dispatch.chain(file);
    }

    dispatch.apply().context("Failed to install logger")?;
    Ok(())
}
