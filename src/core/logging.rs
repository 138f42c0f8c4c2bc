//! Logger initialization.

use anyhow::Result;
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;

/// Initialize logging to both the terminal and a file.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Errors
/// Fails if the log file cannot be created or a logger is already installed.
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to create log file {}: {}", log_file_path, e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}
