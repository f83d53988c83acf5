//! Logging setup shared by the desktop app and the proxy.
//!
//! Info and above goes to the terminal; debug and above also goes to
//! `<local data dir>/AudioConvert/logs/<name>.log`.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;

pub fn log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("AudioConvert").join("logs"))
}

pub fn log_file_path(name: &str) -> Option<PathBuf> {
    log_directory().map(|dir| dir.join(format!("{name}.log")))
}

fn config() -> simplelog::Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build()
}

/// Returns the log file in use, or `None` when only the terminal is logged to.
pub fn init_logging(name: &str) -> Option<PathBuf> {
    let Some(log_path) = log_file_path(name) else {
        eprintln!("Warning: Could not determine log directory");
        init_terminal_only();
        return None;
    };

    if let Some(dir) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Warning: Could not create log directory: {}", e);
            init_terminal_only();
            return None;
        }
    }

    if fs::metadata(&log_path).is_ok_and(|meta| meta.len() > ROTATE_AT_BYTES) {
        let _ = fs::rename(&log_path, log_path.with_extension("log.old"));
    }

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_terminal_only();
            return None;
        }
    };

    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(LevelFilter::Info, config(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Debug, config(), log_file),
    ];
    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::info!("=== {name} session started ===");
    log::info!("Log file: {}", log_path.display());
    Some(log_path)
}

fn init_terminal_only() {
    let loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Info,
        config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let _ = CombinedLogger::init(loggers);
}
