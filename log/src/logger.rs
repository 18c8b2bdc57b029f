use crate::{LogError, LogLevel, Logger, set_logger};
use dirs::data_dir;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Console logger that mirrors every accepted line into a log file.
pub struct AdvancedLogger {
    level: AtomicU8,
    log_file: Option<PathBuf>,
}

impl AdvancedLogger {
    /// Creates a logger. When `log_file` is given, a previous file at that
    /// path is archived first; if the file cannot be prepared the logger
    /// falls back to console only.
    pub fn new(level: LogLevel, log_file: Option<PathBuf>) -> Self {
        let log_file = log_file.and_then(|file| match prepare_log_file(&file) {
            Ok(()) => Some(file),
            Err(e) => {
                eprintln!("{e}");
                None
            }
        });

        AdvancedLogger {
            level: AtomicU8::new(level.as_u8()),
            log_file,
        }
    }

    /// Installs a global logger writing to `<data dir>/<app>/latest.log`.
    pub fn init(app: &str, log_level: LogLevel) -> Result<(), LogError> {
        let log_file = data_dir().map(|dir| dir.join(app).join("latest.log"));
        let logger = Arc::new(AdvancedLogger::new(log_level, log_file));

        set_logger(logger)
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Archives an existing log as `<timestamp>.7z` next to it and creates a
/// fresh empty file.
fn prepare_log_file(file: &Path) -> Result<(), LogError> {
    if file.exists() {
        archive_log_file(file);
    }

    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| LogError::LogFile(format!("{}: {e}", parent.display())))?;
    }

    std::fs::File::create(file)
        .map_err(|e| LogError::LogFile(format!("{}: {e}", file.display())))?;

    Ok(())
}

fn archive_log_file(file: &Path) {
    let mut renamed = file.to_path_buf();
    renamed.set_file_name(format!(
        "{}.log",
        chrono::Local::now().format("%d%m%Y_%H%M%S")
    ));

    if let Err(e) = std::fs::rename(file, &renamed) {
        eprintln!("Failed to rename existing log file: {e}");
        return;
    }

    let compressed = renamed.with_extension("7z");
    match sevenz_rust2::compress_to_path(&renamed, &compressed) {
        Ok(()) => {
            std::fs::remove_file(&renamed)
                .unwrap_or_else(|e| eprintln!("Failed to remove old log file: {e}"));
        }
        // keep the uncompressed copy
        Err(e) => eprintln!("Failed to compress file: {e}"),
    }
}

fn log_to_file(log_file: &Path, message: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_file)?;
    writeln!(file, "{message}")?;
    Ok(())
}

impl Logger for AdvancedLogger {
    fn set_level(&self, level: LogLevel) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.level().allows(level) {
            return;
        }

        let timestamp = chrono::Local::now().format("%d%m%Y %H:%M:%S");
        println!("{timestamp} - [{level}] - {message}");

        if let Some(ref file) = self.log_file {
            let line = format!("{} - [{}] - {}", timestamp, level.raw_str(), message);
            log_to_file(file, &line)
                .unwrap_or_else(|e| eprintln!("Failed to write to log file: {e}"));
        }
    }
}
