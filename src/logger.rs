use crate::config::Config;
use crate::error::{GenerationError, Result};
use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

static CONSOLE_LOGGER: Lazy<ConsoleLogger> = Lazy::new(ConsoleLogger::new);

pub fn init() -> Result<()> {
    init_with_config(LoggerConfig::default())
}

/// Installs the global logger. The config is only applied once the logger is
/// actually installed; a repeated call fails and leaves it untouched.
pub fn init_with_config(config: LoggerConfig) -> Result<()> {
    let filter = config.min_level.to_level_filter();
    let file = open_log_file(&config)?;

    log::set_logger(&*CONSOLE_LOGGER)
        .map_err(|e| GenerationError::ConfigError(format!("Failed to set logger: {}", e)))?;
    CONSOLE_LOGGER.apply(config, file);
    log::set_max_level(filter);
    Ok(())
}

fn open_log_file(config: &LoggerConfig) -> Result<Option<File>> {
    match &config.log_file_path {
        Some(path) => OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(Some)
            .map_err(|e| {
                GenerationError::ConfigError(format!("Cannot open log file {}: {}", path, e))
            }),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(GenerationError::ConfigError(format!(
                "Unknown log level '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level: record.level().into(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            file: record.file().map(str::to_string),
            line: record.line(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_target: bool,
    pub show_location: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_file_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_target: true,
            show_location: false,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_file_path: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_file_path = Some(path.to_string());
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_colors: true,
            show_location: true,
            ..Default::default()
        }
    }
}

/// Colored console logger behind the `log` facade; writes to stderr and,
/// optionally, appends to a file.
pub struct ConsoleLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ConsoleLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    fn apply(&self, config: LoggerConfig, file: Option<File>) {
        *guard(&self.log_file) = file;
        *guard(&self.config) = config;
    }
}

fn format_line(entry: &LogEntry, config: &LoggerConfig) -> String {
    if config.output_json {
        return serde_json::to_string(entry).unwrap_or_else(|_| entry.message.clone());
    }

    let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
    let level = format!("{:<5}", entry.level.as_str());
    let mut line = if config.show_colors {
        format!(
            "{} {} ",
            timestamp.bright_black(),
            level.color(entry.level.color()).bold()
        )
    } else {
        format!("{} {} ", timestamp, level)
    };

    if config.show_target {
        let target = format!("{}: ", entry.target);
        if config.show_colors {
            line.push_str(&target.bright_blue().to_string());
        } else {
            line.push_str(&target);
        }
    }

    line.push_str(&entry.message);

    if config.show_location {
        if let (Some(file), Some(no)) = (&entry.file, entry.line) {
            let location = format!(" ({}:{})", file, no);
            if config.show_colors {
                line.push_str(&location.bright_black().to_string());
            } else {
                line.push_str(&location);
            }
        }
    }

    line
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        LogLevel::from(metadata.level()) >= guard(&self.config).min_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry::from_record(record);
        let config = guard(&self.config).clone();

        let line = format_line(&entry, &config);
        let _ = writeln!(io::stderr(), "{}", line);

        if let Some(file) = guard(&self.log_file).as_mut() {
            let plain = LoggerConfig {
                show_colors: false,
                ..config
            };
            let _ = writeln!(file, "{}", format_line(&entry, &plain));
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = guard(&self.log_file).as_mut() {
            let _ = file.flush();
        }
    }
}

/// Logs how long a named operation took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("Started {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::debug!("Finished {} in {}ms", self.name, self.elapsed().as_millis());
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_config_info(config: &Config) {
    log::info!("Configuration loaded:");
    log::info!(
        "   Gemini API key: {}",
        if config.gemini.api_key.is_some() {
            "set"
        } else {
            "missing (every request will fall back)"
        }
    );
    log::info!("   Gemini base URL: {}", config.gemini.base_url);
    match config.gemini.timeout {
        Some(timeout) => log::info!("   Request timeout: {}s", timeout.as_secs()),
        None => log::info!("   Request timeout: none"),
    }
    log::info!("   Fallback base URL: {}", config.fallback.base_url);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            id: "test".to_string(),
            timestamp: Utc::now(),
            level,
            target: "genvisual::resolver".to_string(),
            message: message.to_string(),
            file: Some("src/resolver/mod.rs".to_string()),
            line: Some(42),
        }
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(LogLevel::Info.as_str(), "INFO");
        assert_eq!(LogLevel::Debug.color(), Color::Blue);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_logger_config_presets() {
        let config = LoggerConfig::development();
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.show_colors);

        let prod_config = LoggerConfig::production();
        assert!(!prod_config.show_colors);
        assert!(prod_config.output_json);
    }

    #[test]
    fn test_plain_line_format() {
        let config = LoggerConfig::development().with_colors(false);
        let line = format_line(&entry(LogLevel::Warn, "using fallback"), &config);
        assert!(line.contains("WARN "));
        assert!(line.contains("genvisual::resolver: using fallback"));
        assert!(line.ends_with("(src/resolver/mod.rs:42)"));
    }

    #[test]
    fn test_json_line_format() {
        let config = LoggerConfig::production();
        let line = format_line(&entry(LogLevel::Error, "boom"), &config);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "Error");
        assert_eq!(value["message"], "boom");
    }

    #[test]
    fn test_file_output_is_plain_and_appended() {
        let path = std::env::temp_dir().join(format!("genvisual-{}.log", Uuid::new_v4()));
        let config = LoggerConfig::development().with_file_output(path.to_str().unwrap());
        let logger = ConsoleLogger::new();
        let file = open_log_file(&config).unwrap();
        logger.apply(config, file);

        for message in ["saved to file", "and appended"] {
            log::Log::log(
                &logger,
                &Record::builder()
                    .args(format_args!("{}", message))
                    .level(Level::Warn)
                    .target("genvisual::resolver")
                    .build(),
            );
        }
        log::Log::flush(&logger);

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("genvisual::resolver: saved to file"));
        assert!(lines[1].ends_with("genvisual::resolver: and appended"));
        assert!(!written.contains("\u{1b}["));
    }

    #[test]
    fn test_unopenable_log_file_is_config_error() {
        let config = LoggerConfig::default().with_file_output("/nonexistent-dir/genvisual.log");
        assert!(matches!(
            open_log_file(&config),
            Err(GenerationError::ConfigError(_))
        ));
    }

    #[test]
    fn test_second_init_keeps_installed_config() {
        let _ = init_with_config(LoggerConfig::development());
        let before = guard(&CONSOLE_LOGGER.config).clone();

        assert!(init_with_config(LoggerConfig::production()).is_err());

        let after = guard(&CONSOLE_LOGGER.config).clone();
        assert_eq!(after.min_level, before.min_level);
        assert_eq!(after.output_json, before.output_json);
        assert_eq!(after.show_colors, before.show_colors);
    }
}
