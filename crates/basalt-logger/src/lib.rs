//! Process-wide logger behind the `log` facade.
//!
//! Lines look like `[INFO] 2024-05-01 12:00:00 CEST basalt_server: message`.

pub mod severity;
pub mod time;

pub use severity::LogSeverity;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::Lazy;
use std::io::Write;

/// Forces DEBUG output regardless of the configured level.
pub const DEBUG_ENV_VAR: &str = "BASALT_DEBUG";

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger);

struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            LogSeverity::from(record.level()),
            &time::now(),
            record.target(),
            &record.args().to_string(),
        );
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

pub fn format_line(severity: LogSeverity, time: &str, target: &str, message: &str) -> String {
    format!("[{}] {} {}: {}", severity, time, target, message)
}

/// Parses a level name such as `info` or `debug`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

/// The configured level, raised to DEBUG when the debug variable is set.
pub fn effective_level(configured: LevelFilter, debug_override: bool) -> LevelFilter {
    if debug_override {
        configured.max(LevelFilter::Debug)
    } else {
        configured
    }
}

/// Installs the logger. Fails if another logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&*LOGGER)?;
    let debug_override = std::env::var_os(DEBUG_ENV_VAR).is_some();
    log::set_max_level(effective_level(level, debug_override));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line(
                LogSeverity::Warning,
                "2024-05-01 12:00:00 UTC",
                "basalt_server::connection",
                "127.0.0.1:5000 timed out"
            ),
            "[WARNING] 2024-05-01 12:00:00 UTC basalt_server::connection: 127.0.0.1:5000 timed out"
        );
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info"), Some(LevelFilter::Info));
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" warn "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_effective_level() {
        assert_eq!(
            effective_level(LevelFilter::Info, false),
            LevelFilter::Info
        );
        assert_eq!(
            effective_level(LevelFilter::Info, true),
            LevelFilter::Debug
        );
        assert_eq!(
            effective_level(LevelFilter::Trace, true),
            LevelFilter::Trace
        );
    }

    #[test]
    fn test_init_only_once() {
        let first = init(LevelFilter::Info);
        let second = init(LevelFilter::Info);
        assert!(first.is_ok() || second.is_err());
        assert!(second.is_err());
    }
}
