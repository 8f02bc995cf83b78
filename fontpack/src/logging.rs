//! Logging setup.
//!
//! Log output goes to stderr through a non-blocking writer so that command
//! output on stdout stays machine-readable. The level comes from the
//! caller's verbosity flags; no environment variables are read.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map `-q` and repeated `-v` flags to a level.
    ///
    /// Quiet wins over verbose. With neither flag the level is `Warn`.
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Error;
        }
        match verbose {
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Filter directive for this level.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Errors from logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Keeps the background log writer alive.
///
/// Buffered log lines are flushed when this is dropped, so hold it until the
/// process is about to exit.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Install the global log subscriber.
pub fn init_logging(level: LogLevel) -> Result<LoggingGuard, LoggingError> {
    let filter = EnvFilter::try_new(level.directive())?;
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;

    Ok(LoggingGuard { _guard: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(LogLevel::from_flags(false, 0), LogLevel::Warn);
        assert_eq!(LogLevel::from_flags(false, 1), LogLevel::Info);
        assert_eq!(LogLevel::from_flags(false, 2), LogLevel::Debug);
        assert_eq!(LogLevel::from_flags(false, 9), LogLevel::Trace);
        assert_eq!(LogLevel::from_flags(true, 3), LogLevel::Error);
    }

    #[test]
    fn test_directives_parse() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert!(EnvFilter::try_new(level.directive()).is_ok());
        }
    }
}
