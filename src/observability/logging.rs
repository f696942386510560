//! Logging configuration and subscriber setup.
//!
//! Builds a `tracing-subscriber` stack with an `EnvFilter`, so `RUST_LOG`
//! overrides the configured level when set.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human-readable output.
    Pretty,
    /// One JSON object per event.
    Json,
    /// Single-line output.
    #[default]
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level when `RUST_LOG` is unset.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Include the module target in each line.
    pub include_target: bool,
    /// Write to the test harness's captured output instead of stdout.
    pub test_writer: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            include_target: true,
            test_writer: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration suited to `cargo test`: debug level, captured output.
    pub fn for_tests() -> Self {
        Self {
            level: LogLevel::Debug,
            test_writer: true,
            ..Self::default()
        }
    }

    /// Sets the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from(self.level).into())
            .from_env_lossy()
    }
}

/// Installs a global subscriber.
///
/// Returns false when one was already installed, which is expected when
/// several tests call this.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = config.env_filter();
    let registry = tracing_subscriber::registry().with(filter);

    let result = match (config.format, config.test_writer) {
        (LogFormat::Json, true) => registry
            .with(fmt::layer().json().with_target(config.include_target).with_test_writer())
            .try_init(),
        (LogFormat::Json, false) => registry
            .with(fmt::layer().json().with_target(config.include_target))
            .try_init(),
        (LogFormat::Pretty, true) => registry
            .with(fmt::layer().pretty().with_target(config.include_target).with_test_writer())
            .try_init(),
        (LogFormat::Pretty, false) => registry
            .with(fmt::layer().pretty().with_target(config.include_target))
            .try_init(),
        (LogFormat::Compact, true) => registry
            .with(fmt::layer().compact().with_target(config.include_target).with_test_writer())
            .try_init(),
        (LogFormat::Compact, false) => registry
            .with(fmt::layer().compact().with_target(config.include_target))
            .try_init(),
    };

    result.is_ok()
}
