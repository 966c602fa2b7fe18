#![forbid(unsafe_code)]

//! Level-gated logging on top of `tracing`.
//!
//! A [`Logger`] owns a tag and a minimum [`LogLevel`]. Messages below the
//! minimum are dropped before they reach `tracing`; the rest are emitted as
//! events carrying the tag as a structured field, so any installed subscriber
//! decides where they end up.
//!
//! The default level is read from the `CTABS_LOG` environment variable via
//! [`LogLevel::from_env`]. Unknown or missing values fall back to
//! [`LogLevel::Info`].

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::condition::{IllegalArgument, ensure_not_empty};

/// Environment variable consulted by [`LogLevel::from_env`].
pub const LOG_LEVEL_ENV: &str = "CTABS_LOG";

/// Minimum severity a [`Logger`] lets through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    All,
    Verbose,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Numeric rank, `All` = 0 through `Off` = 6.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::All => 0,
            Self::Verbose => 1,
            Self::Debug => 2,
            Self::Info => 3,
            Self::Warn => 4,
            Self::Error => 5,
            Self::Off => 6,
        }
    }

    /// Whether a message at `level` passes a logger configured with `self`.
    #[must_use]
    pub const fn is_enabled(self, level: LogLevel) -> bool {
        self.priority() <= level.priority()
    }

    /// Read the level from [`LOG_LEVEL_ENV`].
    #[must_use]
    pub fn from_env() -> Self {
        let raw = env::var(LOG_LEVEL_ENV).ok();
        Self::from_env_value(raw.as_deref())
    }

    /// Resolve an optional raw environment value, falling back to `Info`.
    #[must_use]
    pub fn from_env_value(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse().ok())
            .unwrap_or(Self::Info)
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn as_filter_directive(self) -> &'static str {
        match self {
            Self::All | Self::Verbose => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Off => "off",
        };
        f.write_str(name)
    }
}

/// A string did not name a [`LogLevel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLogLevelError(String);

impl fmt::Display for ParseLogLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level: {}", self.0)
    }
}

impl std::error::Error for ParseLogLevelError {}

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "verbose" | "trace" => Ok(Self::Verbose),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "off" | "none" => Ok(Self::Off),
            _ => Err(ParseLogLevelError(s.to_owned())),
        }
    }
}

/// Tagged logger that filters by [`LogLevel`] before emitting `tracing` events.
#[derive(Debug, Clone)]
pub struct Logger {
    tag: String,
    level: LogLevel,
}

impl Logger {
    /// Create a logger that lets everything through.
    pub fn new(tag: &str) -> Result<Self, IllegalArgument> {
        Self::with_level(tag, LogLevel::All)
    }

    /// Create a logger with an explicit minimum level.
    pub fn with_level(tag: &str, level: LogLevel) -> Result<Self, IllegalArgument> {
        let tag = ensure_not_empty(tag, "The tag may not be empty")?;
        Ok(Self {
            tag: tag.to_owned(),
            level,
        })
    }

    /// Logger for a component with a compile-time tag.
    #[must_use]
    pub fn component(tag: &'static str, level: LogLevel) -> Self {
        debug_assert!(!tag.is_empty(), "component tag may not be empty");
        Self {
            tag: tag.to_owned(),
            level,
        }
    }

    /// Create a logger whose level comes from [`LOG_LEVEL_ENV`].
    pub fn from_env(tag: &str) -> Result<Self, IllegalArgument> {
        Self::with_level(tag, LogLevel::from_env())
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.level
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    pub fn log_verbose(&self, message: &str) {
        if self.level.is_enabled(LogLevel::Verbose) {
            tracing::trace!(tag = %self.tag, "{message}");
        }
    }

    pub fn log_debug(&self, message: &str) {
        if self.level.is_enabled(LogLevel::Debug) {
            tracing::debug!(tag = %self.tag, "{message}");
        }
    }

    pub fn log_info(&self, message: &str) {
        if self.level.is_enabled(LogLevel::Info) {
            tracing::info!(tag = %self.tag, "{message}");
        }
    }

    pub fn log_warn(&self, message: &str) {
        if self.level.is_enabled(LogLevel::Warn) {
            tracing::warn!(tag = %self.tag, "{message}");
        }
    }

    pub fn log_error(&self, message: &str) {
        if self.level.is_enabled(LogLevel::Error) {
            tracing::error!(tag = %self.tag, "{message}");
        }
    }

    /// Log an error together with its cause chain, see [`error_report`].
    pub fn log_error_with(&self, message: &str, cause: &dyn std::error::Error) {
        if self.level.is_enabled(LogLevel::Error) {
            tracing::error!(tag = %self.tag, error = %error_report(cause), "{message}");
        }
    }
}

/// Render `error` followed by one `Caused by: ` line per source.
///
/// ```
/// use ctabs_core::IllegalArgument;
/// use ctabs_core::logging::error_report;
///
/// let report = error_report(&IllegalArgument::new("bad index"));
/// assert_eq!(report, "illegal argument: bad index");
/// ```
#[must_use]
pub fn error_report(error: &dyn std::error::Error) -> String {
    let mut report = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        report.push_str("\nCaused by: ");
        report.push_str(&cause.to_string());
        source = cause.source();
    }
    report
}

/// Install a JSON `tracing` subscriber filtered at `level`.
///
/// Returns `false` when a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber(level: LogLevel) -> bool {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(level.as_filter_directive()))
        .try_init()
        .is_ok()
}
