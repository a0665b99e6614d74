//! Structured logging setup.
//!
//! Two ways to get a subscriber:
//! - [`init_logging`] installs one process-wide, for binaries.
//! - [`log_dispatch`] / [`log_dispatch_with_writer`] build a [`Dispatch`] that a
//!   library caller can hand to the client, so the client's events go to the
//!   caller's sink without touching global state.

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `debug` or `gateway_sdk=debug,warn`
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Include the event target (module path)
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            json: false,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Create a configuration with the given filter directive
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Everything at `debug` when the client's debug flag is set, otherwise
    /// errors only.
    #[must_use]
    pub fn from_debug_flag(debug: bool) -> Self {
        Self::new(if debug { "debug" } else { "error" })
    }

    /// Switch to JSON output
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Toggle event targets
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::InvalidFilter {
            directive: self.level.clone(),
            message: e.to_string(),
        })
    }
}

/// Install the process-wide subscriber. `RUST_LOG`, when set, takes precedence
/// over the configured level.
///
/// # Errors
/// Returns error if the level is not a valid filter or a global subscriber is
/// already installed
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.filter()?,
    };

    let result = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .try_init()
    };

    result.map_err(|e| LoggingError::Init(e.to_string()))
}

/// Build a subscriber writing to stdout, without installing it
///
/// # Errors
/// Returns error if the level is not a valid filter
pub fn log_dispatch(config: &LoggingConfig) -> Result<Dispatch, LoggingError> {
    log_dispatch_with_writer(config, std::io::stdout)
}

/// Build a subscriber writing to `writer`, without installing it
///
/// # Errors
/// Returns error if the level is not a valid filter
pub fn log_dispatch_with_writer<W>(config: &LoggingConfig, writer: W) -> Result<Dispatch, LoggingError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = config.filter()?;

    let dispatch = if config.json {
        Dispatch::new(
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_target(config.with_target)
                .with_writer(writer)
                .finish(),
        )
    } else {
        Dispatch::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(config.with_target)
                .with_ansi(false)
                .with_writer(writer)
                .finish(),
        )
    };

    Ok(dispatch)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The level is not a valid filter directive
    #[error("Invalid log filter {directive:?}: {message}")]
    InvalidFilter {
        /// Offending directive
        directive: String,
        /// Parser message
        message: String,
    },
    /// Failed to install the global subscriber
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}
