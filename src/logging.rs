//! Structured logging for the trigger builder.
//!
//! Events carry the builder component and, where relevant, the draft field
//! involved. Console output is always on; an append-mode log file can be
//! added for long-running hosts.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry, fmt as tracing_fmt};

use crate::config::LoggingConfig;
use crate::model::DraftField;
use crate::submission::StoreError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Draft,
    Canonicalizer,
    Submission,
    Config,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Draft => write!(f, "DRAFT"),
            Component::Canonicalizer => write!(f, "CANON"),
            Component::Submission => write!(f, "SUBMIT"),
            Component::Config => write!(f, "CONFIG"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// The store refused the payload; the user can correct and resubmit.
    Expected,
    /// Transport or store malfunction.
    Unexpected,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
        }
    }
}

pub fn classify_submission_failure(err: &StoreError) -> FailureType {
    match err {
        StoreError::Rejected { .. } => FailureType::Expected,
        StoreError::Transport { .. } => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("a global logger is already installed")]
    AlreadyInstalled,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Console layer plus, when `log_file` is set, an append-mode file layer.
fn build_layers(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<Vec<BoxedLayer>, LoggingError> {
    let filter = LevelFilter::from(min_level);
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console = tracing_fmt::layer().with_target(false);
    if console_timestamps {
        layers.push(console.with_filter(filter).boxed());
    } else {
        layers.push(console.without_time().with_filter(filter).boxed());
    }

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LoggingError::LogFile {
                path: path.to_string(),
                source,
            })?;
        layers.push(
            tracing_fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter)
                .boxed(),
        );
    }

    Ok(layers)
}

/// Installs the global subscriber: console output plus an optional log file.
///
/// Returns `AlreadyInstalled` if another subscriber was set first (common in
/// test binaries); callers can usually ignore that case.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<(), LoggingError> {
    let layers = build_layers(min_level, log_file, console_timestamps)?;
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)?;

    info(
        Component::Config,
        None,
        &format!(
            "logging at {} (file: {})",
            min_level,
            log_file.unwrap_or("none")
        ),
    );
    Ok(())
}

/// Installs the global subscriber from the `[logging]` config section.
pub fn init_from_config(config: &LoggingConfig) -> Result<(), LoggingError> {
    init_logger(config.level, config.file.as_deref(), config.console_timestamps)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

fn field_name(field: Option<DraftField>) -> &'static str {
    field.map(DraftField::as_str).unwrap_or("-")
}

pub fn info(component: Component, field: Option<DraftField>, message: &str) {
    tracing::info!(component = %component, field = field_name(field), "{}", message);
}

pub fn warn(component: Component, field: Option<DraftField>, message: &str) {
    tracing::warn!(component = %component, field = field_name(field), "{}", message);
}

pub fn error(component: Component, field: Option<DraftField>, message: &str) {
    tracing::error!(component = %component, field = field_name(field), "{}", message);
}

pub fn debug(component: Component, field: Option<DraftField>, message: &str) {
    tracing::debug!(component = %component, field = field_name(field), "{}", message);
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Logs a failed submission, at warn for store rejections and error for
/// transport failures.
pub fn log_submission_failure(title: &str, err: &StoreError) {
    let failure_type = classify_submission_failure(err);
    let message = format!("create '{}' failed [{}]: {}", title, failure_type, err);

    match failure_type {
        FailureType::Expected => warn(Component::Submission, None, &message),
        FailureType::Unexpected => error(Component::Submission, None, &message),
    }
}
