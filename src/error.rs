//! Error types for the health monitor
//!
//! Only [`ConfigError`] ever reaches the caller that builds the engine.
//! Everything else is raised inside a monitoring cycle and contained there:
//! probe errors degrade a single domain to `unknown`, recovery errors are
//! logged per action, and history errors drop a single sample.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Invalid or unloadable monitor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A classification threshold is out of range
    #[error("invalid threshold `{name}` = {value}: {reason}")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A scheduling, history, or worker setting is unusable
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// Failure of a single host capability read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The host does not provide this capability
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The capability exists but the read failed
    #[error("probe failed: {0}")]
    Failed(String),
}

/// Failure reported by the automation collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("automation `{operation}` failed: {message}")]
pub struct AutomationError {
    pub operation: &'static str,
    pub message: String,
}

impl AutomationError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Failure of a recovery action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error("recovery action `{action}` failed: {message}")]
    Action {
        action: &'static str,
        message: String,
    },
}

/// Rejected history append
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("sample at {attempted} is older than the newest stored sample at {newest}")]
    OutOfOrder {
        newest: DateTime<Utc>,
        attempted: DateTime<Utc>,
    },
}
