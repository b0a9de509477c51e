//! Core types for the veering guidance library
//!
//! This module defines the values that flow through the pipeline: decoded tag readings,
//! the zones tags are assigned to, the per-cycle presence summary and the action that is
//! finally handed to the notifier. It also holds the error taxonomy shared by every stage.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A single tag sighting decoded from one reader frame
#[derive(Debug, Clone, PartialEq)]
pub struct TagReading {
    /// Canonical identifier string (see [`crate::decoder::format_tag_id`])
    pub id: String,
    /// Normalized signal quality score in `[0, 100]`
    pub signal_score: f64,
}

impl TagReading {
    /// Create a reading from an already formatted id
    pub fn new(id: impl Into<String>, signal_score: f64) -> Self {
        Self {
            id: id.into(),
            signal_score,
        }
    }
}

impl fmt::Display for TagReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag ID: {}, RSSI = {:.3}", self.id, self.signal_score)
    }
}

/// Lateral zone a tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Left,
    Right,
    Center,
    /// Tag id not present in any configured zone
    Unknown,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Left => write!(f, "LEFT_TAG"),
            Zone::Right => write!(f, "RIGHT_TAG"),
            Zone::Center => write!(f, "CENTER_TAG"),
            Zone::Unknown => write!(f, "UNKNOWN_TAG"),
        }
    }
}

/// Which zones had at least one tag in range during a cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ZonePresenceSummary {
    pub left: bool,
    pub center: bool,
    pub right: bool,
}

impl ZonePresenceSummary {
    pub fn new(left: bool, center: bool, right: bool) -> Self {
        Self {
            left,
            center,
            right,
        }
    }

    /// True when no concrete zone was seen
    pub fn is_empty(&self) -> bool {
        !(self.left || self.center || self.right)
    }
}

impl fmt::Display for ZonePresenceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "left : {}, right : {}, center : {}",
            u8::from(self.left),
            u8::from(self.right),
            u8::from(self.center)
        )
    }
}

/// Directional guidance delivered to the wearer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    VeerLeft,
    VeerRight,
    KeepGoing,
    /// Not enough information to give guidance
    Unknown,
}

impl Action {
    /// Word written to the phone's veering characteristic
    pub fn payload(&self) -> &'static [u8] {
        match self {
            Action::VeerLeft => b"Left",
            Action::VeerRight => b"Right",
            Action::KeepGoing => b"Straight",
            Action::Unknown => b"Unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::VeerLeft => write!(f, "ACTION_VEER_LEFT"),
            Action::VeerRight => write!(f, "ACTION_VEER_RIGHT"),
            Action::KeepGoing => write!(f, "ACTION_KEEP_GOING"),
            Action::Unknown => write!(f, "ACTION_UNKNOWN"),
        }
    }
}

/// Errors raised while loading zone or cycle configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed tag configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Missing required key: {0}")]
    MissingKey(&'static str),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Errors reported by the reader byte stream
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    #[error("Reader disconnected: {0}")]
    Disconnected(String),

    #[error("Reader read timed out")]
    Timeout,

    #[error("Reader I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Whether this error means the reader is gone and the loop must stop
    pub fn is_disconnect(&self) -> bool {
        use std::io::ErrorKind;

        match self {
            HardwareError::Disconnected(_) => true,
            HardwareError::Timeout => false,
            HardwareError::Io(e) => matches!(
                e.kind(),
                ErrorKind::NotConnected
                    | ErrorKind::BrokenPipe
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::UnexpectedEof
            ),
        }
    }
}

/// Errors reported by a notifier adapter
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notifier unavailable: {0}")]
    Unavailable(String),

    #[error("Notifier I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that stop the decision loop
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Reader handshake failed: {0}")]
    Handshake(#[source] HardwareError),

    #[error(transparent)]
    Hardware(#[from] HardwareError),
}
