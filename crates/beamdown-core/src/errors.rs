//! Error types for the transfer simulator.
//!
//! Nothing here is fatal. Every variant describes a condition the simulator
//! recovers from locally; callers decide whether to surface it:
//! - Busy: a start was attempted while a job is active (surfaced as a warning notice)
//! - Size label: a size string did not parse (recovered with the default total)

use thiserror::Error;

use crate::job::TransferState;

/// Errors returned by simulator operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulatorError {
    /// `start` was invoked while a job is running or paused.
    #[error("a download is already in progress ({state})")]
    Busy { state: TransferState },
}

/// Failure to turn a display label such as `"8.4 GB"` into a total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeLabelError {
    #[error("size label is empty")]
    Empty,

    #[error("size label '{0}' does not start with a number")]
    MissingNumber(String),

    #[error("unknown size unit '{unit}' in '{label}'")]
    UnknownUnit { label: String, unit: String },

    #[error("size must be positive, got '{0}'")]
    NotPositive(String),
}

/// Result type for simulator operations.
pub type SimulatorResult<T> = std::result::Result<T, SimulatorError>;
