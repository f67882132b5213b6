//! Error types shared across the crate

use std::{io, result};

use thiserror::Error;

/// Convenient result type for focus-timer operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors surfaced by the store, the engine and the control API.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing the store file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A stored value could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored value has the wrong shape and cannot be updated in place.
    #[error("Stored {0} is malformed")]
    Malformed(&'static str),
    /// Clearing the session log was requested without confirmation.
    #[error("Clearing all sessions cannot be undone and requires confirmation")]
    ConfirmationRequired,
    /// Unknown phase name.
    #[error("Unknown phase: {0}")]
    InvalidPhase(String),
    /// Unknown calendar navigation direction.
    #[error("Unknown calendar direction: {0}")]
    InvalidDirection(String),
    /// Calendar month out of range.
    #[error("Invalid calendar month: {year}-{month}")]
    InvalidMonth {
        /// Requested year.
        year: i32,
        /// Requested 1-based month.
        month: u32,
    },
    /// A mutex guarding shared state was poisoned.
    #[error("Failed to lock {0}")]
    Lock(&'static str),
}
