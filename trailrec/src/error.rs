//! Error types for recording and viewing trails.
//!
//! An empty trail is not an error: it is [`crate::TrailView::Empty`].

use std::fmt;

use trailcore::ValidationError;

/// Which side of the store an operation was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAccess {
    Read,
    Write,
}

impl fmt::Display for StoreAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreAccess::Read => write!(f, "read"),
            StoreAccess::Write => write!(f, "write"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// No location access; no fixes are ingested until it is granted
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Invalid fix: {0}")]
    InvalidFix(#[from] ValidationError),

    #[error("Failed to write fix for trail '{trail_id}': {source}")]
    StorageWrite {
        trail_id: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to read trail '{trail_id}': {source}")]
    StorageRead {
        trail_id: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Trail store unavailable: {0}")]
    StoreUnavailable(#[source] rusqlite::Error),

    #[error("Trail store lock poisoned during {0}")]
    StorePoisoned(StoreAccess),

    #[error("Schema migration failed: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("Location provider error: {0}")]
    Provider(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

impl RecordError {
    /// A failure to persist a single fix. Counted and logged during recording,
    /// never shown to the user.
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            RecordError::InvalidFix(_)
                | RecordError::StorageWrite { .. }
                | RecordError::StorePoisoned(StoreAccess::Write)
        )
    }

    /// Short text suitable for the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            RecordError::PermissionDenied => "Location permission denied.",
            RecordError::StorageRead { .. } | RecordError::StorePoisoned(StoreAccess::Read) => {
                "Unable to load trail."
            }
            RecordError::StoreUnavailable(_) | RecordError::Migration(_) => {
                "Trail storage is unavailable."
            }
            RecordError::Provider(_) => "Location updates are unavailable.",
            RecordError::Config(_) | RecordError::InvalidState { .. } => "Something went wrong.",
            RecordError::InvalidFix(_)
            | RecordError::StorageWrite { .. }
            | RecordError::StorePoisoned(StoreAccess::Write) => "Unable to save location.",
        }
    }
}

/// Result type alias for trailrec operations.
pub type Result<T> = std::result::Result<T, RecordError>;
