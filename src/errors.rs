//! Unified error types for `ScheduleBuddy`.
//!
//! The lifecycle manager translates every storage failure into this taxonomy;
//! raw `DbErr` values never cross the API boundary.

use thiserror::Error;

/// All errors the scheduler can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more input fields are missing or malformed (user-correctable).
    #[error("validation failed for fields: {}", fields.join(", "))]
    Validation {
        /// Names of the offending fields
        fields: Vec<String>,
    },

    /// The definition id does not exist or is not owned by the caller.
    #[error("recurring definition {id} not found")]
    NotFound {
        /// The id that failed to resolve
        id: i64,
    },

    /// The referenced category does not resolve for this user.
    #[error("category {category_id} not found for this user")]
    InvalidCategory {
        /// The category id that failed to resolve
        category_id: i64,
    },

    /// A stored frequency value is outside the supported set. Writes always
    /// go through the `Frequency` enum, so this only fires on corrupted rows.
    #[error("unsupported frequency value: {value}")]
    UnsupportedFrequency {
        /// The raw stored value
        value: String,
    },

    /// Configuration error (bad config file, inconsistent stored data)
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Storage layer failure
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error (startup, config file access, listener binding)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error (startup only)
    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
