//! Settings errors

use thiserror::Error;

/// Errors raised while loading settings
///
/// These are start-up failures; the process should not run with them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// Value is not an integer
    #[error("{0} must be an integer")]
    NotInteger(String),

    /// Value is an integer below 1
    #[error("{0} must be >= 1")]
    NotPositive(String),

    /// Unknown role name
    #[error("{name} contains unknown role: {role}")]
    UnknownRole {
        /// Variable name
        name: String,
        /// Offending role
        role: String,
    },
}
