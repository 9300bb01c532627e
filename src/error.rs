// Error types surfaced by the record store

use thiserror::Error;

/// Failures a caller of the record store has to handle.
///
/// Unknown task ids are not errors: `update_task` returns `None` and
/// `delete_task` returns `false`. Storage that cannot be reached is absorbed
/// inside the store and never shows up here either.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User with this email already exists")]
    DuplicateEmail(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Stored entry {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Failed to encode entry {key}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn corrupt(key: &str, reason: impl ToString) -> Self {
        StoreError::Corrupt {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
