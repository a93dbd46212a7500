//! Storage key predicate.
//!
//! A storage key is `{token}` or `{token}.{ext}`: ASCII alphanumerics, `-`, `_`
//! and `.`, never starting with `.` (that namespace belongs to in-flight
//! temporary files) and never containing a traversal sequence.

use super::filename::contains_path_traversal;

/// Upper bound on key length; generated keys are far shorter.
pub const MAX_KEY_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("Storage key is empty")]
    Empty,

    #[error("Storage key is too long: {len} characters (max: {max})")]
    TooLong { len: usize, max: usize },

    #[error("Storage key contains a path traversal sequence")]
    PathTraversal,

    #[error("Storage key cannot start with '.'")]
    Hidden,

    #[error("Storage key contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Validate a storage key candidate before it is used to build a path.
pub fn validate_storage_key(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    if key.len() > MAX_KEY_LENGTH {
        return Err(KeyError::TooLong {
            len: key.len(),
            max: MAX_KEY_LENGTH,
        });
    }

    if contains_path_traversal(key) {
        return Err(KeyError::PathTraversal);
    }

    if key.starts_with('.') {
        return Err(KeyError::Hidden);
    }

    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(KeyError::InvalidCharacter(c));
    }

    Ok(())
}

pub fn is_valid_storage_key(key: &str) -> bool {
    validate_storage_key(key).is_ok()
}
