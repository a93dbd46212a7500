//! Pure filename predicates and sanitizers.
//!
//! Nothing in here touches the filesystem: every function is a plain function
//! over the client-supplied string so it can be tested exhaustively.

use super::ValidationError;

/// Longest original filename accepted from a client.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Longest extension carried over into a storage key.
pub const MAX_EXTENSION_LENGTH: usize = 16;

/// Returns true when `input` could address anything outside a single flat
/// directory entry: parent references, separators of either platform, NUL
/// bytes, or a drive-letter prefix.
pub fn contains_path_traversal(input: &str) -> bool {
    if input.contains("..") || input.contains('/') || input.contains('\\') || input.contains('\0')
    {
        return true;
    }

    let bytes = input.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Validate the filename a client attached to a multipart file field.
pub fn validate_original_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::MissingFilename);
    }

    if contains_path_traversal(filename) {
        return Err(ValidationError::InvalidFilename(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    if filename.chars().count() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::InvalidFilename(format!(
            "Filename exceeds {} characters",
            MAX_FILENAME_LENGTH
        )));
    }

    if filename.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFilename(
            "Filename contains control characters".to_string(),
        ));
    }

    Ok(())
}

/// Extract the lowercase extension of `filename` if it is safe to reuse in a
/// storage key (ASCII alphanumeric, bounded length). Dotfiles such as
/// `.bashrc` have no extension.
pub fn sanitize_extension(filename: &str) -> Option<String> {
    let (stem, extension) = filename.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() || extension.len() > MAX_EXTENSION_LENGTH {
        return None;
    }

    if !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some(extension.to_ascii_lowercase())
}

/// Reduce a client filename to a display-safe form: ASCII alphanumerics,
/// `.`, `-` and `_` survive, everything else becomes `_`. Leading dots and
/// underscores are dropped so the result can never be a hidden file.
///
/// Expects a name that already passed [`validate_original_filename`], so it
/// holds no separators or `..` sequences to strip.
pub fn sanitize_filename(filename: &str) -> String {
    let mut sanitized = String::with_capacity(filename.len());
    for c in filename.chars().take(MAX_FILENAME_LENGTH) {
        let mapped = if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        if mapped == '_' && sanitized.ends_with('_') {
            continue;
        }
        sanitized.push(mapped);
    }

    let trimmed = sanitized.trim_start_matches(['.', '_']).trim_end_matches('_');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
