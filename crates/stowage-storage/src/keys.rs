//! Shared key and temporary file naming for the store.

use uuid::Uuid;

/// Prefix of in-flight temporary files. The leading dot keeps them outside
/// the valid key namespace.
pub const TEMP_FILE_PREFIX: &str = ".upload-";

/// Suffix of in-flight temporary files.
pub const TEMP_FILE_SUFFIX: &str = ".part";

/// Generate a fresh storage key from a random token and an already sanitized
/// extension.
pub fn generate_storage_key(extension: Option<&str>) -> String {
    let token = Uuid::new_v4().simple();
    match extension {
        Some(ext) if !ext.is_empty() => format!("{}.{}", token, ext),
        _ => token.to_string(),
    }
}

/// Name of a new temporary file: `.upload-{uuid}.part`.
pub fn temp_file_name() -> String {
    format!("{}{}{}", TEMP_FILE_PREFIX, Uuid::new_v4().simple(), TEMP_FILE_SUFFIX)
}

pub fn is_temp_file_name(name: &str) -> bool {
    name.starts_with(TEMP_FILE_PREFIX) && name.ends_with(TEMP_FILE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use stowage_core::validation::is_valid_storage_key;

    #[test]
    fn test_generated_keys_are_valid() {
        let key = generate_storage_key(Some("txt"));
        assert!(key.ends_with(".txt"));
        assert_eq!(key.len(), 32 + 4);
        assert!(is_valid_storage_key(&key));

        let bare = generate_storage_key(None);
        assert_eq!(bare.len(), 32);
        assert!(bare.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(is_valid_storage_key(&bare));

        assert!(!generate_storage_key(Some("")).contains('.'));
    }

    #[test]
    fn test_generated_keys_are_unique() {
        let keys: HashSet<String> = (0..1000).map(|_| generate_storage_key(Some("epub"))).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_temp_names_are_never_keys() {
        let name = temp_file_name();
        assert!(is_temp_file_name(&name));
        assert!(!is_valid_storage_key(&name));
        assert!(!is_temp_file_name("abc.part"));
        assert!(!is_temp_file_name(".upload-abc"));
    }
}
