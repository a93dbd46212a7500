//! MIME type resolution for uploads and served files.

/// Fallback type for bytes of unknown kind.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Normalize a MIME type by stripping parameters and lowercasing
/// (e.g. "Text/Plain; charset=utf-8" -> "text/plain").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_lowercase()
}

/// Whether a declared type carries no information about the content.
pub fn is_generic(content_type: &str) -> bool {
    let normalized = normalize_mime_type(content_type);
    normalized.is_empty() || normalized == OCTET_STREAM
}

/// Best guess for an extension, if the extension is known.
pub fn guess_from_extension(extension: &str) -> Option<String> {
    mime_guess::from_ext(extension)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Resolve the MIME type recorded for an upload: the client's declaration when
/// it says something, otherwise a guess from the extension.
pub fn resolve_content_type(declared: Option<&str>, extension: Option<&str>) -> String {
    match declared {
        Some(ct) if !is_generic(ct) => normalize_mime_type(ct),
        _ => extension
            .and_then(guess_from_extension)
            .unwrap_or_else(|| OCTET_STREAM.to_string()),
    }
}

/// Known MIME types for an extension. Empty when the extension is unknown.
pub fn expected_types_for_extension(extension: &str) -> Vec<String> {
    mime_guess::from_ext(extension)
        .iter()
        .map(|m| m.essence_str().to_string())
        .collect()
}

/// Content type to serve a stored key with.
pub fn content_type_for_key(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Whether a type is passive enough to render inline in a browser. Anything
/// that can carry script (HTML, SVG, XML, JavaScript) is served as an
/// attachment instead.
pub fn is_inline_safe(content_type: &str) -> bool {
    let ct = normalize_mime_type(content_type);
    if ct == "image/svg+xml" {
        return false;
    }
    ct.starts_with("image/")
        || ct.starts_with("audio/")
        || ct.starts_with("video/")
        || matches!(
            ct.as_str(),
            "text/plain" | "text/csv" | "text/markdown" | "application/pdf" | "application/json"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mime_type() {
        assert_eq!(normalize_mime_type("Text/Plain; charset=utf-8"), "text/plain");
        assert_eq!(normalize_mime_type("  image/PNG "), "image/png");
        assert_eq!(normalize_mime_type(""), "");
    }

    #[test]
    fn test_is_generic() {
        assert!(is_generic(""));
        assert!(is_generic("application/octet-stream"));
        assert!(is_generic("APPLICATION/OCTET-STREAM; x=y"));
        assert!(!is_generic("text/plain"));
    }

    #[test]
    fn test_resolve_content_type() {
        assert_eq!(
            resolve_content_type(Some("text/plain; charset=utf-8"), Some("txt")),
            "text/plain"
        );
        assert_eq!(resolve_content_type(None, Some("txt")), "text/plain");
        assert_eq!(
            resolve_content_type(Some("application/octet-stream"), Some("epub")),
            "application/epub+zip"
        );
        assert_eq!(resolve_content_type(None, None), OCTET_STREAM);
        assert_eq!(resolve_content_type(None, Some("zzzunknown")), OCTET_STREAM);
    }

    #[test]
    fn test_content_type_for_key() {
        assert_eq!(content_type_for_key("abc.txt"), "text/plain");
        assert_eq!(content_type_for_key("abc.png"), "image/png");
        assert_eq!(content_type_for_key("abc"), OCTET_STREAM);
    }

    #[test]
    fn test_is_inline_safe() {
        assert!(is_inline_safe("image/png"));
        assert!(is_inline_safe("text/plain; charset=utf-8"));
        assert!(!is_inline_safe("image/svg+xml"));
        assert!(!is_inline_safe("text/html"));
        assert!(!is_inline_safe("application/javascript"));
        assert!(!is_inline_safe(OCTET_STREAM));
    }

    #[test]
    fn test_expected_types_for_extension() {
        assert!(expected_types_for_extension("jpg").contains(&"image/jpeg".to_string()));
        assert!(expected_types_for_extension("zzzunknown").is_empty());
    }
}
