//! MIME type detection module
//!
//! Resolves the Content-Type of an asset from its file extension.

use std::path::Path;

/// Returned when no mapping exists for an extension
pub const UNKNOWN_CONTENT_TYPE: &str = "application/unknown";

/// Get MIME Content-Type for an asset path
///
/// Web fonts are mapped explicitly because generic tables disagree on them.
/// Everything else goes through `mime_guess`; textual types are served as UTF-8.
pub fn content_type_for(path: &str) -> String {
    let extension = Path::new(path).extension().and_then(|e| e.to_str());

    match extension {
        Some("woff") => "font/woff".to_string(),
        Some("woff2") => "font/woff2".to_string(),
        Some(ext) => mime_guess::from_ext(ext)
            .first()
            .map_or_else(|| UNKNOWN_CONTENT_TYPE.to_string(), |mime| with_charset(&mime)),
        None => UNKNOWN_CONTENT_TYPE.to_string(),
    }
}

fn with_charset(mime: &mime_guess::Mime) -> String {
    if mime.type_() == mime_guess::mime::TEXT && mime.get_param("charset").is_none() {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(content_type_for("/index.html"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("/assets/app.css"), "text/css; charset=utf-8");
        assert_eq!(content_type_for("/config.json"), "application/json");
        assert_eq!(content_type_for("/logo.png"), "image/png");
        assert_eq!(content_type_for("/icon.svg"), "image/svg+xml");
    }

    #[test]
    fn test_fonts() {
        assert_eq!(content_type_for("/fonts/inter.woff"), "font/woff");
        assert_eq!(content_type_for("/fonts/inter.woff2"), "font/woff2");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type_for("/data.qqqzzz"), UNKNOWN_CONTENT_TYPE);
        assert_eq!(content_type_for("/LICENSE"), UNKNOWN_CONTENT_TYPE);
    }
}
