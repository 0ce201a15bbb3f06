//! Small text helpers for user input and server responses.

/// Trimmed text, or `None` when nothing but whitespace was given.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

pub fn is_http_url(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.starts_with(scheme))
}

const MAX_ERROR_TEXT_CHARS: usize = 180;

/// Shorten a raw response body for use inside an error message.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(MAX_ERROR_TEXT_CHARS).collect()
}

/// Whitespace-only input counts as missing.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_values_normalize_to_none() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("\t \n".to_string())), None);
        assert_eq!(
            normalize_text_option(Some("  bob@x.com ".to_string())),
            Some("bob@x.com".to_string())
        );
    }

    #[test]
    fn api_urls_need_a_web_scheme() {
        assert!(is_http_url("http://localhost:5000/api"));
        assert!(is_http_url("https://reactivities.test/api"));
        assert!(!is_http_url("localhost:5000/api"));
        assert!(!is_http_url("ws://reactivities.test"));
    }

    #[test]
    fn error_bodies_are_shortened() {
        let body = format!("  {}  ", "e".repeat(400));
        assert_eq!(compact_text(&body).chars().count(), MAX_ERROR_TEXT_CHARS);
        assert_eq!(compact_text(" Bad Request "), "Bad Request");
    }

    #[test]
    fn whitespace_is_blank() {
        assert!(is_blank(" \t"));
        assert!(!is_blank(" a "));
    }
}
