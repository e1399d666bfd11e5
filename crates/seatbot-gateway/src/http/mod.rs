pub mod book;
pub mod cookies;
pub mod jobs;
pub mod portal;
pub mod ui;

use axum::http::HeaderMap;

/// Logical client identity, chosen by the front-end and echoed on every
/// call. Absent for plain curl usage, which then falls back to the
/// globally persisted cookie set.
pub fn client_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-client-id")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_is_trimmed_and_non_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_id(&headers), None);

        headers.insert("x-client-id", " abc-123 ".parse().unwrap());
        assert_eq!(client_id(&headers).as_deref(), Some("abc-123"));

        headers.insert("x-client-id", "   ".parse().unwrap());
        assert_eq!(client_id(&headers), None);
    }
}
