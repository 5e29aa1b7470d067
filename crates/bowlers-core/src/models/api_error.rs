//! Backend error bodies
//!
//! The proxy and API don't agree on one error shape. Known shapes, first match wins:
//! `{"errors":[{"message":..}]}`, `{"errors":[".."]}`, `{"message":..}`,
//! `{"error":..}`, `{"detail":..}`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEntry {
    Text(String),
    Object { message: String },
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<String> {
        let from_array = self.errors.iter().find_map(|entry| {
            let text = match entry {
                ErrorEntry::Text(text) => text,
                ErrorEntry::Object { message } => message,
            };
            (!text.trim().is_empty()).then(|| text.trim().to_string())
        });

        from_array
            .or_else(|| non_blank(&self.message))
            .or_else(|| non_blank(&self.error))
            .or_else(|| non_blank(&self.detail))
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Message for a failed backend call: the body's own message if it has one,
/// otherwise one derived from the status code.
pub fn extract_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message())
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_array_of_objects() {
        let body = r#"{"errors":[{"message":"Bucket not allowed"}]}"#;
        assert_eq!(extract_error_message(400, body), "Bucket not allowed");
    }

    #[test]
    fn errors_array_of_strings() {
        let body = r#"{"errors":["File name required"]}"#;
        assert_eq!(extract_error_message(422, body), "File name required");
    }

    #[test]
    fn errors_array_wins_over_message() {
        let body = r#"{"message":"Bad Request","errors":["title too long"]}"#;
        assert_eq!(extract_error_message(400, body), "title too long");
    }

    #[test]
    fn falls_back_to_detail() {
        let body = r#"{"detail":"Token expired"}"#;
        assert_eq!(extract_error_message(401, body), "Token expired");
    }

    #[test]
    fn non_json_uses_status() {
        assert_eq!(
            extract_error_message(502, "<html>Bad Gateway</html>"),
            "Request failed with status 502"
        );
        assert_eq!(extract_error_message(500, "{}"), "Request failed with status 500");
    }
}
