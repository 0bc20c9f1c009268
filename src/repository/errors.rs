use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Non-success HTTP status. `message` is the best-effort text shown to users.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Builds an API error from a status line and an optional JSON error body.
    ///
    /// Prefers the body's `message`, then its `error`, then the status itself.
    pub fn from_status(status: u16, reason: Option<&str>, body: &str) -> Self {
        let from_body = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "error"].iter().find_map(|field| {
                    value
                        .get(field)
                        .and_then(serde_json::Value::as_str)
                        .filter(|text| !text.trim().is_empty())
                        .map(str::to_string)
                })
            });

        let message = from_body.unwrap_or_else(|| {
            format!("API Error: {status} {}", reason.unwrap_or_default())
                .trim_end()
                .to_string()
        });

        RepositoryError::Api { status, message }
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Unexpected(format!("Invalid JSON: {err}"))
    }
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_wins() {
        let err = RepositoryError::from_status(
            402,
            Some("Payment Required"),
            r#"{"message":"Not enough credits","error":"billing"}"#,
        );
        assert_eq!(err.to_string(), "Not enough credits");
    }

    #[test]
    fn error_field_is_the_fallback() {
        let err = RepositoryError::from_status(400, Some("Bad Request"), r#"{"error":"bad"}"#);
        assert_eq!(err.to_string(), "bad");
    }

    #[test]
    fn status_line_is_used_without_json_body() {
        let err = RepositoryError::from_status(503, Some("Service Unavailable"), "<html>");
        assert!(matches!(err, RepositoryError::Api { status: 503, .. }));
        assert_eq!(err.to_string(), "API Error: 503 Service Unavailable");
    }
}
