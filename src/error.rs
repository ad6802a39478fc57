use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlGenError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Truncated response with no usable output: {0}")]
    TruncatedEmpty(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SqlGenError {
    /// Stable label used in log fields and fallback reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlGenError::Input(_) => "input_error",
            SqlGenError::Configuration(_) => "configuration_error",
            SqlGenError::Provider(_) => "provider_error",
            SqlGenError::EmptyResponse(_) => "empty_response",
            SqlGenError::TruncatedEmpty(_) => "truncated_empty",
            SqlGenError::MalformedResponse(_) => "malformed_response",
            SqlGenError::PayloadTooLarge(_) => "payload_too_large",
            SqlGenError::Internal(_) => "internal_error",
            SqlGenError::Io(_) => "io_error",
            SqlGenError::Json(_) => "json_error",
        }
    }

    /// Provider-layer failures that mock generation stands in for.
    /// Inside the attempt a provider's credential `Configuration` error is
    /// absorbed as well; before it, `Input` and `Configuration` end the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SqlGenError::Provider(_)
                | SqlGenError::EmptyResponse(_)
                | SqlGenError::TruncatedEmpty(_)
                | SqlGenError::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SqlGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels_are_distinct() {
        let errors = vec![
            SqlGenError::Input("x".into()),
            SqlGenError::Configuration("x".into()),
            SqlGenError::Provider("x".into()),
            SqlGenError::EmptyResponse("x".into()),
            SqlGenError::TruncatedEmpty("x".into()),
            SqlGenError::MalformedResponse("x".into()),
            SqlGenError::PayloadTooLarge("x".into()),
            SqlGenError::Internal("x".into()),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = SqlGenError::Provider("connection refused".to_string());
        assert_eq!(err.to_string(), "Provider error: connection refused");
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: SqlGenError = parse.unwrap_err().into();
        assert_eq!(err.kind(), "json_error");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_only_provider_layer_kinds_are_recoverable() {
        assert!(SqlGenError::Provider("x".into()).is_recoverable());
        assert!(SqlGenError::TruncatedEmpty("x".into()).is_recoverable());
        assert!(SqlGenError::MalformedResponse("x".into()).is_recoverable());
        assert!(!SqlGenError::Input("x".into()).is_recoverable());
        assert!(!SqlGenError::Configuration("x".into()).is_recoverable());
        assert!(!SqlGenError::PayloadTooLarge("x".into()).is_recoverable());
    }
}
