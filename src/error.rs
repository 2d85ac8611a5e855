//! Error types for the metasearch crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. No API keys or sensitive data appear in
//! error messages.

/// Errors that can occur during search aggregation.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query was rejected before any provider call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// A provider call exceeded its deadline.
    #[error("provider timed out: {0}")]
    Timeout(String),

    /// An HTTP request to a provider or the overview backend failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a provider response payload.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid or insufficient configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The trigger classifier could not be built.
    #[error("classifier error: {0}")]
    Classifier(String),

    /// An AI task id was registered twice.
    #[error("duplicate AI task: {0}")]
    DuplicateTask(String),

    /// The background overview generation failed.
    #[error("AI overview failed: {0}")]
    Overview(String),
}

/// Convenience type alias for metasearch results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_validation() {
        let err = SearchError::Validation("query must not be empty".into());
        assert_eq!(err.to_string(), "validation error: query must not be empty");
    }

    #[test]
    fn display_timeout() {
        let err = SearchError::Timeout("google exceeded 5000ms".into());
        assert_eq!(err.to_string(), "provider timed out: google exceeded 5000ms");
    }

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("no providers configured".into());
        assert_eq!(err.to_string(), "config error: no providers configured");
    }

    #[test]
    fn display_duplicate_task() {
        let err = SearchError::DuplicateTask("generic-ai-1-2".into());
        assert_eq!(err.to_string(), "duplicate AI task: generic-ai-1-2");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
