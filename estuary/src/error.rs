//! Error types for the search client

use thiserror::Error;

/// Every failure the client can report.
///
/// Transport problems, errors reported by the server, semantic not-found
/// answers and build-time validation all surface through this one type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Server error [type={error_type}, reason={reason}]")]
    Server {
        error_type: String,
        reason: String,
        status: u16,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Stable label for the error kind, used as a log field.
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Transport(_) => "transport",
            Error::Server { .. } => "server",
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation",
            Error::MalformedResponse(_) => "malformed_response",
            Error::Json(_) => "json",
            Error::Config(_) => "config",
        }
    }

    /// HTTP status reported by the server, if this error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() || err.is_request() {
            "network failure"
        } else if err.is_builder() {
            "bad server address"
        } else {
            "request failed"
        };
        Error::Transport(format!("{}: {}", reason, err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display_embeds_type_and_reason() {
        let err = Error::Server {
            error_type: "index_not_found_exception".to_string(),
            reason: "no such index [books]".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Server error [type=index_not_found_exception, reason=no such index [books]]"
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.error_type(), "server");
    }

    #[test]
    fn test_non_server_errors_have_no_status() {
        assert_eq!(Error::Transport("timeout".into()).status(), None);
        assert_eq!(Error::NotFound("doc".into()).error_type(), "not_found");
    }
}
