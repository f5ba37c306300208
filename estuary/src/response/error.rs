//! Server-reported error payloads

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status assumed when the server omits one next to its `error` object
pub const DEFAULT_ERROR_STATUS: u16 = 400;

/// The `error` object of a failed response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorCause {
    #[serde(rename = "type")]
    pub error_type: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl ErrorCause {
    /// Read an `error` member. Older servers send a bare string, which
    /// becomes the reason.
    pub fn from_json(json: &Value) -> Self {
        match json {
            Value::String(reason) => ErrorCause {
                reason: reason.clone(),
                ..Default::default()
            },
            other => serde_json::from_value(other.clone()).unwrap_or_default(),
        }
    }
}

/// `status` of an error response, defaulting to 400
pub fn error_status(body: &Value) -> u16 {
    body.get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(DEFAULT_ERROR_STATUS)
}

/// The server error carried by `body`, if it has an `error` member
pub fn server_error(body: &Value) -> Option<Error> {
    let cause = ErrorCause::from_json(body.get("error")?);
    Some(Error::Server {
        error_type: cause.error_type,
        reason: cause.reason,
        status: error_status(body),
    })
}

/// Fail with the server error if `body` carries one
pub fn check_server_error(body: &Value) -> Result<()> {
    match server_error(body) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
