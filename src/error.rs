//! Error types for request execution and their normalization
//!
//! Every failure, whatever its origin, collapses to one user-visible message
//! picked from the remote body's `message`, then its `error`, then the local
//! error text, then "Unknown error".

use serde_json::Value;
use thiserror::Error;

pub const ERROR_PREFIX: &str = "AllSign API Error";

/// No response was received
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),

    #[error("Failed to encode request body: {0}")]
    Encode(String),
}

/// Failure of a single operation invocation
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The remote API answered with a non-2xx status
    #[error("Request failed with status code {status}")]
    Response { status: u16, body: Option<Value> },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Invalid parameter '{name}': {reason}")]
    Parameter { name: String, reason: String },

    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("{0}")]
    Binary(String),

    #[error("Unknown operation '{operation}' for resource '{resource}'")]
    UnknownOperation { resource: String, operation: String },
}

impl ApiError {
    pub fn parameter(name: &str, reason: impl ToString) -> Self {
        ApiError::Parameter {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status attached to the failure, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Best available human-readable message
    pub fn best_message(&self) -> String {
        if let ApiError::Response { body: Some(body), .. } = self
            && let Some(message) = body_message(body)
        {
            return message;
        }

        let message = self.to_string();
        if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        }
    }
}

/// `message`, else `error`, from a remote error body
fn body_message(body: &Value) -> Option<String> {
    ["message", "error"].iter().find_map(|key| match body.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Null) | Some(Value::Bool(false)) | None => None,
        Some(Value::String(_)) => None,
        Some(other) => Some(other.to_string()),
    })
}

/// An item failure that aborts the run
#[derive(Debug, Error)]
#[error("{message}")]
pub struct OperationError {
    /// `"AllSign API Error: <message>"`
    pub message: String,
    /// `"HTTP Status Code: <n>"` or `"HTTP Status Code: N/A"`
    pub description: String,
    pub item_index: usize,
    pub status: Option<u16>,
}

impl OperationError {
    pub fn from_api(error: &ApiError, item_index: usize) -> Self {
        let status = error.status();
        Self {
            message: format!("{}: {}", ERROR_PREFIX, error.best_message()),
            description: format!(
                "HTTP Status Code: {}",
                status.map(|s| s.to_string()).unwrap_or_else(|| "N/A".to_string())
            ),
            item_index,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_preferred_over_error() {
        let err = ApiError::Response {
            status: 404,
            body: Some(json!({"message": "Document not found", "error": "NotFound"})),
        };
        assert_eq!(err.best_message(), "Document not found");
    }

    #[test]
    fn test_error_field_used_without_message() {
        let err = ApiError::Response {
            status: 401,
            body: Some(json!({"error": "Invalid API key"})),
        };
        assert_eq!(err.best_message(), "Invalid API key");
    }

    #[test]
    fn test_generic_message_without_body_fields() {
        let err = ApiError::Response {
            status: 500,
            body: Some(json!({"detail": "boom"})),
        };
        assert_eq!(err.best_message(), "Request failed with status code 500");
    }

    #[test]
    fn test_transport_message() {
        let err = ApiError::from(TransportError::Network("Connection refused".to_string()));
        assert_eq!(err.best_message(), "Connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_unknown_error_fallback() {
        let err = ApiError::from(TransportError::Network(String::new()));
        assert_eq!(err.best_message(), "Unknown error");
    }

    #[test]
    fn test_operation_error_shape() {
        let err = ApiError::Response {
            status: 404,
            body: Some(json!({"message": "Document not found"})),
        };
        let op = OperationError::from_api(&err, 3);
        assert_eq!(op.to_string(), "AllSign API Error: Document not found");
        assert_eq!(op.description, "HTTP Status Code: 404");
        assert_eq!(op.item_index, 3);
        assert_eq!(op.status, Some(404));
    }

    #[test]
    fn test_operation_error_without_status() {
        let op = OperationError::from_api(&ApiError::MissingParameter("documentId".into()), 0);
        assert_eq!(op.to_string(), "AllSign API Error: Missing required parameter 'documentId'");
        assert_eq!(op.description, "HTTP Status Code: N/A");
    }
}
