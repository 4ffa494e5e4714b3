use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

pub const GENERIC_FAILURE: &str = "An error occurred. Please try again.";
pub const INVALID_ACTION: &str = "Invalid action";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INVALID_BODY: &str = "Invalid request body";

/// Uniform response wrapper. `id` is echoed on the stdio transport only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub success: bool,
    pub message: String,
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn ok(id: Option<String>, message: impl Into<String>, data: serde_json::Value) -> Self {
        Envelope {
            id,
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn err(id: Option<String>, message: impl Into<String>) -> Self {
        Envelope {
            id,
            success: false,
            message: message.into(),
            data: json!({}),
        }
    }

    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub message: String,
    pub data: serde_json::Value,
}

impl Reply {
    pub fn new(message: impl Into<String>, data: serde_json::Value) -> Self {
        Reply {
            message: message.into(),
            data,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Reply::new(message, json!({}))
    }
}

#[derive(Error, Debug)]
pub enum Failure {
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unsupported(String),
    #[error("internal: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for Failure {
    fn from(e: rusqlite::Error) -> Self {
        Failure::Internal(e.into())
    }
}

impl Failure {
    pub fn invalid(message: impl Into<String>) -> Self {
        Failure::Invalid(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Failure::NotFound(message.into())
    }

    /// Message shown to the caller. Internal detail stays in the log.
    pub fn public_message(&self) -> String {
        match self {
            Failure::Internal(_) => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}
