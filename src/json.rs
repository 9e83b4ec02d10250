use std::fs::File;
use std::io::{self, Read};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EditError;
use crate::transcript::{EditOutcome, Operation};

/// An edit request as read from a file or stdin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Caller-chosen id echoed in the response; `"auto"` generates one
    #[serde(default = "auto_execution_id")]
    pub execution_id: String,
    /// BLAKE3 checksum the transcript file must have before the edit
    #[serde(default)]
    pub expected_checksum: Option<String>,
    pub operation: Operation,
}

fn auto_execution_id() -> String {
    "auto".to_string()
}

/// Failure to obtain an edit request, before any transcript is touched
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("cannot read edit request from {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed edit request from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EditRequest {
    /// Load a request from `path`, or from stdin when no path is given
    pub fn load(path: Option<&str>) -> Result<Self, RequestError> {
        match path {
            Some(path) => {
                let file = File::open(path).map_err(|source| RequestError::Io {
                    origin: path.to_string(),
                    source,
                })?;
                Self::from_reader(file, path)
            }
            None => Self::from_reader(io::stdin().lock(), "stdin"),
        }
    }

    /// Parse a request from any byte stream; `origin` names it in errors
    pub fn from_reader<R: Read>(mut reader: R, origin: &str) -> Result<Self, RequestError> {
        let mut json = String::new();
        reader
            .read_to_string(&mut json)
            .map_err(|source| RequestError::Io {
                origin: origin.to_string(),
                source,
            })?;
        serde_json::from_str(&json).map_err(|source| RequestError::Parse {
            origin: origin.to_string(),
            source,
        })
    }
}

/// Result of handling one edit request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditResponse {
    pub success: bool,
    pub execution_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<EditOutcome>,
    /// Checksum of the transcript file after a persisted edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EditResponse {
    pub fn success(
        execution_id: String,
        operation: &Operation,
        outcome: EditOutcome,
        final_checksum: Option<String>,
    ) -> Self {
        Self {
            success: true,
            execution_id,
            operation: Some(operation.name().to_string()),
            outcome: Some(outcome),
            final_checksum,
            error_kind: None,
            error: None,
        }
    }

    /// A failure outside the engine (I/O, checksum, malformed request)
    pub fn failure(execution_id: String, error: String) -> Self {
        Self {
            success: false,
            execution_id,
            operation: None,
            outcome: None,
            final_checksum: None,
            error_kind: None,
            error: Some(error),
        }
    }

    /// A failure reported by the edit engine
    pub fn rejected(execution_id: String, operation: &Operation, error: &EditError) -> Self {
        Self {
            success: false,
            execution_id,
            operation: Some(operation.name().to_string()),
            outcome: None,
            final_checksum: None,
            error_kind: Some(error.kind().to_string()),
            error: Some(error.to_string()),
        }
    }
}

/// Generate a fresh execution id
pub fn generate_execution_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
