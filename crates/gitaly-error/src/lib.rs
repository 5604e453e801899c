//! Structured RPC errors that cross the service boundary as `tonic::Status`.

use std::collections::BTreeMap;

use thiserror::Error;
use tonic::{Code, Status};

/// Error with a gRPC code, a human message and string metadata. The metadata
/// travels as a JSON object in the status details.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct GitalyError {
    code: Code,
    message: String,
    metadata: BTreeMap<String, String>,
}

impl GitalyError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(Code::FailedPrecondition, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Decodes metadata attached by the `From<GitalyError> for Status` conversion.
    pub fn metadata_from_status(status: &Status) -> Option<BTreeMap<String, String>> {
        if status.details().is_empty() {
            return None;
        }

        serde_json::from_slice(status.details()).ok()
    }
}

impl From<GitalyError> for Status {
    fn from(error: GitalyError) -> Self {
        if error.metadata.is_empty() {
            return Status::new(error.code, error.message);
        }

        let details = serde_json::to_vec(&error.metadata).unwrap_or_default();
        Status::with_details(error.code, error.message, details.into())
    }
}
