//! Translation of domain failures into the RPC status vocabulary.

use std::fmt;

use gitaly_error::GitalyError;
use gitaly_git::{ReferenceUpdateError, RepositoryError};
use gitaly_storage::LocatorError;
use thiserror::Error;
use tonic::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailure {
    Missing,
    Ambiguous,
    NotCommit,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "not found",
            Self::Ambiguous => "is ambiguous",
            Self::NotCommit => "does not point at a commit",
        })
    }
}

#[derive(Debug, Error)]
pub enum OperationError {
    /// Rejected before touching the store.
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Repository(#[from] LocatorError),
    #[error("revspec '{revision}' {failure}")]
    Resolution {
        revision: String,
        failure: ResolutionFailure,
    },
    #[error("invalid reference `{reference}`: {reason}")]
    InvalidReference { reference: String, reason: String },
    #[error("reference `{reference}` does not exist")]
    ReferenceNotFound { reference: String },
    #[error("reference update for `{reference}` failed: {reason}")]
    Conflict { reference: String, reason: String },
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Store(RepositoryError),
}

impl OperationError {
    pub(crate) fn resolution(revision: impl Into<String>, failure: ResolutionFailure) -> Self {
        Self::Resolution {
            revision: revision.into(),
            failure,
        }
    }

    /// Classifies a store failure raised while mutating `reference`.
    pub(crate) fn from_store(reference: &str, err: RepositoryError) -> Self {
        match err {
            RepositoryError::ReferenceUpdate(ReferenceUpdateError::Conflict { stderr }) => {
                Self::Conflict {
                    reference: reference.to_string(),
                    reason: stderr,
                }
            }
            RepositoryError::ReferenceUpdate(
                ReferenceUpdateError::InvalidReference { stderr }
                | ReferenceUpdateError::Rejected { stderr },
            ) => Self::InvalidReference {
                reference: reference.to_string(),
                reason: stderr,
            },
            other => Self::from(other),
        }
    }

    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}

impl From<RepositoryError> for OperationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::AmbiguousRevision { spec } => {
                Self::resolution(spec, ResolutionFailure::Ambiguous)
            }
            RepositoryError::InvalidRevision { spec, .. } => {
                Self::resolution(spec, ResolutionFailure::Missing)
            }
            other => Self::Store(other),
        }
    }
}

impl From<OperationError> for GitalyError {
    fn from(err: OperationError) -> Self {
        let message = err.to_string();
        match err {
            OperationError::InvalidArgument(_) => GitalyError::invalid_argument(message),
            OperationError::Repository(locator_error) => match locator_error {
                LocatorError::NoStorageConfigured => GitalyError::failed_precondition(message),
                LocatorError::RepositoryNotFound(path) => GitalyError::not_found(message)
                    .with_metadata("repository", path.display().to_string()),
                LocatorError::InspectRepositoryPath { .. }
                | LocatorError::ResolveStorageRoot { .. } => GitalyError::internal(message),
                _ => GitalyError::invalid_argument(message),
            },
            OperationError::Resolution { revision, .. } => {
                GitalyError::failed_precondition(message).with_metadata("revision", revision)
            }
            OperationError::InvalidReference { reference, .. }
            | OperationError::ReferenceNotFound { reference }
            | OperationError::Conflict { reference, .. } => {
                GitalyError::failed_precondition(message).with_metadata("reference", reference)
            }
            OperationError::Internal(_) | OperationError::Store(_) => {
                GitalyError::internal(message)
            }
        }
    }
}

impl From<OperationError> for Status {
    fn from(err: OperationError) -> Self {
        GitalyError::from(err).into()
    }
}
