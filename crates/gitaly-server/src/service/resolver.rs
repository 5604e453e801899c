use std::sync::Arc;

use gitaly_git::RepositoryStore;
use gitaly_storage::LocatedRepository;
use tonic::Request;
use tracing::{debug_span, Span};

use crate::dependencies::Dependencies;
use crate::service::errors::OperationError;

/// Request metadata naming the target repository, either relative to the
/// default storage or as an absolute path inside a configured storage.
pub const REPO_PATH_METADATA_KEY: &str = "gitaly-repo-path";

pub struct ResolvedRepository {
    pub located: LocatedRepository,
    pub store: Arc<dyn RepositoryStore>,
}

impl ResolvedRepository {
    /// Span tagging events with the storage and repository they act on.
    pub fn span(&self) -> Span {
        debug_span!(
            "repository",
            storage = %self.located.storage_name,
            relative_path = %self.located.relative_path.display()
        )
    }
}

pub fn resolve_repository<T>(
    dependencies: &Dependencies,
    request: &Request<T>,
) -> Result<ResolvedRepository, OperationError> {
    let token = request
        .metadata()
        .get(REPO_PATH_METADATA_KEY)
        .ok_or_else(|| {
            OperationError::InvalidArgument(format!(
                "missing `{REPO_PATH_METADATA_KEY}` request metadata"
            ))
        })?
        .to_str()
        .map_err(|_| {
            OperationError::InvalidArgument(format!(
                "`{REPO_PATH_METADATA_KEY}` metadata must be valid ASCII"
            ))
        })?
        .trim();

    if token.is_empty() {
        return Err(OperationError::InvalidArgument(format!(
            "`{REPO_PATH_METADATA_KEY}` metadata must not be empty"
        )));
    }

    let located = dependencies.locator().resolve(token)?;
    let store = dependencies.open_store(&located.path);

    Ok(ResolvedRepository { located, store })
}
