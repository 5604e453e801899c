use std::sync::Arc;

use tonic::{Request, Response, Status};

use gitaly_proto::gitaly::commit_service_server::CommitService;
use gitaly_proto::gitaly::*;

use crate::dependencies::Dependencies;
use crate::service::convert;
use crate::service::errors::OperationError;
use crate::service::resolver::resolve_repository;
use crate::service::revision::resolve_commit;

#[derive(Debug, Clone)]
pub struct CommitServiceImpl {
    dependencies: Arc<Dependencies>,
}

impl CommitServiceImpl {
    #[must_use]
    pub fn new(dependencies: Arc<Dependencies>) -> Self {
        Self { dependencies }
    }
}

#[tonic::async_trait]
impl CommitService for CommitServiceImpl {
    async fn find_commit(
        &self,
        request: Request<FindCommitRequest>,
    ) -> Result<Response<FindCommitResponse>, Status> {
        let repository = resolve_repository(&self.dependencies, &request)?;
        let revision = request.into_inner().revision;

        if revision.is_empty() {
            return Err(OperationError::InvalidArgument("empty revision".to_string()).into());
        }
        let revision = std::str::from_utf8(&revision).map_err(|_| {
            OperationError::InvalidArgument("revision must be valid UTF-8".to_string())
        })?;

        let commit = match resolve_commit(repository.store.as_ref(), revision).await {
            Ok(resolved) => Some(convert::git_commit(&resolved.oid, &resolved.commit)),
            Err(err) if err.is_resolution() => None,
            Err(err) => return Err(err.into()),
        };

        Ok(Response::new(FindCommitResponse { commit }))
    }
}
