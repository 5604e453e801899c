use std::sync::Arc;

use tonic::{Request, Response, Status};

use gitaly_git::reference::BRANCH_PREFIX;
use gitaly_git::ReferenceName;
use gitaly_proto::gitaly::ref_service_server::RefService;
use gitaly_proto::gitaly::*;

use crate::dependencies::Dependencies;
use crate::service::convert;
use crate::service::errors::OperationError;
use crate::service::resolver::resolve_repository;
use crate::service::revision::read_commit;

#[derive(Debug, Clone)]
pub struct RefServiceImpl {
    dependencies: Arc<Dependencies>,
}

impl RefServiceImpl {
    #[must_use]
    pub fn new(dependencies: Arc<Dependencies>) -> Self {
        Self { dependencies }
    }
}

#[tonic::async_trait]
impl RefService for RefServiceImpl {
    async fn find_branch(
        &self,
        request: Request<FindBranchRequest>,
    ) -> Result<Response<FindBranchResponse>, Status> {
        let repository = resolve_repository(&self.dependencies, &request)?;
        let name = request.into_inner().name;

        if name.is_empty() {
            return Err(OperationError::InvalidArgument("empty branch name".to_string()).into());
        }

        let Ok(name) = std::str::from_utf8(&name) else {
            return Ok(Response::new(FindBranchResponse::default()));
        };
        let reference = if name.starts_with("refs/") {
            ReferenceName::new(name)
        } else {
            ReferenceName::branch(name)
        };
        let Ok(reference) = reference else {
            return Ok(Response::new(FindBranchResponse::default()));
        };

        let store = repository.store.as_ref();
        let Some(oid) = store
            .get_reference(&reference)
            .await
            .map_err(OperationError::from)?
        else {
            return Ok(Response::new(FindBranchResponse::default()));
        };

        let commit = read_commit(store, &oid).await?;
        Ok(Response::new(FindBranchResponse {
            branch: Some(convert::branch(
                reference.short_name(),
                convert::git_commit(&oid, &commit),
            )),
        }))
    }

    async fn find_all_branch_names(
        &self,
        request: Request<FindAllBranchNamesRequest>,
    ) -> Result<Response<FindAllBranchNamesResponse>, Status> {
        let repository = resolve_repository(&self.dependencies, &request)?;

        let names = repository
            .store
            .list_references(BRANCH_PREFIX)
            .await
            .map_err(OperationError::from)?
            .into_iter()
            .map(|(name, _)| name.into_bytes())
            .collect();

        Ok(Response::new(FindAllBranchNamesResponse { names }))
    }

    async fn ref_exists(
        &self,
        request: Request<RefExistsRequest>,
    ) -> Result<Response<RefExistsResponse>, Status> {
        let repository = resolve_repository(&self.dependencies, &request)?;
        let reference = request.into_inner().r#ref;

        if !reference.starts_with(b"refs/") {
            return Err(OperationError::InvalidArgument("invalid refname".to_string()).into());
        }

        let value = match std::str::from_utf8(&reference).map(ReferenceName::new) {
            Ok(Ok(reference)) => repository
                .store
                .get_reference(&reference)
                .await
                .map_err(OperationError::from)?
                .is_some(),
            _ => false,
        };

        Ok(Response::new(RefExistsResponse { value }))
    }
}
