use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::Instrument;

use gitaly_git::ReferenceName;
use gitaly_proto::gitaly::operation_service_server::OperationService;
use gitaly_proto::gitaly::*;

use crate::dependencies::Dependencies;
use crate::service::errors::OperationError;
use crate::service::identity::Identity;
use crate::service::mutation;
use crate::service::resolver::resolve_repository;

#[derive(Debug, Clone)]
pub struct OperationServiceImpl {
    dependencies: Arc<Dependencies>,
}

impl OperationServiceImpl {
    #[must_use]
    pub fn new(dependencies: Arc<Dependencies>) -> Self {
        Self { dependencies }
    }
}

#[tonic::async_trait]
impl OperationService for OperationServiceImpl {
    async fn user_create_branch(
        &self,
        request: Request<UserCreateBranchRequest>,
    ) -> Result<Response<UserCreateBranchResponse>, Status> {
        let repository = resolve_repository(&self.dependencies, &request)?;
        let request = request.into_inner();

        let start_point = required_text("start_point", &request.start_point)?;
        let identity = Identity::from_user(request.user)?;
        let reference = reference_name("branch_name", &request.branch_name, ReferenceName::branch)?;

        let branch =
            mutation::create_branch(repository.store.as_ref(), &reference, start_point, &identity)
                .instrument(repository.span())
                .await?;

        Ok(Response::new(UserCreateBranchResponse { branch }))
    }

    async fn user_update_branch(
        &self,
        request: Request<UserUpdateBranchRequest>,
    ) -> Result<Response<UserUpdateBranchResponse>, Status> {
        let repository = resolve_repository(&self.dependencies, &request)?;
        let request = request.into_inner();

        let identity = Identity::from_user(request.user)?;
        let reference = reference_name("branch_name", &request.branch_name, ReferenceName::branch)?;
        let newrev = required_text("newrev", &request.newrev)?;
        let oldrev = required_text("oldrev", &request.oldrev)?;

        let branch = mutation::update_branch(
            repository.store.as_ref(),
            &reference,
            newrev,
            oldrev,
            &identity,
        )
        .instrument(repository.span())
        .await?;

        Ok(Response::new(UserUpdateBranchResponse { branch }))
    }

    async fn user_delete_branch(
        &self,
        request: Request<UserDeleteBranchRequest>,
    ) -> Result<Response<UserDeleteBranchResponse>, Status> {
        let repository = resolve_repository(&self.dependencies, &request)?;
        let request = request.into_inner();

        let identity = Identity::from_user(request.user)?;
        let reference = reference_name("branch_name", &request.branch_name, ReferenceName::branch)?;

        mutation::delete_reference(repository.store.as_ref(), &reference, &identity)
            .instrument(repository.span())
            .await?;

        Ok(Response::new(UserDeleteBranchResponse {}))
    }

    async fn user_create_tag(
        &self,
        request: Request<UserCreateTagRequest>,
    ) -> Result<Response<UserCreateTagResponse>, Status> {
        let repository = resolve_repository(&self.dependencies, &request)?;
        let request = request.into_inner();

        let identity = Identity::from_user(request.user)?;
        let reference = reference_name("tag_name", &request.tag_name, ReferenceName::tag)?;
        let target_revision = required_text("target_revision", &request.target_revision)?;

        let tag = mutation::create_tag(
            repository.store.as_ref(),
            &reference,
            target_revision,
            &request.message,
            &identity,
        )
        .instrument(repository.span())
        .await?;

        Ok(Response::new(UserCreateTagResponse { tag }))
    }

    async fn user_delete_tag(
        &self,
        request: Request<UserDeleteTagRequest>,
    ) -> Result<Response<UserDeleteTagResponse>, Status> {
        let repository = resolve_repository(&self.dependencies, &request)?;
        let request = request.into_inner();

        let identity = Identity::from_user(request.user)?;
        let reference = reference_name("tag_name", &request.tag_name, ReferenceName::tag)?;

        mutation::delete_reference(repository.store.as_ref(), &reference, &identity)
            .instrument(repository.span())
            .await?;

        Ok(Response::new(UserDeleteTagResponse {}))
    }
}

fn required_text<'a>(field: &str, value: &'a [u8]) -> Result<&'a str, OperationError> {
    if value.is_empty() {
        return Err(OperationError::InvalidArgument(format!("empty {field}")));
    }

    std::str::from_utf8(value)
        .map_err(|_| OperationError::InvalidArgument(format!("{field} must be valid UTF-8")))
}

fn reference_name<E: std::fmt::Display>(
    field: &str,
    value: &[u8],
    build: impl FnOnce(&str) -> Result<ReferenceName, E>,
) -> Result<ReferenceName, OperationError> {
    let name = required_text(field, value)?;
    build(name).map_err(|err| OperationError::InvalidReference {
        reference: name.to_string(),
        reason: err.to_string(),
    })
}
