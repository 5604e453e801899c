use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tonic::{Code, GrpcMethod, Request, Response, Status};

use gitaly_config::{Config, ServicesConfig};
use gitaly_proto::gitaly::commit_service_server::{self, CommitService};
use gitaly_proto::gitaly::operation_service_server::{self, OperationService};
use gitaly_proto::gitaly::ref_service_server::{self, RefService};
use gitaly_proto::gitaly::*;
use gitaly_storage::{Locator, LocatorError};

use crate::dependencies::Dependencies;
use crate::middleware::{self, CallLog};
use crate::service::commit::CommitServiceImpl;
use crate::service::operations::OperationServiceImpl;
use crate::service::ref_::RefServiceImpl;

#[derive(Debug, Error)]
pub enum ServerBootstrapError {
    #[error(transparent)]
    Locator(#[from] LocatorError),
    #[error("no RPC service is mounted")]
    NoServicesMounted,
}

/// The handlers a server dispatches to. `None` leaves a service unmounted.
#[derive(Clone, Default)]
pub struct ServiceSet {
    pub operations: Option<Arc<dyn OperationService>>,
    pub refs: Option<Arc<dyn RefService>>,
    pub commits: Option<Arc<dyn CommitService>>,
}

impl ServiceSet {
    #[must_use]
    pub fn all(dependencies: Arc<Dependencies>) -> Self {
        Self::from_config(&ServicesConfig::default(), dependencies)
    }

    #[must_use]
    pub fn from_config(config: &ServicesConfig, dependencies: Arc<Dependencies>) -> Self {
        Self {
            operations: config.operations.then(|| -> Arc<dyn OperationService> {
                Arc::new(OperationServiceImpl::new(Arc::clone(&dependencies)))
            }),
            refs: config.refs.then(|| -> Arc<dyn RefService> {
                Arc::new(RefServiceImpl::new(Arc::clone(&dependencies)))
            }),
            commits: config.commits.then(|| -> Arc<dyn CommitService> {
                Arc::new(CommitServiceImpl::new(Arc::clone(&dependencies)))
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_none() && self.refs.is_none() && self.commits.is_none()
    }
}

impl fmt::Debug for ServiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSet")
            .field("operations", &self.operations.is_some())
            .field("refs", &self.refs.is_some())
            .field("commits", &self.commits.is_some())
            .finish()
    }
}

/// Every RPC the server understands, carrying the caller's request and metadata.
#[derive(Debug)]
pub enum RpcRequest {
    UserCreateBranch(Request<UserCreateBranchRequest>),
    UserUpdateBranch(Request<UserUpdateBranchRequest>),
    UserDeleteBranch(Request<UserDeleteBranchRequest>),
    UserCreateTag(Request<UserCreateTagRequest>),
    UserDeleteTag(Request<UserDeleteTagRequest>),
    FindBranch(Request<FindBranchRequest>),
    FindAllBranchNames(Request<FindAllBranchNamesRequest>),
    RefExists(Request<RefExistsRequest>),
    FindCommit(Request<FindCommitRequest>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    UserCreateBranch(UserCreateBranchResponse),
    UserUpdateBranch(UserUpdateBranchResponse),
    UserDeleteBranch(UserDeleteBranchResponse),
    UserCreateTag(UserCreateTagResponse),
    UserDeleteTag(UserDeleteTagResponse),
    FindBranch(FindBranchResponse),
    FindAllBranchNames(FindAllBranchNamesResponse),
    RefExists(RefExistsResponse),
    FindCommit(FindCommitResponse),
}

#[derive(Debug, Clone)]
pub struct GitalyServer {
    services: ServiceSet,
}

impl GitalyServer {
    #[must_use]
    pub fn new(services: ServiceSet) -> Self {
        Self { services }
    }

    /// Opens the configured storages and mounts the enabled services.
    pub fn from_config(config: &Config) -> Result<Self, ServerBootstrapError> {
        let locator = Locator::new(
            config
                .storages
                .iter()
                .map(|storage| (storage.name.clone(), PathBuf::from(&storage.path))),
        )?;

        Self::with_dependencies(&config.services, Arc::new(Dependencies::new(locator)))
    }

    pub fn with_dependencies(
        config: &ServicesConfig,
        dependencies: Arc<Dependencies>,
    ) -> Result<Self, ServerBootstrapError> {
        let services = ServiceSet::from_config(config, dependencies);
        if services.is_empty() {
            return Err(ServerBootstrapError::NoServicesMounted);
        }

        Ok(Self::new(services))
    }

    pub fn services(&self) -> &ServiceSet {
        &self.services
    }

    pub async fn call(&self, request: RpcRequest) -> Result<RpcResponse, Status> {
        const OPERATIONS: &str = operation_service_server::SERVICE_NAME;
        const REFS: &str = ref_service_server::SERVICE_NAME;
        const COMMITS: &str = commit_service_server::SERVICE_NAME;

        let operations = self.services.operations.as_ref();
        let refs = self.services.refs.as_ref();
        let commits = self.services.commits.as_ref();

        match request {
            RpcRequest::UserCreateBranch(request) => {
                invoke(OPERATIONS, "UserCreateBranch", request, move |request| {
                    operations.map(|service| service.user_create_branch(request))
                })
                .await
                .map(RpcResponse::UserCreateBranch)
            }
            RpcRequest::UserUpdateBranch(request) => {
                invoke(OPERATIONS, "UserUpdateBranch", request, move |request| {
                    operations.map(|service| service.user_update_branch(request))
                })
                .await
                .map(RpcResponse::UserUpdateBranch)
            }
            RpcRequest::UserDeleteBranch(request) => {
                invoke(OPERATIONS, "UserDeleteBranch", request, move |request| {
                    operations.map(|service| service.user_delete_branch(request))
                })
                .await
                .map(RpcResponse::UserDeleteBranch)
            }
            RpcRequest::UserCreateTag(request) => {
                invoke(OPERATIONS, "UserCreateTag", request, move |request| {
                    operations.map(|service| service.user_create_tag(request))
                })
                .await
                .map(RpcResponse::UserCreateTag)
            }
            RpcRequest::UserDeleteTag(request) => {
                invoke(OPERATIONS, "UserDeleteTag", request, move |request| {
                    operations.map(|service| service.user_delete_tag(request))
                })
                .await
                .map(RpcResponse::UserDeleteTag)
            }
            RpcRequest::FindBranch(request) => {
                invoke(REFS, "FindBranch", request, move |request| {
                    refs.map(|service| service.find_branch(request))
                })
                .await
                .map(RpcResponse::FindBranch)
            }
            RpcRequest::FindAllBranchNames(request) => {
                invoke(REFS, "FindAllBranchNames", request, move |request| {
                    refs.map(|service| service.find_all_branch_names(request))
                })
                .await
                .map(RpcResponse::FindAllBranchNames)
            }
            RpcRequest::RefExists(request) => {
                invoke(REFS, "RefExists", request, move |request| {
                    refs.map(|service| service.ref_exists(request))
                })
                .await
                .map(RpcResponse::RefExists)
            }
            RpcRequest::FindCommit(request) => {
                invoke(COMMITS, "FindCommit", request, move |request| {
                    commits.map(|service| service.find_commit(request))
                })
                .await
                .map(RpcResponse::FindCommit)
            }
        }
    }
}

/// Runs the middleware chain, then the handler `dispatch` returns, logging
/// the outcome. `dispatch` yields `None` when the service is not mounted.
async fn invoke<Req, Resp, Fut>(
    service: &'static str,
    method: &'static str,
    mut request: Request<Req>,
    dispatch: impl FnOnce(Request<Req>) -> Option<Fut>,
) -> Result<Resp, Status>
where
    Fut: Future<Output = Result<Response<Resp>, Status>>,
{
    request
        .extensions_mut()
        .insert(GrpcMethod::new(service, method));
    let request = middleware::run_chain(request)?;
    let call_log = CallLog::from_request(&request);

    let result = match dispatch(request) {
        Some(handler) => handler.await.map(Response::into_inner),
        None => Err(Status::unimplemented(format!(
            "service `{service}` is not mounted"
        ))),
    };

    call_log.finish(result.as_ref().map_or_else(Status::code, |_| Code::Ok));
    result
}
