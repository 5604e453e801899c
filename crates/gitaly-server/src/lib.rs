//! RPC services for mutating and inspecting repositories.

pub mod dependencies;
pub mod middleware;
pub mod server;
pub mod service;

pub use dependencies::{Dependencies, StoreFactory};
pub use server::{GitalyServer, RpcRequest, RpcResponse, ServerBootstrapError, ServiceSet};
pub use service::commit::CommitServiceImpl;
pub use service::errors::OperationError;
pub use service::operations::OperationServiceImpl;
pub use service::ref_::RefServiceImpl;
pub use service::resolver::REPO_PATH_METADATA_KEY;
