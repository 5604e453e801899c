// Wire types for the `gitaly` package. Field numbers follow the upstream
// protobuf definitions; the repository is carried in request metadata.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub gl_id: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub name: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub email: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "4")]
    pub gl_username: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommitAuthor {
    #[prost(bytes = "vec", tag = "1")]
    pub name: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub email: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub date: ::core::option::Option<::prost_types::Timestamp>,
    #[prost(bytes = "vec", tag = "4")]
    pub timezone: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GitCommit {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub subject: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub body: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub author: ::core::option::Option<CommitAuthor>,
    #[prost(message, optional, tag = "5")]
    pub committer: ::core::option::Option<CommitAuthor>,
    #[prost(string, repeated, tag = "6")]
    pub parent_ids: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(int64, tag = "7")]
    pub body_size: i64,
    #[prost(string, tag = "9")]
    pub tree_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Branch {
    #[prost(bytes = "vec", tag = "1")]
    pub name: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub target_commit: ::core::option::Option<GitCommit>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Tag {
    #[prost(bytes = "vec", tag = "1")]
    pub name: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "2")]
    pub id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub target_commit: ::core::option::Option<GitCommit>,
    #[prost(bytes = "vec", tag = "4")]
    pub message: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "5")]
    pub message_size: i64,
    #[prost(message, optional, tag = "6")]
    pub tagger: ::core::option::Option<CommitAuthor>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserCreateBranchRequest {
    #[prost(bytes = "vec", tag = "2")]
    pub branch_name: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub user: ::core::option::Option<User>,
    #[prost(bytes = "vec", tag = "4")]
    pub start_point: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserCreateBranchResponse {
    #[prost(message, optional, tag = "1")]
    pub branch: ::core::option::Option<Branch>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserUpdateBranchRequest {
    #[prost(bytes = "vec", tag = "2")]
    pub branch_name: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub newrev: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub oldrev: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "5")]
    pub user: ::core::option::Option<User>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserUpdateBranchResponse {
    #[prost(message, optional, tag = "1")]
    pub branch: ::core::option::Option<Branch>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserDeleteBranchRequest {
    #[prost(bytes = "vec", tag = "2")]
    pub branch_name: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub user: ::core::option::Option<User>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct UserDeleteBranchResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserCreateTagRequest {
    #[prost(bytes = "vec", tag = "2")]
    pub tag_name: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub user: ::core::option::Option<User>,
    #[prost(bytes = "vec", tag = "4")]
    pub target_revision: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub message: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserCreateTagResponse {
    #[prost(message, optional, tag = "1")]
    pub tag: ::core::option::Option<Tag>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserDeleteTagRequest {
    #[prost(bytes = "vec", tag = "2")]
    pub tag_name: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub user: ::core::option::Option<User>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct UserDeleteTagResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindBranchRequest {
    #[prost(bytes = "vec", tag = "2")]
    pub name: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindBranchResponse {
    #[prost(message, optional, tag = "1")]
    pub branch: ::core::option::Option<Branch>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct FindAllBranchNamesRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindAllBranchNamesResponse {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub names: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RefExistsRequest {
    #[prost(bytes = "vec", tag = "2")]
    pub r#ref: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct RefExistsResponse {
    #[prost(bool, tag = "1")]
    pub value: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindCommitRequest {
    #[prost(bytes = "vec", tag = "2")]
    pub revision: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindCommitResponse {
    #[prost(message, optional, tag = "1")]
    pub commit: ::core::option::Option<GitCommit>,
}

pub mod operation_service_server {
    use tonic::{Request, Response, Status};

    use super::{
        UserCreateBranchRequest, UserCreateBranchResponse, UserCreateTagRequest,
        UserCreateTagResponse, UserDeleteBranchRequest, UserDeleteBranchResponse,
        UserDeleteTagRequest, UserDeleteTagResponse, UserUpdateBranchRequest,
        UserUpdateBranchResponse,
    };

    pub const SERVICE_NAME: &str = "gitaly.OperationService";

    #[tonic::async_trait]
    pub trait OperationService: Send + Sync + 'static {
        async fn user_create_branch(
            &self,
            request: Request<UserCreateBranchRequest>,
        ) -> Result<Response<UserCreateBranchResponse>, Status>;

        async fn user_update_branch(
            &self,
            request: Request<UserUpdateBranchRequest>,
        ) -> Result<Response<UserUpdateBranchResponse>, Status>;

        async fn user_delete_branch(
            &self,
            request: Request<UserDeleteBranchRequest>,
        ) -> Result<Response<UserDeleteBranchResponse>, Status>;

        async fn user_create_tag(
            &self,
            request: Request<UserCreateTagRequest>,
        ) -> Result<Response<UserCreateTagResponse>, Status>;

        async fn user_delete_tag(
            &self,
            request: Request<UserDeleteTagRequest>,
        ) -> Result<Response<UserDeleteTagResponse>, Status>;
    }
}

pub mod ref_service_server {
    use tonic::{Request, Response, Status};

    use super::{
        FindAllBranchNamesRequest, FindAllBranchNamesResponse, FindBranchRequest,
        FindBranchResponse, RefExistsRequest, RefExistsResponse,
    };

    pub const SERVICE_NAME: &str = "gitaly.RefService";

    #[tonic::async_trait]
    pub trait RefService: Send + Sync + 'static {
        async fn find_branch(
            &self,
            request: Request<FindBranchRequest>,
        ) -> Result<Response<FindBranchResponse>, Status>;

        async fn find_all_branch_names(
            &self,
            request: Request<FindAllBranchNamesRequest>,
        ) -> Result<Response<FindAllBranchNamesResponse>, Status>;

        async fn ref_exists(
            &self,
            request: Request<RefExistsRequest>,
        ) -> Result<Response<RefExistsResponse>, Status>;
    }
}

pub mod commit_service_server {
    use tonic::{Request, Response, Status};

    use super::{FindCommitRequest, FindCommitResponse};

    pub const SERVICE_NAME: &str = "gitaly.CommitService";

    #[tonic::async_trait]
    pub trait CommitService: Send + Sync + 'static {
        async fn find_commit(
            &self,
            request: Request<FindCommitRequest>,
        ) -> Result<Response<FindCommitResponse>, Status>;
    }
}
