//! The narrow store contract services are written against.

use async_trait::async_trait;

use crate::catfile::{ObjectData, ObjectInfo};
use crate::object_id::ObjectId;
use crate::reference::{RefActor, RefUpdate, ReferenceName};
use crate::repository::{Repository, RepositoryError};
use crate::tag::NewTag;

/// Object and reference access for a single repository.
///
/// Reference writes are atomic: a batch passed to [`update_references`]
/// either applies completely or not at all, and `RefUpdate::Create` fails
/// rather than overwriting an existing reference.
///
/// [`update_references`]: RepositoryStore::update_references
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn object_info(&self, revision: &str) -> Result<Option<ObjectInfo>, RepositoryError>;

    async fn read_object(&self, revision: &str) -> Result<Option<ObjectData>, RepositoryError>;

    async fn get_reference(
        &self,
        name: &ReferenceName,
    ) -> Result<Option<ObjectId>, RepositoryError>;

    async fn list_references(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, ObjectId)>, RepositoryError>;

    async fn update_references(
        &self,
        updates: &[RefUpdate],
        actor: Option<&RefActor>,
        message: Option<&str>,
    ) -> Result<(), RepositoryError>;

    async fn write_tag(&self, tag: &NewTag<'_>) -> Result<ObjectId, RepositoryError>;
}

#[async_trait]
impl RepositoryStore for Repository {
    async fn object_info(&self, revision: &str) -> Result<Option<ObjectInfo>, RepositoryError> {
        Repository::object_info(self, revision).await
    }

    async fn read_object(&self, revision: &str) -> Result<Option<ObjectData>, RepositoryError> {
        Repository::read_object(self, revision).await
    }

    async fn get_reference(
        &self,
        name: &ReferenceName,
    ) -> Result<Option<ObjectId>, RepositoryError> {
        Repository::get_reference(self, name).await
    }

    async fn list_references(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, ObjectId)>, RepositoryError> {
        Repository::list_references(self, prefix).await
    }

    async fn update_references(
        &self,
        updates: &[RefUpdate],
        actor: Option<&RefActor>,
        message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        Repository::update_references(self, updates, actor, message).await
    }

    async fn write_tag(&self, tag: &NewTag<'_>) -> Result<ObjectId, RepositoryError> {
        Repository::write_tag(self, tag).await
    }
}
