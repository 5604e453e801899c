//! Revision specifiers to concrete objects, peeling annotated tags.

use gitaly_git::{CommitObject, ObjectId, ObjectInfo, ObjectType, RepositoryStore, TagObject};

use crate::service::errors::{OperationError, ResolutionFailure};

const MAX_TAG_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommit {
    pub oid: ObjectId,
    pub commit: CommitObject,
}

/// Resolves `revision` and dereferences tag chains. The returned object is
/// never a tag.
pub async fn resolve_object(
    store: &dyn RepositoryStore,
    revision: &str,
) -> Result<ObjectInfo, OperationError> {
    if revision.is_empty() {
        return Err(OperationError::InvalidArgument(
            "empty revision".to_string(),
        ));
    }

    let mut info = store
        .object_info(revision)
        .await?
        .ok_or_else(|| OperationError::resolution(revision, ResolutionFailure::Missing))?;

    for _ in 0..MAX_TAG_DEPTH {
        if info.object_type != ObjectType::Tag {
            return Ok(info);
        }

        let tag = read_tag(store, &info.oid).await?;
        info = store
            .object_info(tag.object.as_str())
            .await?
            .ok_or_else(|| OperationError::resolution(revision, ResolutionFailure::Missing))?;
    }

    Err(OperationError::Internal(format!(
        "revspec '{revision}' nests more than {MAX_TAG_DEPTH} tags"
    )))
}

pub async fn resolve_commit(
    store: &dyn RepositoryStore,
    revision: &str,
) -> Result<ResolvedCommit, OperationError> {
    let info = resolve_object(store, revision).await?;
    if info.object_type != ObjectType::Commit {
        return Err(OperationError::resolution(
            revision,
            ResolutionFailure::NotCommit,
        ));
    }

    let commit = read_commit(store, &info.oid).await?;
    Ok(ResolvedCommit {
        oid: info.oid,
        commit,
    })
}

pub(crate) async fn read_commit(
    store: &dyn RepositoryStore,
    oid: &ObjectId,
) -> Result<CommitObject, OperationError> {
    let data = store
        .read_object(oid.as_str())
        .await?
        .ok_or_else(|| OperationError::Internal(format!("commit {oid} vanished")))?;

    CommitObject::parse(&data.content)
        .map_err(|err| OperationError::Internal(format!("parse commit {oid}: {err}")))
}

pub(crate) async fn read_tag(
    store: &dyn RepositoryStore,
    oid: &ObjectId,
) -> Result<TagObject, OperationError> {
    let data = store
        .read_object(oid.as_str())
        .await?
        .ok_or_else(|| OperationError::Internal(format!("tag {oid} vanished")))?;

    TagObject::parse(&data.content)
        .map_err(|err| OperationError::Internal(format!("parse tag {oid}: {err}")))
}
