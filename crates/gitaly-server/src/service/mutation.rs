//! Atomic reference mutations followed by an authoritative re-read.
//!
//! Each operation resolves its inputs, applies a single `update-ref`
//! transaction and then reads the reference back. A reference that is gone by
//! the time it is re-read was lost to a concurrent caller; that is reported as
//! `Ok(None)` rather than an error.

use gitaly_git::{NewTag, ObjectId, ObjectType, RefUpdate, ReferenceName, RepositoryStore};
use gitaly_proto::gitaly::{Branch, Tag};
use tracing::debug;

use crate::service::convert;
use crate::service::errors::OperationError;
use crate::service::identity::Identity;
use crate::service::revision::{read_commit, resolve_commit, resolve_object};

pub async fn create_branch(
    store: &dyn RepositoryStore,
    reference: &ReferenceName,
    start_point: &str,
    identity: &Identity,
) -> Result<Option<Branch>, OperationError> {
    let target = resolve_commit(store, start_point).await?;

    apply(
        store,
        reference,
        RefUpdate::Create {
            reference: reference.clone(),
            new_oid: target.oid.clone(),
        },
        identity,
        &format!("branch: Created from {start_point}"),
    )
    .await?;

    if reread(store, reference).await?.is_none() {
        return Ok(None);
    }

    Ok(Some(convert::branch(
        reference.short_name(),
        convert::git_commit(&target.oid, &target.commit),
    )))
}

pub async fn update_branch(
    store: &dyn RepositoryStore,
    reference: &ReferenceName,
    newrev: &str,
    oldrev: &str,
    identity: &Identity,
) -> Result<Option<Branch>, OperationError> {
    let new_target = resolve_commit(store, newrev).await?;
    let old_target = resolve_commit(store, oldrev).await?;
    current_value(store, reference).await?;

    apply(
        store,
        reference,
        RefUpdate::Update {
            reference: reference.clone(),
            old_oid: old_target.oid,
            new_oid: new_target.oid.clone(),
        },
        identity,
        &format!("branch: Updated to {newrev}"),
    )
    .await?;

    if reread(store, reference).await?.is_none() {
        return Ok(None);
    }

    Ok(Some(convert::branch(
        reference.short_name(),
        convert::git_commit(&new_target.oid, &new_target.commit),
    )))
}

/// Deletes `reference` only if it still holds the value read at the start.
pub async fn delete_reference(
    store: &dyn RepositoryStore,
    reference: &ReferenceName,
    identity: &Identity,
) -> Result<(), OperationError> {
    let old_oid = current_value(store, reference).await?;

    apply(
        store,
        reference,
        RefUpdate::Delete {
            reference: reference.clone(),
            old_oid,
        },
        identity,
        "delete",
    )
    .await
}

pub async fn create_tag(
    store: &dyn RepositoryStore,
    reference: &ReferenceName,
    target_revision: &str,
    message: &[u8],
    identity: &Identity,
) -> Result<Option<Tag>, OperationError> {
    let target = resolve_object(store, target_revision).await?;
    let tag_name = reference.short_name();

    let (ref_target, tagger) = if message.is_empty() {
        (target.oid.clone(), None)
    } else {
        let tagger = identity.signature_now();
        let tag_oid = store
            .write_tag(&NewTag {
                target: &target.oid,
                target_type: target.object_type,
                name: tag_name,
                tagger: &tagger,
                message,
            })
            .await
            .map_err(|err| OperationError::from_store(reference.as_str(), err))?;
        (tag_oid, Some(tagger))
    };

    apply(
        store,
        reference,
        RefUpdate::Create {
            reference: reference.clone(),
            new_oid: ref_target.clone(),
        },
        identity,
        "tag: created",
    )
    .await?;

    if reread(store, reference).await?.is_none() {
        return Ok(None);
    }

    let target_commit = if target.object_type == ObjectType::Commit {
        let commit = read_commit(store, &target.oid).await?;
        Some(convert::git_commit(&target.oid, &commit))
    } else {
        None
    };

    Ok(Some(convert::tag(
        tag_name,
        &ref_target,
        target_commit,
        message,
        tagger.as_ref(),
    )))
}

async fn apply(
    store: &dyn RepositoryStore,
    reference: &ReferenceName,
    update: RefUpdate,
    identity: &Identity,
    message: &str,
) -> Result<(), OperationError> {
    store
        .update_references(
            std::slice::from_ref(&update),
            Some(&identity.ref_actor()),
            Some(message),
        )
        .await
        .map_err(|err| OperationError::from_store(reference.as_str(), err))?;

    debug!(reference = %reference, gl_id = %identity.gl_id, "reference transaction committed");
    Ok(())
}

async fn current_value(
    store: &dyn RepositoryStore,
    reference: &ReferenceName,
) -> Result<ObjectId, OperationError> {
    store
        .get_reference(reference)
        .await?
        .ok_or_else(|| OperationError::ReferenceNotFound {
            reference: reference.to_string(),
        })
}

async fn reread(
    store: &dyn RepositoryStore,
    reference: &ReferenceName,
) -> Result<Option<ObjectId>, OperationError> {
    let value = store.get_reference(reference).await?;
    if value.is_none() {
        debug!(reference = %reference, "reference vanished before re-read");
    }

    Ok(value)
}
