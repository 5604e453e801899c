//! Wire views of commits, branches and tags. Nothing here touches the store.

use gitaly_git::{CommitObject, ObjectId, Signature};
use gitaly_proto::gitaly::{Branch, CommitAuthor, GitCommit, Tag};

/// Bodies larger than this are truncated; `body_size` keeps the full length.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

pub fn git_commit(oid: &ObjectId, commit: &CommitObject) -> GitCommit {
    let body_size = commit.message.len();
    let body = commit.message[..body_size.min(MAX_BODY_SIZE)].to_vec();

    GitCommit {
        id: oid.to_string(),
        subject: commit.subject().to_vec(),
        body,
        author: Some(commit_author(&commit.author)),
        committer: Some(commit_author(&commit.committer)),
        parent_ids: commit.parents.iter().map(ToString::to_string).collect(),
        body_size: i64::try_from(body_size).unwrap_or(i64::MAX),
        tree_id: commit.tree.to_string(),
    }
}

pub fn commit_author(signature: &Signature) -> CommitAuthor {
    CommitAuthor {
        name: signature.name.clone(),
        email: signature.email.clone(),
        date: Some(prost_types::Timestamp {
            seconds: signature.seconds,
            nanos: 0,
        }),
        timezone: signature.timezone.clone().into_bytes(),
    }
}

pub fn branch(name: &str, target_commit: GitCommit) -> Branch {
    Branch {
        name: name.as_bytes().to_vec(),
        target_commit: Some(target_commit),
    }
}

/// `id` is the tag object for annotated tags and the target for lightweight ones.
pub fn tag(
    name: &str,
    id: &ObjectId,
    target_commit: Option<GitCommit>,
    message: &[u8],
    tagger: Option<&Signature>,
) -> Tag {
    Tag {
        name: name.as_bytes().to_vec(),
        id: id.to_string(),
        target_commit,
        message: message.to_vec(),
        message_size: i64::try_from(message.len()).unwrap_or(i64::MAX),
        tagger: tagger.map(commit_author),
    }
}
