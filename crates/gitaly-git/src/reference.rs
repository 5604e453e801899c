//! git reference names and atomic reference transactions.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::command::{CommandError, CommandRunner};
use crate::command_factory::{CommandFactoryError, GitCommandFactory};
use crate::object_id::ObjectId;

pub const BRANCH_PREFIX: &str = "refs/heads/";
pub const TAG_PREFIX: &str = "refs/tags/";

const FORBIDDEN_CHARACTERS: [char; 8] = ['~', '^', ':', '?', '*', '[', '\\', ' '];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceName(String);

impl ReferenceName {
    pub fn new(value: impl Into<String>) -> Result<Self, ReferenceNameError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ReferenceNameError::Empty);
        }

        if let Some(character) = value
            .chars()
            .find(|character| character.is_control() || FORBIDDEN_CHARACTERS.contains(character))
        {
            return Err(ReferenceNameError::InvalidCharacter(character));
        }

        if value.contains("..") {
            return Err(ReferenceNameError::ContainsDoubleDot);
        }

        if value.contains("@{") {
            return Err(ReferenceNameError::ReflogSyntax);
        }

        if value.starts_with('/') {
            return Err(ReferenceNameError::LeadingSlash);
        }

        if value.ends_with('/') {
            return Err(ReferenceNameError::TrailingSlash);
        }

        if value.ends_with('.') {
            return Err(ReferenceNameError::TrailingDot);
        }

        for component in value.split('/') {
            if component.is_empty() {
                return Err(ReferenceNameError::EmptyComponent);
            }
            if component.starts_with('.') {
                return Err(ReferenceNameError::LeadingDotComponent);
            }
            if component.ends_with(".lock") {
                return Err(ReferenceNameError::LockSuffix);
            }
        }

        Ok(Self(value))
    }

    /// `refs/heads/<name>`
    pub fn branch(name: &str) -> Result<Self, ReferenceNameError> {
        Self::new(format!("{BRANCH_PREFIX}{name}"))
    }

    /// `refs/tags/<name>`
    pub fn tag(name: &str) -> Result<Self, ReferenceNameError> {
        Self::new(format!("{TAG_PREFIX}{name}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The name without its `refs/heads/` or `refs/tags/` namespace.
    pub fn short_name(&self) -> &str {
        self.0
            .strip_prefix(BRANCH_PREFIX)
            .or_else(|| self.0.strip_prefix(TAG_PREFIX))
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ReferenceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ReferenceName {
    type Err = ReferenceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceNameError {
    #[error("reference name cannot be empty")]
    Empty,
    #[error("reference name cannot contain `{0:?}`")]
    InvalidCharacter(char),
    #[error("reference name cannot contain `..`")]
    ContainsDoubleDot,
    #[error("reference name cannot contain `@{{`")]
    ReflogSyntax,
    #[error("reference name cannot start with `/`")]
    LeadingSlash,
    #[error("reference name cannot end with `/`")]
    TrailingSlash,
    #[error("reference name cannot end with `.`")]
    TrailingDot,
    #[error("reference name cannot contain empty path components")]
    EmptyComponent,
    #[error("reference name components cannot start with `.`")]
    LeadingDotComponent,
    #[error("reference name components cannot end with `.lock`")]
    LockSuffix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefUpdate {
    /// Fails if the reference already exists.
    Create {
        reference: ReferenceName,
        new_oid: ObjectId,
    },
    /// Fails unless the reference currently points at `old_oid`.
    Update {
        reference: ReferenceName,
        old_oid: ObjectId,
        new_oid: ObjectId,
    },
    /// Fails unless the reference currently points at `old_oid`.
    Delete {
        reference: ReferenceName,
        old_oid: ObjectId,
    },
}

impl RefUpdate {
    pub fn reference(&self) -> &ReferenceName {
        match self {
            Self::Create { reference, .. }
            | Self::Update { reference, .. }
            | Self::Delete { reference, .. } => reference,
        }
    }

    fn stdin_line(&self) -> String {
        match self {
            Self::Create { reference, new_oid } => format!("create {reference} {new_oid}"),
            Self::Update {
                reference,
                old_oid,
                new_oid,
            } => format!("update {reference} {new_oid} {old_oid}"),
            Self::Delete { reference, old_oid } => format!("delete {reference} {old_oid}"),
        }
    }
}

/// Who a reference transaction is performed for. Recorded as the reflog
/// committer and exported to hooks as `GL_ID`/`GL_USERNAME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefActor {
    pub name: String,
    pub email: String,
    pub user_id: String,
    pub username: String,
}

impl RefActor {
    fn env(&self) -> Vec<(String, String)> {
        vec![
            ("GIT_COMMITTER_NAME".to_string(), self.name.clone()),
            ("GIT_COMMITTER_EMAIL".to_string(), self.email.clone()),
            ("GIT_AUTHOR_NAME".to_string(), self.name.clone()),
            ("GIT_AUTHOR_EMAIL".to_string(), self.email.clone()),
            ("GL_ID".to_string(), self.user_id.clone()),
            ("GL_USERNAME".to_string(), self.username.clone()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceUpdater {
    runner: CommandRunner,
    repo_path: PathBuf,
    command_factory: GitCommandFactory,
}

impl ReferenceUpdater {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            runner: CommandRunner,
            repo_path: path.into(),
            command_factory: GitCommandFactory::default(),
        }
    }

    /// Applies all updates in a single `update-ref --stdin` transaction:
    /// either every update lands or none does.
    pub async fn apply(
        &self,
        updates: &[RefUpdate],
        actor: Option<&RefActor>,
        message: Option<&str>,
    ) -> Result<(), ReferenceUpdateError> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut script = String::from("start\n");
        for update in updates {
            script.push_str(&update.stdin_line());
            script.push('\n');
        }
        script.push_str("prepare\ncommit\n");

        let mut args = vec!["update-ref".to_string()];
        if let Some(message) = message {
            args.push("-m".to_string());
            args.push(message.to_string());
        }
        args.push("--stdin".to_string());

        let mut spec = self.command_factory.build_for_repo(&self.repo_path, args)?;
        if let Some(actor) = actor {
            spec = spec.with_env(actor.env());
        }

        let output = self
            .runner
            .run_with_input(&spec, script.as_bytes())
            .await
            .map_err(|source| ReferenceUpdateError::Command {
                args: spec.display_args(),
                source,
            })?;

        if output.success() {
            return Ok(());
        }

        Err(classify_failure(
            spec.display_args(),
            output.status_code,
            output.stderr_text(),
        ))
    }
}

#[derive(Debug, Error)]
pub enum ReferenceUpdateError {
    #[error("failed to build git command: {0}")]
    CommandFactory(#[from] CommandFactoryError),
    #[error("failed to run `git {args}`: {source}")]
    Command {
        args: String,
        #[source]
        source: CommandError,
    },
    /// The transaction lost a compare-and-set: the reference already exists,
    /// does not exist, or no longer has the expected value.
    #[error("reference update conflict: {stderr}")]
    Conflict { stderr: String },
    #[error("invalid reference: {stderr}")]
    InvalidReference { stderr: String },
    /// The new value is not acceptable for the reference, e.g. a missing object.
    #[error("reference update rejected: {stderr}")]
    Rejected { stderr: String },
    #[error("git command failed `git {args}` (status {status_code:?}): {stderr}")]
    GitFailed {
        args: String,
        status_code: Option<i32>,
        stderr: String,
    },
}

fn classify_failure(
    args: String,
    status_code: Option<i32>,
    stderr: String,
) -> ReferenceUpdateError {
    let lowered = stderr.to_ascii_lowercase();
    let contains_any = |needles: &[&str]| needles.iter().any(|needle| lowered.contains(needle));

    if contains_any(&["invalid ref format", "bad name", "refusing to update ref with bad name"]) {
        ReferenceUpdateError::InvalidReference { stderr }
    } else if contains_any(&["nonexistent object", "non-commit object"]) {
        ReferenceUpdateError::Rejected { stderr }
    } else if contains_any(&[
        "cannot lock ref",
        "reference already exists",
        "but expected",
        "unable to resolve reference",
        "exists; cannot create",
    ]) {
        ReferenceUpdateError::Conflict { stderr }
    } else {
        ReferenceUpdateError::GitFailed {
            args,
            status_code,
            stderr,
        }
    }
}
