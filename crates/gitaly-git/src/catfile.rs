//! git object lookup helpers backed by `git cat-file` batch modes.

use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::command::{CommandError, CommandRunner, CommandSpec};
use crate::command_factory::{CommandAllowlist, CommandFactoryError, GitCommandFactory};
use crate::object_id::{ObjectId, ObjectIdError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "commit" => Some(Self::Commit),
            "tree" => Some(Self::Tree),
            "blob" => Some(Self::Blob),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub oid: ObjectId,
    pub object_type: ObjectType,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectData {
    pub info: ObjectInfo,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct CatFileReader {
    repo_path: PathBuf,
    runner: CommandRunner,
    command_factory: GitCommandFactory,
}

impl CatFileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: path.into(),
            runner: CommandRunner,
            command_factory: GitCommandFactory::new(CommandAllowlist::new(["cat-file"])),
        }
    }

    /// Looks up type and size for a revision. `Ok(None)` means git reported
    /// the object as missing.
    pub async fn object_info(&self, spec: &str) -> Result<Option<ObjectInfo>, CatFileError> {
        let stdout = self.batch("--batch-check", spec).await?;
        let stdout = String::from_utf8(stdout)?;
        let first_line = stdout
            .lines()
            .next()
            .ok_or_else(|| CatFileError::InvalidHeader {
                header: "<empty>".to_string(),
            })?;

        parse_batch_header(first_line)
    }

    pub async fn object_contents(&self, spec: &str) -> Result<Option<ObjectData>, CatFileError> {
        let stdout = self.batch("--batch", spec).await?;
        parse_batch_payload(&stdout)
    }

    async fn batch(&self, mode: &str, spec: &str) -> Result<Vec<u8>, CatFileError> {
        validate_spec(spec)?;

        let command = self.git_spec(["cat-file", mode])?;
        let stdin = format!("{spec}\n");
        let output = self
            .runner
            .run_with_input(&command, stdin.as_bytes())
            .await?;

        if !output.success() {
            return Err(CatFileError::CommandFailure {
                status_code: output.status_code,
                stderr: output.stderr_text(),
            });
        }

        Ok(output.stdout)
    }

    fn git_spec<const N: usize>(&self, args: [&str; N]) -> Result<CommandSpec, CatFileError> {
        self.command_factory
            .build_for_repo(&self.repo_path, args)
            .map_err(CatFileError::CommandFactory)
    }
}

#[derive(Debug, Error)]
pub enum CatFileError {
    #[error("failed to build git command: {0}")]
    CommandFactory(#[from] CommandFactoryError),
    #[error("command execution failed: {0}")]
    Command(#[from] CommandError),
    #[error("git command failed with status {status_code:?}: {stderr}")]
    CommandFailure {
        status_code: Option<i32>,
        stderr: String,
    },
    #[error("revision `{spec}` cannot be looked up: {reason}")]
    InvalidSpec { spec: String, reason: &'static str },
    #[error("revision `{spec}` is ambiguous")]
    Ambiguous { spec: String },
    #[error("invalid cat-file header `{header}`")]
    InvalidHeader { header: String },
    #[error("invalid object id in cat-file header `{header}`: {source}")]
    InvalidObjectId {
        header: String,
        #[source]
        source: ObjectIdError,
    },
    #[error("invalid object size in cat-file header `{header}`: {source}")]
    InvalidSize {
        header: String,
        #[source]
        source: ParseIntError,
    },
    #[error("failed to decode UTF-8 from git output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("invalid cat-file payload: {reason}")]
    InvalidPayload { reason: String },
}

fn validate_spec(spec: &str) -> Result<(), CatFileError> {
    let reason = if spec.is_empty() {
        "revision is empty"
    } else if spec.contains(['\n', '\r', '\0']) {
        "revision contains a line break or NUL"
    } else {
        return Ok(());
    };

    Err(CatFileError::InvalidSpec {
        spec: spec.escape_debug().to_string(),
        reason,
    })
}

fn parse_batch_header(line: &str) -> Result<Option<ObjectInfo>, CatFileError> {
    let line = trim_line(line);
    let invalid = || CatFileError::InvalidHeader {
        header: line.to_string(),
    };

    if line.is_empty() {
        return Err(CatFileError::InvalidHeader {
            header: "<empty>".to_string(),
        });
    }

    // `<spec> missing` / `<spec> ambiguous`; the spec itself may contain spaces.
    if line.ends_with(" missing") {
        return Ok(None);
    }
    if let Some(spec) = line.strip_suffix(" ambiguous") {
        return Err(CatFileError::Ambiguous {
            spec: spec.to_string(),
        });
    }

    let mut fields = line.split(' ');
    let oid = fields.next().ok_or_else(invalid)?;
    let object_type = fields.next().ok_or_else(invalid)?;
    let size_text = fields.next().ok_or_else(invalid)?;
    if fields.next().is_some() {
        return Err(invalid());
    }

    let oid = ObjectId::parse(oid).map_err(|source| CatFileError::InvalidObjectId {
        header: line.to_string(),
        source,
    })?;
    let object_type = ObjectType::parse(object_type).ok_or_else(invalid)?;
    let size = size_text
        .parse()
        .map_err(|source| CatFileError::InvalidSize {
            header: line.to_string(),
            source,
        })?;

    Ok(Some(ObjectInfo {
        oid,
        object_type,
        size,
    }))
}

fn parse_batch_payload(stdout: &[u8]) -> Result<Option<ObjectData>, CatFileError> {
    let header_end = stdout
        .iter()
        .position(|byte| *byte == b'\n')
        .ok_or_else(|| CatFileError::InvalidPayload {
            reason: "missing header newline".to_string(),
        })?;
    let header = String::from_utf8(stdout[..header_end].to_vec())?;
    let body_start = header_end + 1;
    let Some(info) = parse_batch_header(&header)? else {
        if body_start != stdout.len() {
            return Err(CatFileError::InvalidPayload {
                reason: "missing object response must not include body bytes".to_string(),
            });
        }

        return Ok(None);
    };

    let body_end =
        body_start
            .checked_add(info.size)
            .ok_or_else(|| CatFileError::InvalidPayload {
                reason: "object size overflows payload indexing".to_string(),
            })?;

    if stdout.len() != body_end + 1 {
        return Err(CatFileError::InvalidPayload {
            reason: format!(
                "expected {} content bytes plus trailer, got {} bytes after header",
                info.size,
                stdout.len().saturating_sub(body_start)
            ),
        });
    }

    if stdout[body_end] != b'\n' {
        return Err(CatFileError::InvalidPayload {
            reason: "payload is missing trailing newline".to_string(),
        });
    }

    Ok(Some(ObjectData {
        info,
        content: stdout[body_start..body_end].to_vec(),
    }))
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
