//! repository-level git command helpers.

use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::catfile::{CatFileError, CatFileReader, ObjectData, ObjectInfo};
use crate::command::{CommandError, CommandRunner, CommandSpec};
use crate::command_factory::{CommandFactoryError, GitCommandFactory};
use crate::object_id::{ObjectId, ObjectIdError};
use crate::reference::{
    RefActor, RefUpdate, ReferenceName, ReferenceUpdateError, ReferenceUpdater,
};
use crate::tag::NewTag;

#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    runner: CommandRunner,
    command_factory: GitCommandFactory,
    catfile_reader: CatFileReader,
    reference_updater: ReferenceUpdater,
}

impl Repository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        Self {
            runner: CommandRunner,
            command_factory: GitCommandFactory::default(),
            catfile_reader: CatFileReader::new(path.clone()),
            reference_updater: ReferenceUpdater::new(path.clone()),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves any revision git understands to the object it names,
    /// without peeling tags. `Ok(None)` when nothing matches.
    pub async fn object_info(&self, revision: &str) -> Result<Option<ObjectInfo>, RepositoryError> {
        self.catfile_reader
            .object_info(revision)
            .await
            .map_err(RepositoryError::from_catfile)
    }

    pub async fn read_object(&self, revision: &str) -> Result<Option<ObjectData>, RepositoryError> {
        self.catfile_reader
            .object_contents(revision)
            .await
            .map_err(RepositoryError::from_catfile)
    }

    /// Current value of a fully-qualified reference, unpeeled. Only the
    /// exact name matches: `refs/tags/refs/heads/x` never answers for
    /// `refs/heads/x`, and `refs/heads/x/y` is not `refs/heads/x`.
    pub async fn get_reference(
        &self,
        name: &ReferenceName,
    ) -> Result<Option<ObjectId>, RepositoryError> {
        let references = self.list_references(name.as_str()).await?;

        Ok(references
            .into_iter()
            .find_map(|(refname, oid)| (refname == name.as_str()).then_some(oid)))
    }

    /// References under `prefix` (e.g. `refs/heads/`), sorted by name.
    pub async fn list_references(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, ObjectId)>, RepositoryError> {
        let spec = self.git_spec([
            "for-each-ref",
            "--sort=refname",
            "--format=%(objectname) %(refname)",
            prefix,
        ])?;
        let output = self.runner.run(&spec).await?;

        if !output.success() {
            return Err(RepositoryError::CommandFailure {
                args: spec.display_args(),
                status_code: output.status_code,
                stderr: output.stderr_text(),
            });
        }

        String::from_utf8(output.stdout)?
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| -> Result<(String, ObjectId), RepositoryError> {
                let (oid, name) = line
                    .split_once(' ')
                    .ok_or_else(|| RepositoryError::InvalidOutput {
                        reason: format!("unexpected for-each-ref line `{line}`"),
                    })?;
                Ok((name.to_string(), ObjectId::parse(oid)?))
            })
            .collect()
    }

    pub async fn update_references(
        &self,
        updates: &[RefUpdate],
        actor: Option<&RefActor>,
        message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        self.reference_updater
            .apply(updates, actor, message)
            .await
            .map_err(RepositoryError::ReferenceUpdate)
    }

    /// Writes an annotated tag object and returns its id. No reference is touched.
    pub async fn write_tag(&self, tag: &NewTag<'_>) -> Result<ObjectId, RepositoryError> {
        let spec = self.git_spec(["mktag"])?;
        let output = self.runner.run_with_input(&spec, &tag.render()).await?;

        if !output.success() {
            return Err(RepositoryError::CommandFailure {
                args: spec.display_args(),
                status_code: output.status_code,
                stderr: output.stderr_text(),
            });
        }

        parse_single_oid(output.stdout)
    }

    fn git_spec<const N: usize>(&self, args: [&str; N]) -> Result<CommandSpec, RepositoryError> {
        self.command_factory
            .build_for_repo(&self.path, args)
            .map_err(RepositoryError::CommandFactory)
    }
}

fn parse_single_oid(stdout: Vec<u8>) -> Result<ObjectId, RepositoryError> {
    let stdout = String::from_utf8(stdout)?;
    let oid = stdout.trim();
    if oid.is_empty() {
        return Err(RepositoryError::InvalidOutput {
            reason: "expected an object id, got empty output".to_string(),
        });
    }

    Ok(ObjectId::parse(oid)?)
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("revision `{spec}` is ambiguous")]
    AmbiguousRevision { spec: String },
    #[error("revision `{spec}` cannot be looked up: {reason}")]
    InvalidRevision { spec: String, reason: &'static str },
    #[error("cat-file operation failed: {0}")]
    CatFile(CatFileError),
    #[error(transparent)]
    ReferenceUpdate(ReferenceUpdateError),
    #[error("failed to build git command: {0}")]
    CommandFactory(#[from] CommandFactoryError),
    #[error("command execution failed: {0}")]
    Command(#[from] CommandError),
    #[error("git command failed `git {args}` (status {status_code:?}): {stderr}")]
    CommandFailure {
        args: String,
        status_code: Option<i32>,
        stderr: String,
    },
    #[error("failed to parse UTF-8 output: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("invalid object id in git output: {0}")]
    ObjectId(#[from] ObjectIdError),
    #[error("invalid git output: {reason}")]
    InvalidOutput { reason: String },
}

impl RepositoryError {
    fn from_catfile(err: CatFileError) -> Self {
        match err {
            CatFileError::Ambiguous { spec } => Self::AmbiguousRevision { spec },
            CatFileError::InvalidSpec { spec, reason } => Self::InvalidRevision { spec, reason },
            other => Self::CatFile(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Repository, RepositoryError};
    use crate::catfile::ObjectType;
    use crate::commit::Signature;
    use crate::object_id::ObjectId;
    use crate::reference::{RefUpdate, ReferenceName, ReferenceUpdateError};
    use crate::tag::{NewTag, TagObject};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Output};
    use std::sync::atomic::{AtomicU64, Ordering};

    const EXISTING_BRANCH: &str = "feature/tdd-branch";

    fn branch(name: &str) -> ReferenceName {
        ReferenceName::branch(name).expect("test branch names are valid")
    }

    #[tokio::test]
    async fn object_info_resolves_head_to_commit() {
        let repo_dir = TempGitRepo::new();
        let repository = Repository::new(repo_dir.path());
        let expected_head = run_git_stdout(repo_dir.path(), &["rev-parse", "HEAD"]);

        let info = repository
            .object_info("HEAD")
            .await
            .expect("HEAD should resolve")
            .expect("HEAD should exist");

        assert_eq!(info.oid.as_str(), expected_head);
        assert_eq!(info.object_type, ObjectType::Commit);
    }

    #[tokio::test]
    async fn get_reference_reads_existing_and_missing_refs() {
        let repo_dir = TempGitRepo::new();
        let repository = Repository::new(repo_dir.path());
        let expected = run_git_stdout(repo_dir.path(), &["rev-parse", "HEAD"]);

        let existing = repository
            .get_reference(&branch(EXISTING_BRANCH))
            .await
            .expect("existing branch ref should read cleanly");
        let missing = repository
            .get_reference(&branch("does-not-exist"))
            .await
            .expect("missing refs should not hard-error");

        assert_eq!(existing.map(|oid| oid.to_string()), Some(expected));
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn get_reference_ignores_shadowing_and_nested_refs() {
        let repo_dir = TempGitRepo::new();
        run_git(
            repo_dir.path(),
            &["update-ref", "refs/tags/refs/heads/ghost", "HEAD"],
        );
        run_git(
            repo_dir.path(),
            &["update-ref", "refs/heads/refs/heads/ghost", "HEAD"],
        );
        run_git(repo_dir.path(), &["update-ref", "refs/heads/parent/child", "HEAD"]);
        let repository = Repository::new(repo_dir.path());

        for name in ["ghost", "parent"] {
            let value = repository
                .get_reference(&branch(name))
                .await
                .expect("lookup should not hard-error");
            assert_eq!(value, None, "refs/heads/{name} does not exist");
        }
        assert!(repository
            .get_reference(&branch("parent/child"))
            .await
            .expect("lookup should work")
            .is_some());
    }

    #[tokio::test]
    async fn line_breaks_in_revisions_are_invalid_revisions() {
        let repo_dir = TempGitRepo::new();
        let repository = Repository::new(repo_dir.path());

        let err = repository
            .object_info("main\nmain")
            .await
            .expect_err("line breaks cannot be sent to cat-file");

        assert!(matches!(err, RepositoryError::InvalidRevision { .. }));
    }

    #[tokio::test]
    async fn list_references_is_sorted_and_scoped_to_prefix() {
        let repo_dir = TempGitRepo::new();
        let head = run_git_stdout(repo_dir.path(), &["rev-parse", "HEAD"]);
        run_git(repo_dir.path(), &["tag", "v1"]);
        let repository = Repository::new(repo_dir.path());

        let branches = repository
            .list_references("refs/heads/")
            .await
            .expect("listing should work");

        let names: Vec<&str> = branches.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec!["refs/heads/feature/tdd-branch", "refs/heads/main"]
        );
        assert!(branches.iter().all(|(_, oid)| oid.as_str() == head));
    }

    #[tokio::test]
    async fn update_references_surfaces_conflicts() {
        let repo_dir = TempGitRepo::new();
        let repository = Repository::new(repo_dir.path());
        let head = ObjectId::parse(run_git_stdout(repo_dir.path(), &["rev-parse", "HEAD"]))
            .expect("valid id");

        let err = repository
            .update_references(
                &[RefUpdate::Create {
                    reference: branch(EXISTING_BRANCH),
                    new_oid: head,
                }],
                None,
                None,
            )
            .await
            .expect_err("branch exists");

        assert!(matches!(
            err,
            RepositoryError::ReferenceUpdate(ReferenceUpdateError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn write_tag_creates_annotated_tag_object() {
        let repo_dir = TempGitRepo::new();
        let repository = Repository::new(repo_dir.path());
        let head = ObjectId::parse(run_git_stdout(repo_dir.path(), &["rev-parse", "HEAD"]))
            .expect("valid id");
        let tagger = Signature {
            name: b"Tagger".to_vec(),
            email: b"tagger@example.com".to_vec(),
            seconds: 1_700_000_000,
            timezone: "+0000".to_string(),
        };

        let tag_oid = repository
            .write_tag(&NewTag {
                target: &head,
                target_type: ObjectType::Commit,
                name: "v1.0.0",
                tagger: &tagger,
                message: b"release",
            })
            .await
            .expect("mktag should succeed");

        let object = repository
            .read_object(tag_oid.as_str())
            .await
            .expect("tag should be readable")
            .expect("tag should exist");
        assert_eq!(object.info.object_type, ObjectType::Tag);

        let tag = TagObject::parse(&object.content).expect("tag should parse");
        assert_eq!(tag.object, head);
        assert_eq!(tag.message, b"release\n");
    }

    struct TempGitRepo {
        path: PathBuf,
    }

    impl TempGitRepo {
        fn new() -> Self {
            static NEXT_ID: AtomicU64 = AtomicU64::new(0);
            let path = std::env::temp_dir().join(format!(
                "gitaly-git-repository-tests-{}-{}",
                std::process::id(),
                NEXT_ID.fetch_add(1, Ordering::Relaxed)
            ));
            fs::create_dir_all(&path).expect("temp repo directory should be creatable");

            run_git(&path, &["init", "--quiet"]);
            run_git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
            run_git(&path, &["config", "user.name", "Repository Tests"]);
            run_git(&path, &["config", "user.email", "repository-tests@example.com"]);

            fs::write(path.join("README.md"), b"test repository\n")
                .expect("README should be writable");

            run_git(&path, &["add", "README.md"]);
            run_git(&path, &["commit", "--quiet", "-m", "initial commit"]);
            run_git(&path, &["branch", EXISTING_BRANCH]);

            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempGitRepo {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    fn run_git(repo_path: &Path, args: &[&str]) {
        run_git_stdout(repo_path, args);
    }

    fn run_git_stdout(repo_path: &Path, args: &[&str]) -> String {
        let output = run_git_output(repo_path, args);

        assert!(
            output.status.success(),
            "git command failed: git -C {} {}\nstdout: {}\nstderr: {}",
            repo_path.display(),
            args.join(" "),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        String::from_utf8(output.stdout)
            .expect("git stdout should be UTF-8")
            .trim_end_matches(['\n', '\r'])
            .to_string()
    }

    fn run_git_output(repo_path: &Path, args: &[&str]) -> Output {
        Command::new("git")
            .arg("-C")
            .arg(repo_path)
            .args(args)
            .output()
            .expect("git command should execute")
    }
}
