use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gitaly_git::{
    NewTag, ObjectData, ObjectId, ObjectInfo, RefActor, RefUpdate, ReferenceName,
    RepositoryError, RepositoryStore,
};
use gitaly_proto::gitaly::User;
use gitaly_storage::Locator;
use tonic::Request;

use crate::dependencies::Dependencies;
use crate::service::resolver::REPO_PATH_METADATA_KEY;

pub(crate) const REPO_NAME: &str = "project.git";

/// A storage root holding one repository with two commits on `main`.
pub(crate) struct StorageFixture {
    pub root: PathBuf,
    pub repo_path: PathBuf,
    pub first: String,
    pub second: String,
}

impl StorageFixture {
    pub fn new(name: &str) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        let root = std::env::temp_dir().join(format!(
            "gitaly-server-{name}-{}-{}",
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        ));
        let repo_path = root.join(REPO_NAME);
        fs::create_dir_all(&repo_path).expect("repo path should be creatable");

        git(&repo_path, &["init", "--quiet"]);
        git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&repo_path, &["config", "user.name", "Service Tests"]);
        git(&repo_path, &["config", "user.email", "service-tests@example.com"]);

        fs::write(repo_path.join("README.md"), "first\n").expect("README should write");
        git(&repo_path, &["add", "README.md"]);
        git(&repo_path, &["commit", "--quiet", "-m", "first"]);
        let first = git(&repo_path, &["rev-parse", "HEAD"]);

        fs::write(repo_path.join("README.md"), "second\n").expect("README should write");
        git(&repo_path, &["add", "README.md"]);
        git(
            &repo_path,
            &["commit", "--quiet", "-m", "second", "-m", "with a body"],
        );
        let second = git(&repo_path, &["rev-parse", "HEAD"]);

        Self {
            root,
            repo_path,
            first,
            second,
        }
    }

    pub fn dependencies(&self) -> Arc<Dependencies> {
        let locator =
            Locator::new([("default", self.root.clone())]).expect("storage root should open");
        Arc::new(Dependencies::new(locator))
    }

    pub fn git(&self, args: &[&str]) -> String {
        git(&self.repo_path, args)
    }

    pub fn ref_value(&self, reference: &str) -> Option<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(["show-ref", "--verify", "--hash", reference])
            .output()
            .expect("git should execute");
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Drop for StorageFixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Passes everything through, but removes each created or updated reference
/// right after the transaction commits, as a concurrent deleter would.
pub(crate) struct LostRaceStore {
    inner: Arc<dyn RepositoryStore>,
}

impl LostRaceStore {
    pub fn new(inner: Arc<dyn RepositoryStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl RepositoryStore for LostRaceStore {
    async fn object_info(&self, revision: &str) -> Result<Option<ObjectInfo>, RepositoryError> {
        self.inner.object_info(revision).await
    }

    async fn read_object(&self, revision: &str) -> Result<Option<ObjectData>, RepositoryError> {
        self.inner.read_object(revision).await
    }

    async fn get_reference(
        &self,
        name: &ReferenceName,
    ) -> Result<Option<ObjectId>, RepositoryError> {
        self.inner.get_reference(name).await
    }

    async fn list_references(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, ObjectId)>, RepositoryError> {
        self.inner.list_references(prefix).await
    }

    async fn update_references(
        &self,
        updates: &[RefUpdate],
        actor: Option<&RefActor>,
        message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        self.inner.update_references(updates, actor, message).await?;

        let deletes: Vec<RefUpdate> = updates
            .iter()
            .filter_map(|update| match update {
                RefUpdate::Create { reference, new_oid }
                | RefUpdate::Update {
                    reference, new_oid, ..
                } => Some(RefUpdate::Delete {
                    reference: reference.clone(),
                    old_oid: new_oid.clone(),
                }),
                RefUpdate::Delete { .. } => None,
            })
            .collect();
        if deletes.is_empty() {
            return Ok(());
        }
        self.inner.update_references(&deletes, None, None).await
    }

    async fn write_tag(&self, tag: &NewTag<'_>) -> Result<ObjectId, RepositoryError> {
        self.inner.write_tag(tag).await
    }
}

pub(crate) fn request<T>(payload: T) -> Request<T> {
    let mut request = Request::new(payload);
    request.metadata_mut().insert(
        REPO_PATH_METADATA_KEY,
        REPO_NAME.parse().expect("metadata should parse"),
    );
    request
}

pub(crate) fn user() -> User {
    User {
        gl_id: "user-123".to_string(),
        name: b"Jane Doe".to_vec(),
        email: b"jane@example.com".to_vec(),
        gl_username: "jane".to_string(),
    }
}

fn git(repo_path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(args)
        .output()
        .expect("git should execute");
    assert!(
        output.status.success(),
        "git -C {} {} failed\nstdout: {}\nstderr: {}",
        repo_path.display(),
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
