#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use gitaly_git::{
    NewTag, ObjectData, ObjectId, ObjectInfo, RefActor, RefUpdate, ReferenceName, Repository,
    RepositoryError, RepositoryStore,
};
use gitaly_ops::{RpcRequest, RpcResponse, REPO_PATH_METADATA_KEY};
use gitaly_proto::gitaly::User;
use gitaly_server::{Dependencies, GitalyServer, ServiceSet};
use gitaly_storage::Locator;
use tonic::{Request, Status};

pub const DEFAULT_STORAGE_NAME: &str = "default";
pub const REPO_NAME: &str = "project.git";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TestDirs {
    pub root_dir: PathBuf,
    pub storage_dir: PathBuf,
}

impl TestDirs {
    pub fn new(prefix: &str) -> Self {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let now_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        let root_dir = std::env::temp_dir().join(format!(
            "gitaly-ops-tests-{prefix}-{}-{now_nanos}-{counter}",
            std::process::id()
        ));
        let storage_dir = root_dir.join("storage");
        std::fs::create_dir_all(&storage_dir).expect("storage dir should be creatable");

        Self {
            root_dir,
            storage_dir,
        }
    }
}

impl Drop for TestDirs {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root_dir);
    }
}

/// A storage holding `project.git` with two commits on `main`.
pub struct TestRepo {
    pub dirs: TestDirs,
    pub repo_path: PathBuf,
    pub first: String,
    pub second: String,
}

impl TestRepo {
    pub fn new(prefix: &str) -> Self {
        let dirs = TestDirs::new(prefix);
        let repo_path = dirs.storage_dir.join(REPO_NAME);
        std::fs::create_dir_all(&repo_path).expect("repo dir should be creatable");

        run_git(&repo_path, &["init", "--quiet"]);
        run_git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run_git(&repo_path, &["config", "user.name", "Integration Tests"]);
        run_git(&repo_path, &["config", "user.email", "integration@example.com"]);

        std::fs::write(repo_path.join("README.md"), b"first\n").expect("README should write");
        run_git(&repo_path, &["add", "README.md"]);
        run_git(&repo_path, &["commit", "--quiet", "-m", "first"]);
        let first = run_git(&repo_path, &["rev-parse", "HEAD"]);

        std::fs::write(repo_path.join("README.md"), b"second\n").expect("README should write");
        run_git(&repo_path, &["add", "README.md"]);
        run_git(&repo_path, &["commit", "--quiet", "-m", "second"]);
        let second = run_git(&repo_path, &["rev-parse", "HEAD"]);

        Self {
            dirs,
            repo_path,
            first,
            second,
        }
    }

    pub fn git(&self, args: &[&str]) -> String {
        run_git(&self.repo_path, args)
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

    pub fn refs(&self) -> Vec<String> {
        self.git(&["for-each-ref", "--format=%(refname)"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn dependencies(&self) -> Dependencies {
        let locator = Locator::new([(DEFAULT_STORAGE_NAME, self.dirs.storage_dir.clone())])
            .expect("storage should open");
        Dependencies::new(locator)
    }

    pub fn server(&self) -> GitalyServer {
        GitalyServer::new(ServiceSet::all(Arc::new(self.dependencies())))
    }

    /// A server whose store deletes every reference it just wrote.
    pub fn racing_server(&self) -> GitalyServer {
        let dependencies = self.dependencies().with_store_factory(Arc::new(
            |path: &Path| -> Arc<dyn RepositoryStore> {
                Arc::new(LostRaceStore {
                    inner: Repository::new(path),
                })
            },
        ));
        GitalyServer::new(ServiceSet::all(Arc::new(dependencies)))
    }
}

pub fn run_git(repo_path: &Path, args: &[&str]) -> String {
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

pub fn with_repo<T>(payload: T) -> Request<T> {
    let mut request = Request::new(payload);
    request.metadata_mut().insert(
        REPO_PATH_METADATA_KEY,
        REPO_NAME.parse().expect("metadata should parse"),
    );
    request
}

pub fn user() -> User {
    User {
        gl_id: "user-42".to_string(),
        name: b"Ada Lovelace".to_vec(),
        email: b"ada@example.com".to_vec(),
        gl_username: "ada".to_string(),
    }
}

pub async fn call(server: &GitalyServer, request: RpcRequest) -> Result<RpcResponse, Status> {
    server.call(request).await
}

struct LostRaceStore {
    inner: Repository,
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

        for update in updates {
            if let RefUpdate::Create { reference, new_oid }
            | RefUpdate::Update {
                reference, new_oid, ..
            } = update
            {
                self.inner
                    .update_references(
                        &[RefUpdate::Delete {
                            reference: reference.clone(),
                            old_oid: new_oid.clone(),
                        }],
                        None,
                        None,
                    )
                    .await?;
            }
        }

        Ok(())
    }

    async fn write_tag(&self, tag: &NewTag<'_>) -> Result<ObjectId, RepositoryError> {
        self.inner.write_tag(tag).await
    }
}
