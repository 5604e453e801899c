use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gitaly_git::{
    ObjectId, ObjectType, RefUpdate, ReferenceName, Repository, RepositoryError,
    RepositoryStore, ReferenceUpdateError, TagObject,
};

mod references {
    use super::*;

    #[tokio::test]
    async fn concurrent_creates_of_one_branch_have_a_single_winner() {
        let repo_dir = TempGitRepo::new();
        let store: Arc<dyn RepositoryStore> = Arc::new(Repository::new(repo_dir.path()));
        let head = repo_dir.head();

        let attempts = (0..8).map(|_| {
            let store = Arc::clone(&store);
            let head = head.clone();
            tokio::spawn(async move {
                store
                    .update_references(
                        &[RefUpdate::Create {
                            reference: ReferenceName::branch("race").expect("valid name"),
                            new_oid: head,
                        }],
                        None,
                        None,
                    )
                    .await
            })
        });

        let mut successes = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            match attempt.await.expect("task should not panic") {
                Ok(()) => successes += 1,
                Err(RepositoryError::ReferenceUpdate(ReferenceUpdateError::Conflict { .. })) => {}
                Err(other) => panic!("unexpected failure: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(
            store
                .get_reference(&ReferenceName::branch("race").expect("valid name"))
                .await
                .expect("lookup should work"),
            Some(head)
        );
    }

    #[tokio::test]
    async fn delete_with_stale_value_keeps_reference() {
        let repo_dir = TempGitRepo::new();
        let store = Repository::new(repo_dir.path());
        let main = ReferenceName::branch("main").expect("valid name");
        let stale = ObjectId::parse("1".repeat(40)).expect("valid id");

        let err = store
            .update_references(
                &[RefUpdate::Delete {
                    reference: main.clone(),
                    old_oid: stale,
                }],
                None,
                None,
            )
            .await
            .expect_err("stale delete must fail");

        assert!(matches!(
            err,
            RepositoryError::ReferenceUpdate(ReferenceUpdateError::Conflict { .. })
        ));
        assert_eq!(
            store.get_reference(&main).await.expect("lookup should work"),
            Some(repo_dir.head())
        );
    }
}

mod objects {
    use super::*;

    #[tokio::test]
    async fn nested_annotated_tags_point_at_each_other() {
        let repo_dir = TempGitRepo::new();
        run_git(repo_dir.path(), &["tag", "-a", "-m", "inner", "inner"]);
        run_git(repo_dir.path(), &["tag", "-a", "-m", "outer", "outer", "inner"]);
        let store: Arc<dyn RepositoryStore> = Arc::new(Repository::new(repo_dir.path()));

        let outer = store
            .read_object("refs/tags/outer")
            .await
            .expect("outer tag should be readable")
            .expect("outer tag should exist");
        assert_eq!(outer.info.object_type, ObjectType::Tag);

        let outer = TagObject::parse(&outer.content).expect("outer tag should parse");
        assert_eq!(outer.object_type, ObjectType::Tag);

        let inner = store
            .read_object(outer.object.as_str())
            .await
            .expect("inner tag should be readable")
            .expect("inner tag should exist");
        let inner = TagObject::parse(&inner.content).expect("inner tag should parse");

        assert_eq!(inner.object_type, ObjectType::Commit);
        assert_eq!(inner.object, repo_dir.head());
    }

    #[tokio::test]
    async fn list_references_returns_every_branch() {
        let repo_dir = TempGitRepo::new();
        run_git(repo_dir.path(), &["branch", "zeta"]);
        run_git(repo_dir.path(), &["branch", "alpha"]);
        let store = Repository::new(repo_dir.path());

        let names: Vec<String> = store
            .list_references("refs/heads/")
            .await
            .expect("listing should work")
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        assert_eq!(
            names,
            vec!["refs/heads/alpha", "refs/heads/main", "refs/heads/zeta"]
        );
    }
}

struct TempGitRepo {
    path: PathBuf,
}

impl TempGitRepo {
    fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        let path = std::env::temp_dir().join(format!(
            "gitaly-git-store-contract-tests-{}-{}",
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&path).expect("temp repo directory should be creatable");

        run_git(&path, &["init", "--quiet"]);
        run_git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run_git(&path, &["config", "user.name", "Store Contract Tests"]);
        run_git(&path, &["config", "user.email", "store-contract-tests@example.com"]);

        fs::write(path.join("README.md"), b"store contract\n").expect("README should be writable");
        run_git(&path, &["add", "README.md"]);
        run_git(&path, &["commit", "--quiet", "-m", "initial commit"]);

        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn head(&self) -> ObjectId {
        ObjectId::parse(run_git_stdout(&self.path, &["rev-parse", "HEAD"]))
            .expect("rev-parse prints full ids")
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
