//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

use git2::{Oid, Repository, Signature};

use rune::git::Git;

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory, with an
    /// identity configured so `git commit` works.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config.set_str("user.name", "Test User").expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");
        config
            .set_bool("commit.gpgsign", false)
            .expect("Failed to disable signing");

        Self { dir, repo }
    }

    /// A repository with one commit containing `README.md`.
    pub fn with_initial_commit() -> Self {
        let repo = Self::new();
        repo.commit_file("README.md", "# test\n", "Initial commit");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self) -> Git {
        Git::discover(self.path()).expect("Failed to discover test repo")
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file in the working tree, creating parent directories.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, content).expect("Failed to write test file");
    }

    /// Add a working-tree file to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.read(true).expect("Failed to reload index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write, stage and commit one file. Returns the commit OID.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        self.write(name, content);
        self.stage(name);
        self.commit_index(message)
    }

    /// Commit whatever is in the index.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig = self.signature();

        let mut index = self.repo.index().expect("Failed to get index");
        index.read(true).expect("Failed to reload index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Install a `pre-commit` hook that rejects every commit.
    #[cfg(unix)]
    pub fn reject_commits(&self) {
        use std::os::unix::fs::PermissionsExt;

        let hook = self.path().join(".git").join("hooks").join("pre-commit");
        std::fs::create_dir_all(hook.parent().expect("hook has a parent"))
            .expect("Failed to create hooks dir");
        std::fs::write(&hook, "#!/bin/sh\necho 'rejected by hook' >&2\nexit 1\n")
            .expect("Failed to write hook");
        std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make hook executable");
    }

    /// Paths currently staged, as reported by the git CLI.
    pub fn staged_files(&self) -> BTreeSet<String> {
        let output = Command::new("git")
            .args(["diff", "--cached", "--name-only"])
            .current_dir(self.path())
            .output()
            .expect("Failed to run git diff");
        assert!(output.status.success(), "git diff --cached failed");
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Number of commits reachable from HEAD (0 on an unborn branch).
    pub fn commit_count(&self) -> usize {
        let Ok(head) = self.repo.head() else {
            return 0;
        };
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        walk.push(head.target().expect("HEAD has no target"))
            .expect("Failed to push HEAD");
        walk.count()
    }

    /// Full message of the HEAD commit.
    pub fn head_message(&self) -> String {
        let commit = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("No HEAD commit");
        commit.message().unwrap_or_default().to_string()
    }

    /// Paths in the HEAD commit's tree.
    pub fn head_files(&self) -> BTreeSet<String> {
        let tree = self
            .repo
            .head()
            .and_then(|h| h.peel_to_tree())
            .expect("No HEAD tree");
        let mut files = BTreeSet::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                files.insert(format!("{}{}", root, entry.name().unwrap_or_default()));
            }
            git2::TreeWalkResult::Ok
        })
        .expect("Failed to walk tree");
        files
    }
}

/// Build a path set from string literals.
pub fn paths(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}
