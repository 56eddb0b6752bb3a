//! Repository handle for the commit flow.
//!
//! Discovery uses git2; diffing, staging and committing shell out to the
//! system `git` binary so the user's hooks, config and index locking apply.

use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use git2::Repository;
use tracing::debug;

use crate::error::GitError;

/// A set of repository-relative paths. Ordering is irrelevant to callers;
/// `BTreeSet` keeps listings and git arguments deterministic.
pub type StagedSet = BTreeSet<String>;

/// Which changes a diff covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffScope {
    /// Only changes in the index (`git diff --cached`).
    Staged,
    /// Staged and unstaged changes relative to HEAD (`git diff HEAD`).
    LastCommit,
}

impl fmt::Display for DiffScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffScope::Staged => f.write_str("staged changes"),
            DiffScope::LastCommit => f.write_str("changes since last commit"),
        }
    }
}

/// Check that the `git` binary is available.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git").map(|_| ()).map_err(|_| GitError::NotInstalled)
}

/// A non-bare git repository, addressed by its work-tree root.
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
}

impl Git {
    /// Find the repository containing `path` and resolve its root.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let not_a_repo = || GitError::NotARepository {
            path: path.to_path_buf(),
        };

        let repo = Repository::discover(path).map_err(|_| not_a_repo())?;
        let root = repo.workdir().ok_or_else(not_a_repo)?.to_path_buf();

        debug!("Repository root: {}", root.display());
        Ok(Self { root })
    }

    /// Whether `path` is inside a non-bare repository.
    pub fn is_repository(path: &Path) -> bool {
        Repository::discover(path).is_ok_and(|repo| !repo.is_bare())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether HEAD points at a commit (false on an unborn branch).
    pub fn has_head(&self) -> bool {
        Repository::open(&self.root)
            .map(|repo| repo.head().is_ok())
            .unwrap_or(false)
    }

    /// Textual diff for `scope`.
    ///
    /// Fails with `NoChanges` when the diff is empty after trimming. On a
    /// repository without commits `LastCommit` falls back to the staged diff.
    pub fn diff(&self, scope: DiffScope) -> Result<String, GitError> {
        let effective = match scope {
            DiffScope::LastCommit if !self.has_head() => DiffScope::Staged,
            other => other,
        };

        let args: &[&str] = match effective {
            DiffScope::Staged => &["diff", "--cached", "--no-color", "--no-ext-diff"],
            DiffScope::LastCommit => &["diff", "HEAD", "--no-color", "--no-ext-diff"],
        };

        let diff = self.run(args, "diff")?;
        let diff = diff.trim();
        if diff.is_empty() {
            return Err(GitError::NoChanges {
                scope: scope.to_string(),
            });
        }

        Ok(diff.to_string())
    }

    /// Paths currently staged for commit. A staged rename lists both the
    /// old and the new path.
    pub fn list_staged_files(&self) -> Result<StagedSet, GitError> {
        let output = self.run(
            &["diff", "--cached", "--name-only", "--no-renames", "-z"],
            "list staged files",
        )?;
        Ok(output
            .split('\0')
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Stage every change in the working tree (`git add --all`).
    pub fn stage_all(&self) -> Result<(), GitError> {
        let output = self.output(&["add", "--all"], "add")?;
        if !output.status.success() {
            return Err(GitError::StageFailed(combined_output(&output)));
        }
        Ok(())
    }

    /// Remove `paths` from the index, leaving the working tree alone.
    ///
    /// Unstaging an already-unstaged path is not an error.
    pub fn unstage(&self, paths: &StagedSet) -> Result<(), GitError> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut args: Vec<&str> = if self.has_head() {
            vec!["reset", "-q", "HEAD", "--"]
        } else {
            // Nothing to reset to: drop the entries from the index instead.
            vec!["rm", "--cached", "-r", "-q", "--ignore-unmatch", "--"]
        };
        args.extend(paths.iter().map(String::as_str));

        let output = self.output(&args, "unstage")?;
        if !output.status.success() {
            return Err(GitError::UnstageFailed(combined_output(&output)));
        }
        Ok(())
    }

    /// Commit the index with `message`, passed to `git commit -F` through a
    /// temp file that is removed whether or not the commit succeeds.
    pub fn commit_with_message(&self, message: &str) -> Result<(), GitError> {
        let mut file = tempfile::Builder::new()
            .prefix("rune-commit-")
            .suffix(".txt")
            .tempfile()
            .map_err(GitError::MessageFile)?;
        file.write_all(message.as_bytes())
            .and_then(|()| file.flush())
            .map_err(GitError::MessageFile)?;

        let path = file.path().to_string_lossy().to_string();
        let output = self.output(&["commit", "-F", &path], "commit")?;
        if !output.status.success() {
            return Err(GitError::CommitFailed(combined_output(&output)));
        }

        debug!("git commit: {}", String::from_utf8_lossy(&output.stdout).trim());
        Ok(())
    }

    /// Run git and return stdout, failing on a non-zero exit.
    fn run(&self, args: &[&str], operation: &str) -> Result<String, GitError> {
        let output = self.output(args, operation)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                operation: operation.to_string(),
                output: combined_output(&output),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn output(&self, args: &[&str], operation: &str) -> Result<Output, GitError> {
        debug!("git {}", args.join(" "));
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| GitError::Spawn {
                operation: operation.to_string(),
                source,
            })
    }
}

/// Stdout and stderr of a finished git process, trimmed.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{}{}", stdout, stderr).trim().to_string()
}
