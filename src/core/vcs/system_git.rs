//! System git backend
//!
//! Uses git plumbing commands for all operations:
//! - `for-each-ref` to list and peel tags in one call
//! - `log` with control-character separators for commit ranges
//! - Safe subprocess execution (isolated environment)

use super::{CommitInfo, TagInfo, VersionControl};
use crate::core::error::{GitError, WardenError, WardenResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Git backend using the system `git` binary
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> WardenResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") || stderr.contains("cannot change to") {
        return Err(WardenError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(WardenError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root of the repository
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("core.quotePath=false");
    cmd.arg("-c").arg("log.showSignature=false");

    cmd
  }

  /// Run a git command and fail on non-zero exit
  pub(crate) fn run(&self, args: &[&str], what: &str) -> WardenResult<Output> {
    let output = self.git_cmd().args(args).output().context(what.to_string())?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(WardenError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(output)
  }
}

impl VersionControl for SystemGit {
  fn list_tags(&self) -> WardenResult<Vec<TagInfo>> {
    self.tags()
  }

  fn commit_range(&self, from: &str, to: &str) -> WardenResult<Vec<CommitInfo>> {
    self.commits_between(from, to)
  }

  fn remote_origin_url(&self) -> WardenResult<String> {
    self.get_remote_url("origin")?.ok_or_else(|| {
      WardenError::Git(GitError::RemoteNotFound {
        name: "origin".to_string(),
      })
    })
  }
}
