//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Settings that keep catalog loading local
pub const LOCAL_ONLY: &str = "[catalog]\nsearch_remote = false\n";

/// A throwaway git repository
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create a repository on `main` with one commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "tag.gpgSign", "false"])?;
    git(&path, &["config", "commit.gpgSign", "false"])?;

    std::fs::write(path.join("README.md"), "# widgets\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;

    Ok(Self { _root: root, path })
  }

  /// Record an empty commit and return its SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["commit", "--allow-empty", "-m", message])?;
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Lightweight tag on HEAD
  pub fn tag(&self, name: &str) -> Result<()> {
    git(&self.path, &["tag", name])?;
    Ok(())
  }

  pub fn set_origin(&self, url: &str) -> Result<()> {
    git(&self.path, &["remote", "add", "origin", url])?;
    Ok(())
  }

  /// Write a file relative to the repository root, creating parent directories
  pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
    let file = self.path.join(relative);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, content)?;
    Ok(())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Captured result of a `warden` invocation
pub struct Run {
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

/// Run the warden binary; failures are returned, not raised
pub fn run_warden(cwd: &Path, args: &[&str]) -> Result<Run> {
  let output = Command::new(env!("CARGO_BIN_EXE_warden"))
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .env_remove("GITHUB_TOKEN")
    .env_remove("GH_TOKEN")
    .output()
    .context("Failed to run warden")?;

  Ok(Run {
    code: output.status.code(),
    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
  })
}
