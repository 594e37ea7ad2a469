pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::WardenResult;
use crate::version::TagVersion;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Information about a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
  pub sha: String,
  pub message: String,
  pub committed_at: DateTime<Utc>,
}

impl CommitInfo {
  /// First line of the commit message
  pub fn summary(&self) -> &str {
    self.message.lines().next().unwrap_or("")
  }
}

/// A tag resolved to the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
  pub name: String,
  /// Commit SHA (annotated tags are peeled)
  pub commit: String,
  /// Commit timestamp of the tagged commit
  pub committed_at: DateTime<Utc>,
  /// Parsed version, `None` when the name is not a version
  pub version: Option<TagVersion>,
}

impl TagInfo {
  /// Build a tag, parsing its version from the name
  pub fn new(name: impl Into<String>, commit: impl Into<String>, committed_at: DateTime<Utc>) -> Self {
    let name = name.into();
    let version = TagVersion::parse(&name);
    Self {
      name,
      commit: commit.into(),
      committed_at,
      version,
    }
  }

  /// True when the tag names a pre-release version
  pub fn is_prerelease(&self) -> bool {
    self.version.as_ref().is_some_and(|v| v.is_prerelease())
  }

  /// True when the tag can start an unreleased window
  pub fn is_release(&self) -> bool {
    self.version.as_ref().is_some_and(|v| !v.is_prerelease())
  }
}

/// Read-only view of the local repository
///
/// The engine never writes history; `SystemGit` implements this for real clones and
/// tests provide in-memory fakes.
pub trait VersionControl {
  /// All tags, in no particular order
  fn list_tags(&self) -> WardenResult<Vec<TagInfo>>;

  /// Commits reachable from `to` but not from `from` (newest first)
  fn commit_range(&self, from: &str, to: &str) -> WardenResult<Vec<CommitInfo>>;

  /// URL of the `origin` remote
  fn remote_origin_url(&self) -> WardenResult<String>;
}
