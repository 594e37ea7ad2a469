//! Commit Window Resolver
//!
//! The window is everything reachable from the branch tip but not from the newest
//! non-prerelease tag (the boundary). The boundary's commit timestamp is the cutoff that
//! bounds the pull-request walk.

use crate::core::error::{ReleaseError, WardenError, WardenResult};
use crate::core::vcs::{CommitInfo, TagInfo, VersionControl};
use crate::ui::term::humanize_age;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Commits not yet explained by a pull request
///
/// Built once from the VCS listing; entries can only be taken out.
#[derive(Debug, Clone)]
pub struct UnreleasedCommits {
  commits: HashMap<String, CommitInfo>,
  /// VCS listing order (newest first)
  order: Vec<String>,
}

impl UnreleasedCommits {
  pub fn new(commits: Vec<CommitInfo>) -> Self {
    let order = commits.iter().map(|c| c.sha.clone()).collect();
    let commits = commits.into_iter().map(|c| (c.sha.clone(), c)).collect();
    Self { commits, order }
  }

  /// Remove a commit, returning it if it was still unexplained
  pub fn take(&mut self, sha: &str) -> Option<CommitInfo> {
    self.commits.remove(sha)
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.commits.len()
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.commits.is_empty()
  }

  /// Commits still unexplained, in VCS order
  pub fn remaining(mut self) -> Vec<CommitInfo> {
    self
      .order
      .iter()
      .filter_map(|sha| self.commits.remove(sha))
      .collect()
  }
}

/// The unreleased range and its boundary
#[derive(Debug, Clone)]
pub struct CommitWindow {
  pub boundary: TagInfo,
  /// Commit timestamp of the boundary tag
  pub cutoff: DateTime<Utc>,
  pub commits: UnreleasedCommits,
}

/// Newest commit first; same-commit ties by version, then name, both descending
pub fn sort_tags(tags: &mut [TagInfo]) {
  tags.sort_by(|a, b| {
    b.committed_at
      .cmp(&a.committed_at)
      .then_with(|| b.version.cmp(&a.version))
      .then_with(|| b.name.cmp(&a.name))
  });
}

/// Pick the boundary tag: the first non-prerelease version in sorted order
pub fn find_boundary(mut tags: Vec<TagInfo>) -> WardenResult<TagInfo> {
  let inspected = tags.len();
  sort_tags(&mut tags);

  for tag in tags {
    if tag.is_release() {
      return Ok(tag);
    }
    if tag.is_prerelease() {
      tracing::debug!("Tag '{}' is a pre-release, skipping", tag.name);
    } else {
      tracing::debug!("Tag '{}' is not a version, skipping", tag.name);
    }
  }

  Err(WardenError::Release(ReleaseError::NoReleaseBoundary {
    tags_inspected: inspected,
  }))
}

/// Resolve the boundary tag and the commits in `boundary..head`
pub fn resolve_window(vcs: &dyn VersionControl, head: &str) -> WardenResult<CommitWindow> {
  let boundary = find_boundary(vcs.list_tags()?)?;
  let commits = vcs.commit_range(&boundary.commit, head)?;

  tracing::info!(
    "Counting {} commits since {} tag, made {}",
    commits.len(),
    boundary.name,
    humanize_age(boundary.committed_at, Utc::now())
  );

  Ok(CommitWindow {
    cutoff: boundary.committed_at,
    boundary,
    commits: UnreleasedCommits::new(commits),
  })
}
