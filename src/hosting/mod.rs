//! Hosting platform capability
//!
//! The engine talks to the platform only through [`HostingPlatform`]. The trait is bound
//! to a single repository at construction time, so calls never carry the identity.
//!
//! Pull requests are streamed rather than listed: the release-draft walk stops at the
//! first pull request merged before the release boundary, and pages past that point are
//! never requested.

pub mod github;

use crate::catalog::Label;
use crate::core::error::WardenResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};
use std::fmt;

pub use github::GitHubClient;

/// `owner/name` of the repository being reconciled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoId {
  pub org: String,
  pub repo: String,
}

impl fmt::Display for RepoId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.org, self.repo)
  }
}

/// A label as it currently exists on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveLabel {
  pub name: String,
  pub color: String,
  pub description: String,
}

/// Which pull requests to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullState {
  Open,
  Closed,
  All,
}

impl PullState {
  pub fn as_str(self) -> &'static str {
    match self {
      PullState::Open => "open",
      PullState::Closed => "closed",
      PullState::All => "all",
    }
  }
}

/// Lifecycle state of a single pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullStatus {
  Open,
  Closed,
}

impl fmt::Display for PullStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PullStatus::Open => write!(f, "open"),
      PullStatus::Closed => write!(f, "closed"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  pub state: PullStatus,
  pub merged: bool,
  pub merge_commit_sha: Option<String>,
  pub closed_at: Option<DateTime<Utc>>,
  pub updated_at: DateTime<Utc>,
  pub labels: BTreeSet<String>,
  pub author: String,
  pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
  pub id: u64,
  pub tag_name: String,
  pub name: Option<String>,
  pub body: Option<String>,
  pub draft: bool,
  pub prerelease: bool,
}

/// Lazily fetched pull requests; errors end the stream for the caller
pub type PullRequests<'a> = Box<dyn Iterator<Item = WardenResult<PullRequest>> + 'a>;

/// Operations warden needs from the hosting platform
pub trait HostingPlatform: Send + Sync {
  fn list_labels(&self) -> WardenResult<Vec<LiveLabel>>;

  fn create_label(&self, label: &Label) -> WardenResult<()>;

  /// Overwrite color and description of an existing label
  fn update_label(&self, name: &str, color: &str, description: &str) -> WardenResult<()>;

  /// Pull requests in `state`; for [`PullState::Closed`] the most recently closed come first
  fn pull_requests(&self, state: PullState) -> PullRequests<'_>;

  fn list_releases(&self) -> WardenResult<Vec<Release>>;

  fn create_draft_release(&self, name: &str, tag: &str, body: &str) -> WardenResult<Release>;

  fn update_release(&self, id: u64, name: &str, body: &str) -> WardenResult<()>;

  /// Web link to a commit (no request is made)
  fn commit_url(&self, sha: &str) -> String;
}

/// A buffered pull request ordered by close time, then number
struct Pending {
  key: DateTime<Utc>,
  pull: PullRequest,
}

impl PartialEq for Pending {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Pending {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .key
      .cmp(&other.key)
      .then_with(|| self.pull.number.cmp(&other.pull.number))
  }
}

/// Re-orders a stream sorted by `updated_at` (descending) into close-time order
///
/// A pull request is never updated before it closes, so once the stream has reached
/// `updated_at = w`, every buffered pull request that closed at or after `w` can be
/// released: nothing still to come closed later than `w`.
pub struct ByCloseTime<I> {
  inner: I,
  pending: BinaryHeap<Pending>,
  watermark: Option<DateTime<Utc>>,
  done: bool,
}

impl<I> ByCloseTime<I>
where
  I: Iterator<Item = WardenResult<PullRequest>>,
{
  pub fn new(inner: I) -> Self {
    Self {
      inner,
      pending: BinaryHeap::new(),
      watermark: None,
      done: false,
    }
  }
}

impl<I> Iterator for ByCloseTime<I>
where
  I: Iterator<Item = WardenResult<PullRequest>>,
{
  type Item = WardenResult<PullRequest>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if let Some(top) = self.pending.peek() {
        let releasable = self.done || self.watermark.is_some_and(|w| top.key >= w);
        if releasable {
          return self.pending.pop().map(|p| Ok(p.pull));
        }
      } else if self.done {
        return None;
      }

      match self.inner.next() {
        Some(Ok(pull)) => {
          self.watermark = Some(match self.watermark {
            Some(w) => w.min(pull.updated_at),
            None => pull.updated_at,
          });
          let key = pull.closed_at.unwrap_or(pull.updated_at);
          self.pending.push(Pending { key, pull });
        }
        Some(Err(e)) => return Some(Err(e)),
        None => self.done = true,
      }
    }
  }
}
