//! In-memory fakes of the version-control and hosting capabilities for unit tests

use crate::catalog::source::{DocumentFetcher, Location};
use crate::catalog::{Category, Label, ReleaseCategories};
use crate::core::error::{HostingError, WardenError, WardenResult};
use crate::core::vcs::{CommitInfo, TagInfo, VersionControl};
use crate::hosting::{HostingPlatform, LiveLabel, PullRequest, PullRequests, PullState, PullStatus, Release};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Timestamp from seconds since the epoch
pub fn ts(secs: i64) -> DateTime<Utc> {
  DateTime::from_timestamp(secs, 0).unwrap()
}

/// A merged, closed pull request
pub fn pull(number: u64, title: &str, labels: &[&str], merge_sha: &str, closed_at: DateTime<Utc>) -> PullRequest {
  PullRequest {
    number,
    title: title.to_string(),
    state: PullStatus::Closed,
    merged: true,
    merge_commit_sha: Some(merge_sha.to_string()),
    closed_at: Some(closed_at),
    updated_at: closed_at,
    labels: labels.iter().map(|l| l.to_string()).collect(),
    author: "octocat".to_string(),
    html_url: format!("https://github.com/acme/widgets/pull/{}", number),
  }
}

pub fn commit(sha: &str, message: &str, at: i64) -> CommitInfo {
  CommitInfo {
    sha: sha.to_string(),
    message: message.to_string(),
    committed_at: ts(at),
  }
}

pub fn label(name: &str, color: &str, description: &str) -> Label {
  Label {
    name: name.to_string(),
    color: color.to_string(),
    description: description.to_string(),
  }
}

pub fn live_label(name: &str, color: &str, description: &str) -> LiveLabel {
  LiveLabel {
    name: name.to_string(),
    color: color.to_string(),
    description: description.to_string(),
  }
}

/// Categories `Features [feature, enhancement]`, `Fixes [bug]`, `Docs [docs]`
pub fn categories() -> ReleaseCategories {
  let category = |title: &str, labels: &[&str]| Category {
    title: title.to_string(),
    labels: labels.iter().map(|l| l.to_string()).collect(),
    label: None,
  };
  ReleaseCategories::new(
    vec![
      category("Features", &["feature", "enhancement"]),
      category("Fixes", &["bug"]),
      category("Docs", &["docs"]),
    ],
    None,
  )
}

/// Repository history held in memory
#[derive(Default)]
pub struct FakeVcs {
  pub tags: Vec<TagInfo>,
  /// Commits returned for any range query
  pub commits: Vec<CommitInfo>,
  pub origin: Option<String>,
  pub ranges: Mutex<Vec<(String, String)>>,
}

impl FakeVcs {
  pub fn with_tag(mut self, name: &str, commit: &str, at: i64) -> Self {
    self.tags.push(TagInfo::new(name, commit, ts(at)));
    self
  }

  pub fn with_commit(mut self, sha: &str, message: &str, at: i64) -> Self {
    self.commits.push(commit(sha, message, at));
    self
  }
}

impl VersionControl for FakeVcs {
  fn list_tags(&self) -> WardenResult<Vec<TagInfo>> {
    Ok(self.tags.clone())
  }

  fn commit_range(&self, from: &str, to: &str) -> WardenResult<Vec<CommitInfo>> {
    self.ranges.lock().unwrap().push((from.to_string(), to.to_string()));
    Ok(self.commits.clone())
  }

  fn remote_origin_url(&self) -> WardenResult<String> {
    self.origin.clone().ok_or_else(|| WardenError::message("no origin"))
  }
}

/// A mutating call issued against the fake platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  CreateLabel(String),
  UpdateLabel { name: String, color: String, description: String },
  CreateDraft { name: String, tag: String, body: String },
  UpdateRelease { id: u64, body: String },
}

/// Hosting platform held in memory, recording mutating calls
#[derive(Default)]
pub struct FakePlatform {
  pub labels: Vec<LiveLabel>,
  /// Served in order for every state; callers arrange close-time order
  pub pulls: Vec<PullRequest>,
  pub releases: Vec<Release>,
  pub calls: Mutex<Vec<Call>>,
  /// Pull requests handed out so far
  pub pulls_served: AtomicUsize,
  /// Fail every mutating call with this status
  pub fail_mutations: Option<u16>,
}

impl FakePlatform {
  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  pub fn served(&self) -> usize {
    self.pulls_served.load(Ordering::SeqCst)
  }

  fn record(&self, call: Call) -> WardenResult<()> {
    if let Some(status) = self.fail_mutations {
      return Err(WardenError::Hosting(HostingError::Api {
        status,
        endpoint: "fake".to_string(),
        message: "rejected".to_string(),
      }));
    }
    self.calls.lock().unwrap().push(call);
    Ok(())
  }
}

impl HostingPlatform for FakePlatform {
  fn list_labels(&self) -> WardenResult<Vec<LiveLabel>> {
    Ok(self.labels.clone())
  }

  fn create_label(&self, label: &Label) -> WardenResult<()> {
    self.record(Call::CreateLabel(label.name.clone()))
  }

  fn update_label(&self, name: &str, color: &str, description: &str) -> WardenResult<()> {
    self.record(Call::UpdateLabel {
      name: name.to_string(),
      color: color.to_string(),
      description: description.to_string(),
    })
  }

  fn pull_requests(&self, state: PullState) -> PullRequests<'_> {
    Box::new(
      self
        .pulls
        .iter()
        .filter(move |p| match state {
          PullState::Open => p.state == PullStatus::Open,
          PullState::Closed => p.state == PullStatus::Closed,
          PullState::All => true,
        })
        .map(|p| {
          self.pulls_served.fetch_add(1, Ordering::SeqCst);
          Ok(p.clone())
        }),
    )
  }

  fn list_releases(&self) -> WardenResult<Vec<Release>> {
    Ok(self.releases.clone())
  }

  fn create_draft_release(&self, name: &str, tag: &str, body: &str) -> WardenResult<Release> {
    self.record(Call::CreateDraft {
      name: name.to_string(),
      tag: tag.to_string(),
      body: body.to_string(),
    })?;
    Ok(Release {
      id: 99,
      tag_name: tag.to_string(),
      name: Some(name.to_string()),
      body: Some(body.to_string()),
      draft: true,
      prerelease: true,
    })
  }

  fn update_release(&self, id: u64, _name: &str, body: &str) -> WardenResult<()> {
    self.record(Call::UpdateRelease {
      id,
      body: body.to_string(),
    })
  }

  fn commit_url(&self, sha: &str) -> String {
    format!("https://github.com/acme/widgets/commit/{}", sha)
  }
}

/// Serves catalog documents from memory and records every lookup
#[derive(Default)]
pub struct MemoryFetcher {
  pub documents: HashMap<String, String>,
  pub lookups: RefCell<Vec<String>>,
}

impl MemoryFetcher {
  pub fn with(mut self, location: &str, content: &str) -> Self {
    self.documents.insert(location.to_string(), content.to_string());
    self
  }
}

impl DocumentFetcher for MemoryFetcher {
  fn fetch(&self, location: &Location) -> WardenResult<Option<String>> {
    let key = location.to_string();
    self.lookups.borrow_mut().push(key.clone());
    Ok(self.documents.get(&key).cloned())
  }
}
