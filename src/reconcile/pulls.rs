//! PR/Commit Reconciler
//!
//! Walks merged pull requests from the most recently closed backwards, explaining
//! unreleased commits by their merge commit and routing each pull request into the
//! release-note section of its first matching category.
//!
//! The walk ends at the first merged pull request that closed at or before the cutoff:
//! everything after it in close-time order predates the boundary tag, so later pages of
//! the pull-request listing are never requested.

use super::window::UnreleasedCommits;
use crate::catalog::ReleaseCategories;
use crate::core::error::WardenResult;
use crate::core::vcs::CommitInfo;
use crate::hosting::PullRequest;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// One changelog line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
  pub number: u64,
  pub title: String,
  pub author: String,
}

impl fmt::Display for Entry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "* {} (#{}) @{}", self.title, self.number, self.author)
  }
}

/// Entries collected under one category title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
  pub title: String,
  pub entries: Vec<Entry>,
}

/// A pull request in range that carries none of the required labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
  pub number: u64,
  pub url: String,
  pub labels: BTreeSet<String>,
  pub required: BTreeSet<String>,
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "PR #{} ({}) has labels [{}], add one of the required labels [{}]",
      self.number,
      self.url,
      join(&self.labels),
      join(&self.required)
    )
  }
}

/// A pull request closed after the cutoff whose merge commit is not in the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unmatched {
  pub number: u64,
  pub url: String,
  pub merge_commit: Option<String>,
}

/// Immutable outcome of one reconciliation walk
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
  /// One per distinct category title, in declaration order
  pub sections: Vec<Section>,
  pub violations: Vec<Violation>,
  /// Commits no pull request explained, newest first
  pub orphans: Vec<CommitInfo>,
  pub unmatched: Vec<Unmatched>,
  /// Pull requests pulled from the listing, including the one that ended the walk
  pub inspected: usize,
}

impl Reconciliation {
  /// True when any section has entries
  pub fn has_entries(&self) -> bool {
    self.sections.iter().any(|s| !s.entries.is_empty())
  }
}

/// Match pull requests (most recently closed first) against the unreleased commits
pub fn reconcile<I>(
  categories: &ReleaseCategories,
  mut commits: UnreleasedCommits,
  cutoff: DateTime<Utc>,
  pulls: I,
) -> WardenResult<Reconciliation>
where
  I: IntoIterator<Item = WardenResult<PullRequest>>,
{
  let mut sections: Vec<Section> = Vec::new();
  let mut section_index: HashMap<String, usize> = HashMap::new();
  for category in categories.categories() {
    if !section_index.contains_key(&category.title) {
      section_index.insert(category.title.clone(), sections.len());
      sections.push(Section {
        title: category.title.clone(),
        entries: Vec::new(),
      });
    }
  }

  let mut violations = Vec::new();
  let mut unmatched = Vec::new();
  let mut inspected = 0;

  for pull in pulls {
    let pull = pull?;
    inspected += 1;

    if !pull.merged {
      continue;
    }
    tracing::debug!("Doing #{}: {}", pull.number, pull.title);

    if categories.is_excluded(&pull.labels) {
      tracing::debug!("Skipping #{}: excluded by label", pull.number);
      continue;
    }

    let in_window = pull
      .merge_commit_sha
      .as_deref()
      .and_then(|sha| commits.take(sha))
      .is_some();

    if in_window {
      match categories.category_for(&pull.labels) {
        Some(category) => {
          let index = section_index[&category.title];
          sections[index].entries.push(Entry {
            number: pull.number,
            title: pull.title,
            author: pull.author,
          });
        }
        None => violations.push(Violation {
          number: pull.number,
          url: pull.html_url,
          labels: pull.labels,
          required: categories.required().clone(),
        }),
      }
    } else if pull.closed_at.is_none_or(|closed| closed > cutoff) {
      tracing::warn!(
        "Ignored {} because its commit {} was not found among unreleased commits",
        pull.html_url,
        pull.merge_commit_sha.as_deref().unwrap_or("<none>")
      );
      unmatched.push(Unmatched {
        number: pull.number,
        url: pull.html_url,
        merge_commit: pull.merge_commit_sha,
      });
    } else {
      tracing::info!("Stopped processing pull requests at #{}, merged before the cutoff", pull.number);
      break;
    }
  }

  Ok(Reconciliation {
    sections,
    violations,
    orphans: commits.remaining(),
    unmatched,
    inspected,
  })
}

fn join(labels: &BTreeSet<String>) -> String {
  labels.iter().cloned().collect::<Vec<_>>().join(", ")
}
