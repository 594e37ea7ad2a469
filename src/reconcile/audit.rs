//! Pull-request label compliance audit
//!
//! Open and merged pull requests must carry at least one category label. The audit is
//! bounded: once more than `limit` findings have been reported it aborts with a policy
//! error instead of paging through the whole history.

use crate::catalog::ReleaseCategories;
use crate::core::error::{PolicyError, WardenError, WardenResult};
use crate::hosting::{PullRequest, PullStatus};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A pull request without any required label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
  pub number: u64,
  pub url: String,
  pub state: PullStatus,
  pub title: String,
  pub labels: BTreeSet<String>,
}

impl fmt::Display for Finding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
    write!(
      f,
      "PR #{} ({}): [{}] {}, found labels: {}",
      self.number,
      self.url,
      self.state,
      self.title,
      labels.join(", ")
    )
  }
}

/// Audit pull requests, handing each finding to `report` as soon as it is known
///
/// Returns every finding when the listing is exhausted within the limit.
pub fn audit<I, F>(categories: &ReleaseCategories, pulls: I, limit: usize, mut report: F) -> WardenResult<Vec<Finding>>
where
  I: IntoIterator<Item = WardenResult<PullRequest>>,
  F: FnMut(&Finding),
{
  let mut findings = Vec::new();

  for pull in pulls {
    let pull = pull?;
    if pull.state == PullStatus::Closed && !pull.merged {
      continue;
    }
    if categories.is_excluded(&pull.labels) {
      continue;
    }
    if !categories.matched(&pull.labels).is_empty() {
      continue;
    }

    let finding = Finding {
      number: pull.number,
      url: pull.html_url,
      state: pull.state,
      title: pull.title,
      labels: pull.labels,
    };
    report(&finding);
    findings.push(finding);

    if findings.len() > limit {
      return Err(WardenError::Policy(PolicyError::AuditLimitExceeded { limit }));
    }
  }

  Ok(findings)
}
