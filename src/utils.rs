//! Repository identity from remote URLs

use crate::hosting::RepoId;
use regex::Regex;
use std::sync::LazyLock;

/// `https://host/org/repo`, `ssh://git@host:22/org/repo`, `git://host/org/repo`
static URL_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?:https?|ssh|git)://(?:[^@/]+@)?[^/]+/(?P<org>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$")
    .unwrap_or_else(|e| panic!("invalid remote pattern: {e}"))
});

/// scp-like `git@host:org/repo`
static SCP_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?:[^@/]+@)?[^:/]+:(?P<org>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$")
    .unwrap_or_else(|e| panic!("invalid remote pattern: {e}"))
});

/// Extract `org/repo` from a git remote URL
///
/// Returns `None` for local paths and URLs with a different shape.
pub fn parse_remote_url(url: &str) -> Option<RepoId> {
  let url = url.trim();
  let caps = URL_REMOTE.captures(url).or_else(|| {
    if url.contains("://") {
      None
    } else {
      SCP_REMOTE.captures(url)
    }
  })?;

  Some(RepoId {
    org: caps["org"].to_string(),
    repo: caps["repo"].to_string(),
  })
}
