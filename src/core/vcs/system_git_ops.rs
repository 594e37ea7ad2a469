//! Additional operations for SystemGit (tags, commit ranges, remotes)

use super::system_git::SystemGit;
use super::{CommitInfo, TagInfo};
use crate::core::error::{WardenError, WardenResult};
use chrono::{DateTime, Utc};

/// Field separator inside a `git log` record
const FIELD_SEP: char = '\u{1f}';
/// Record separator between `git log` entries
const RECORD_SEP: char = '\u{1e}';

impl SystemGit {
  /// List tags with the commit they point to
  ///
  /// Uses a single `git for-each-ref`; annotated tags are peeled via the `*` fields.
  pub fn tags(&self) -> WardenResult<Vec<TagInfo>> {
    let format = [
      "%(refname:strip=2)",
      "%(objecttype)",
      "%(objectname)",
      "%(committerdate:unix)",
      "%(*objecttype)",
      "%(*objectname)",
      "%(*committerdate:unix)",
    ]
    .join("%09");

    let output = self.run(
      &["for-each-ref", &format!("--format={}", format), "refs/tags"],
      "Failed to list tags",
    )?;

    Ok(parse_tag_listing(&String::from_utf8_lossy(&output.stdout)))
  }

  /// Commits in `from..to`, newest first
  pub fn commits_between(&self, from: &str, to: &str) -> WardenResult<Vec<CommitInfo>> {
    let range = format!("{}..{}", from, to);
    let output = self.run(
      &["log", "--format=%H%x1f%ct%x1f%B%x1e", &range, "--"],
      "Failed to walk commit range",
    )?;

    parse_log_output(&String::from_utf8_lossy(&output.stdout))
  }

  /// List all remotes
  pub fn list_remotes(&self) -> WardenResult<Vec<(String, String)>> {
    let output = self
      .git_cmd()
      .args(["remote", "-v"])
      .output()
      .map_err(WardenError::from)?;

    if !output.status.success() {
      return Ok(vec![]);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut remotes = Vec::new();

    for line in stdout.lines() {
      // Format: "origin  git@github.com:user/repo.git (fetch)"
      let parts: Vec<&str> = line.split_whitespace().collect();
      if parts.len() >= 2 && line.contains("(fetch)") {
        remotes.push((parts[0].to_string(), parts[1].to_string()));
      }
    }

    Ok(remotes)
  }

  /// Get remote URL
  pub fn get_remote_url(&self, name: &str) -> WardenResult<Option<String>> {
    let remotes = self.list_remotes()?;
    Ok(remotes.iter().find(|(n, _)| n == name).map(|(_, url)| url.clone()))
  }

  /// Mirror the remote's tags locally, dropping tags the remote no longer has
  pub fn prune_tags(&self, remote: &str) -> WardenResult<()> {
    tracing::info!("Pruning local tags against '{}'", remote);

    let mut cmd = self.git_cmd();
    // Fetching over SSH needs the agent socket the isolated environment drops
    if let Ok(sock) = std::env::var("SSH_AUTH_SOCK") {
      cmd.env("SSH_AUTH_SOCK", sock);
    }
    let output = cmd
      .args(["fetch", "--prune", "--quiet", remote, "+refs/tags/*:refs/tags/*"])
      .output()
      .map_err(WardenError::from)?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(WardenError::Git(crate::core::error::GitError::CommandFailed {
        command: format!("git fetch --prune {} +refs/tags/*:refs/tags/*", remote),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(())
  }
}

/// Parse `for-each-ref` output into tags, skipping tags that do not reach a commit
fn parse_tag_listing(stdout: &str) -> Vec<TagInfo> {
  let mut tags = Vec::new();

  for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 7 {
      tracing::debug!("Skipping unparseable tag line: {:?}", line);
      continue;
    }
    let name = fields[0];

    // Annotated tags carry the commit in the peeled (`*`) fields
    let (sha, timestamp) = if fields[4] == "commit" {
      (fields[5], fields[6])
    } else if fields[1] == "commit" {
      (fields[2], fields[3])
    } else {
      tracing::debug!("Tag '{}' does not point at a commit, ignoring", name);
      continue;
    };

    match parse_timestamp(timestamp) {
      Some(committed_at) => tags.push(TagInfo::new(name, sha, committed_at)),
      None => tracing::debug!("Tag '{}' has no usable commit date, ignoring", name),
    }
  }

  tags
}

/// Parse `git log --format=%H%x1f%ct%x1f%B%x1e` output
fn parse_log_output(stdout: &str) -> WardenResult<Vec<CommitInfo>> {
  let mut commits = Vec::new();

  for record in stdout.split(RECORD_SEP) {
    let record = record.trim_start_matches('\n');
    if record.trim().is_empty() {
      continue;
    }

    let mut fields = record.splitn(3, FIELD_SEP);
    let sha = fields
      .next()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .ok_or_else(|| WardenError::message("Missing commit SHA in git log output"))?;
    let committed_at = fields
      .next()
      .and_then(parse_timestamp)
      .ok_or_else(|| WardenError::message(format!("Missing/invalid commit timestamp for {}", sha)))?;
    let message = fields.next().unwrap_or("").trim().to_string();

    commits.push(CommitInfo {
      sha: sha.to_string(),
      message,
      committed_at,
    });
  }

  Ok(commits)
}

/// Parse git timestamp (seconds since epoch)
fn parse_timestamp(ts_str: &str) -> Option<DateTime<Utc>> {
  ts_str
    .split_whitespace()
    .next()
    .and_then(|s| s.parse::<i64>().ok())
    .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_timestamp() {
    assert_eq!(parse_timestamp("1699999999 -0800").unwrap().timestamp(), 1699999999);
    assert!(parse_timestamp("invalid").is_none());
    assert!(parse_timestamp("").is_none());
  }

  #[test]
  fn test_parse_tag_listing_peels_annotated_tags() {
    let stdout = "v1.0.0\tcommit\taaaa\t100\t\t\t\n\
                  v1.1.0\ttag\ttttt\t\tcommit\tbbbb\t200\n\
                  tree-tag\ttree\tcccc\t\t\t\t\n";
    let tags = parse_tag_listing(stdout);
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].name, "v1.0.0");
    assert_eq!(tags[0].commit, "aaaa");
    assert_eq!(tags[0].committed_at.timestamp(), 100);
    assert_eq!(tags[1].name, "v1.1.0");
    assert_eq!(tags[1].commit, "bbbb");
    assert_eq!(tags[1].committed_at.timestamp(), 200);
  }

  #[test]
  fn test_parse_log_output_multiline_messages() {
    let stdout = "aaaa\u{1f}200\u{1f}fix: second\n\nlonger body\n\u{1e}\nbbbb\u{1f}100\u{1f}first\n\u{1e}\n";
    let commits = parse_log_output(stdout).unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].sha, "aaaa");
    assert_eq!(commits[0].message, "fix: second\n\nlonger body");
    assert_eq!(commits[0].summary(), "fix: second");
    assert_eq!(commits[1].sha, "bbbb");
    assert_eq!(commits[1].committed_at.timestamp(), 100);
  }

  #[test]
  fn test_parse_log_output_empty_range() {
    assert!(parse_log_output("").unwrap().is_empty());
    assert!(parse_log_output("\n").unwrap().is_empty());
  }

  #[test]
  fn test_parse_log_output_rejects_bad_timestamp() {
    assert!(parse_log_output("aaaa\u{1f}soon\u{1f}msg\u{1e}").is_err());
  }
}
