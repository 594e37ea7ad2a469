//! Draft command failures that happen before any network call

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_prerelease_only_history_has_no_boundary() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file("warden.toml", LOCAL_ONLY)?;
  repo.tag("v1.0.0-rc.1")?;
  repo.commit("Second change")?;
  repo.tag("v1.0.0b2")?;
  repo.tag("nightly")?;

  let run = run_warden(&repo.path, &["draft", "--org", "acme", "--repo", "widgets"])?;

  assert_eq!(run.code, Some(1), "stderr: {}", run.stderr);
  assert!(run.stderr.contains("No release boundary"), "{}", run.stderr);
  assert!(run.stderr.contains("3 tag(s)"), "{}", run.stderr);
  assert!(run.stdout.is_empty(), "nothing is drafted: {}", run.stdout);
  Ok(())
}

#[test]
fn test_untagged_repository_has_no_boundary() -> Result<()> {
  let repo = TestRepo::new()?;

  // Draft is the default command
  let run = run_warden(&repo.path, &["--org", "acme", "--repo", "widgets"])?;

  assert_eq!(run.code, Some(1), "stderr: {}", run.stderr);
  assert!(run.stderr.contains("No release boundary"), "{}", run.stderr);
  Ok(())
}

#[test]
fn test_draft_outside_git_repository_fails() -> Result<()> {
  let dir = tempfile::TempDir::new()?;

  let run = run_warden(dir.path(), &["draft", "--org", "acme", "--repo", "widgets"])?;

  assert_eq!(run.code, Some(2), "stderr: {}", run.stderr);
  assert!(run.stderr.contains("Git repository not found"), "{}", run.stderr);
  Ok(())
}

#[test]
fn test_window_is_logged_before_catalog_lookup() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file("warden.toml", LOCAL_ONLY)?;
  repo.tag("v1.2.0")?;
  repo.commit("Add widget")?;
  repo.commit("Fix widget")?;

  // No local release-drafter.yml and remote search disabled: fails at catalog load
  let run = run_warden(&repo.path, &["draft", "--org", "acme", "--repo", "widgets"])?;

  assert_eq!(run.code, Some(1), "stderr: {}", run.stderr);
  assert!(run.stderr.contains("Counting 2 commits since v1.2.0 tag"), "{}", run.stderr);
  assert!(run.stderr.contains("Unable to load .github/release-drafter.yml"), "{}", run.stderr);
  Ok(())
}
