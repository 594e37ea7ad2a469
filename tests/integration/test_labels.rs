//! Catalog loading for the labels and pulls commands

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_labels_without_catalog_fails() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file("warden.toml", LOCAL_ONLY)?;

  let run = run_warden(&repo.path, &["labels", "--org", "acme", "--repo", "widgets"])?;

  assert_eq!(run.code, Some(1), "stderr: {}", run.stderr);
  assert!(run.stderr.contains("Unable to load .github/labels.yml"), "{}", run.stderr);
  Ok(())
}

#[test]
fn test_duplicate_catalog_entry_fails() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file("warden.toml", LOCAL_ONLY)?;
  repo.write_file(
    ".github/labels.yml",
    "- name: bug\n  color: d73a4a\n- name: bug\n  color: ff0000\n",
  )?;

  let run = run_warden(&repo.path, &["labels", "--org", "acme", "--repo", "widgets"])?;

  assert_eq!(run.code, Some(1), "stderr: {}", run.stderr);
  assert!(run.stderr.contains("declared more than once"), "{}", run.stderr);
  Ok(())
}

#[test]
fn test_pulls_without_categories_fails() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file("warden.toml", LOCAL_ONLY)?;

  let run = run_warden(&repo.path, &["pulls", "--org", "acme", "--repo", "widgets"])?;

  assert_eq!(run.code, Some(1), "stderr: {}", run.stderr);
  assert!(run.stderr.contains("release-drafter.yml"), "{}", run.stderr);
  Ok(())
}
