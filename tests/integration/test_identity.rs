//! Repository identity resolution

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_missing_origin_without_flags_fails() -> Result<()> {
  let repo = TestRepo::new()?;

  let run = run_warden(&repo.path, &["draft"])?;

  assert_eq!(run.code, Some(1), "stderr: {}", run.stderr);
  assert!(run.stderr.contains("Could not determine repository"), "{}", run.stderr);
  Ok(())
}

#[test]
fn test_identity_inferred_from_origin() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.set_origin("git@github.com:acme/widgets.git")?;

  let run = run_warden(&repo.path, &["draft", "--debug"])?;

  assert!(run.stderr.contains("Reconciling acme/widgets"), "{}", run.stderr);
  assert_eq!(run.code, Some(1), "untagged history still has no boundary");
  Ok(())
}

#[test]
fn test_flags_and_settings_override_origin_per_field() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.set_origin("https://github.com/acme/widgets.git")?;
  repo.write_file("warden.toml", "[repository]\norg = \"umbrella\"\n")?;

  let run = run_warden(&repo.path, &["draft", "--debug", "--repo", "gadgets"])?;

  assert!(run.stderr.contains("Reconciling umbrella/gadgets"), "{}", run.stderr);
  Ok(())
}

#[test]
fn test_malformed_settings_fail() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file("warden.toml", "[audit\n")?;

  let run = run_warden(&repo.path, &["draft", "--org", "acme", "--repo", "widgets"])?;

  assert_eq!(run.code, Some(1), "stderr: {}", run.stderr);
  assert!(run.stderr.contains("warden.toml"), "{}", run.stderr);
  Ok(())
}
