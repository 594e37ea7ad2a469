//! Argument parsing

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_help_lists_commands() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  let run = run_warden(dir.path(), &["--help"])?;

  assert_eq!(run.code, Some(0));
  for command in ["draft", "pulls", "labels"] {
    assert!(run.stdout.contains(command), "missing {}: {}", command, run.stdout);
  }
  assert!(run.stdout.contains("--fix"));
  Ok(())
}

#[test]
fn test_unknown_subcommand_is_rejected() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  let run = run_warden(dir.path(), &["publish"])?;

  assert_eq!(run.code, Some(2));
  Ok(())
}
