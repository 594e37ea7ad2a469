//! `warden labels`: reconcile the label catalog with the platform

use super::{RunOptions, catalog_source, platform};
use crate::catalog::HttpFetcher;
use crate::catalog::source::DocumentFetcher;
use crate::core::context::RepoContext;
use crate::core::error::{PolicyError, WardenError, WardenResult};
use crate::hosting::HostingPlatform;
use crate::reconcile::labels::{self, unknown_message};
use crate::ui::progress::TaskProgress;
use std::io::{self, Write};

/// Run the label reconciliation
pub fn run_labels(ctx: &RepoContext, opts: RunOptions) -> WardenResult<()> {
  let fetcher = HttpFetcher::new()?;
  let client = platform(ctx)?;
  run_labels_with(ctx, opts, &fetcher, &client, &mut io::stdout().lock())
}

/// Label reconciliation over injected capabilities; the plan goes to `out`
pub fn run_labels_with(
  ctx: &RepoContext,
  opts: RunOptions,
  fetcher: &dyn DocumentFetcher,
  platform: &dyn HostingPlatform,
  out: &mut dyn Write,
) -> WardenResult<()> {
  tracing::info!("Auditing repository labels");

  let catalog = catalog_source(ctx, fetcher).label_catalog()?;
  if catalog.is_empty() {
    tracing::warn!("Label catalog declares no labels");
  }
  tracing::debug!("{} labels declared", catalog.len());

  let live = platform.list_labels()?;
  let diff = labels::diff(&catalog, &live);
  let plan = diff.to_plan(&ctx.repo.to_string());

  for label in &diff.unknown {
    tracing::error!("{}", unknown_message(label));
  }

  if opts.json {
    writeln!(out, "{}", plan.to_json()?)?;
  } else {
    writeln!(out, "{}", plan.to_human_readable())?;
  }
  out.flush()?;

  if opts.fix && !diff.in_sync() {
    let progress = TaskProgress::for_terminal(plan.len(), "Applying label changes", !opts.json);
    let applied = labels::apply(&diff, platform, &progress)?;
    if !opts.json {
      writeln!(out, "✅ Applied {} label change(s)", applied)?;
    }
  } else if !diff.in_sync() {
    tracing::info!("Dry run, {} label change(s) not applied (use --fix)", plan.len());
  }

  if !diff.unknown.is_empty() {
    return Err(WardenError::Policy(PolicyError::ViolationsFound {
      count: diff.unknown.len(),
      subject: "unknown label",
    }));
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::hosting::RepoId;
  use crate::testing::{Call, FakePlatform, MemoryFetcher, live_label};
  use std::path::Path;

  const CATALOG: &str = "- {name: bug, color: d73a4a}\n- name: feature\n  color: 5319e7\n  description: New capability\n";

  fn context() -> RepoContext {
    RepoContext::detached(
      Path::new("/repo"),
      RepoId {
        org: "acme".to_string(),
        repo: "widgets".to_string(),
      },
    )
  }

  fn run(platform: &FakePlatform, fix: bool) -> (WardenResult<()>, String) {
    let opts = RunOptions {
      fix,
      ..Default::default()
    };
    let fetcher = MemoryFetcher::default().with("/repo/.github/labels.yml", CATALOG);
    let mut out = Vec::new();
    let result = run_labels_with(&context(), opts, &fetcher, platform, &mut out);
    (result, String::from_utf8(out).unwrap())
  }

  fn drifted() -> FakePlatform {
    FakePlatform {
      labels: vec![live_label("bug", "D73A4A", ""), live_label("stale", "ffffff", "")],
      ..Default::default()
    }
  }

  #[test]
  fn test_dry_run_reports_unknown_labels_without_mutating() {
    let platform = drifted();

    let (result, out) = run(&platform, false);

    assert!(matches!(
      result,
      Err(WardenError::Policy(PolicyError::ViolationsFound { count: 1, .. }))
    ));
    assert!(platform.calls().is_empty());
    assert!(out.contains("Create label 'feature' (#5319e7)"), "{}", out);
    assert!(out.contains("Unknown label 'stale'"), "{}", out);
  }

  #[test]
  fn test_fix_creates_missing_and_keeps_unknown() {
    let platform = drifted();

    let (result, out) = run(&platform, true);

    assert!(matches!(result, Err(WardenError::Policy(_))));
    assert_eq!(platform.calls(), vec![Call::CreateLabel("feature".to_string())]);
    assert!(out.contains("Applied 1 label change(s)"), "{}", out);
  }

  #[test]
  fn test_catalog_in_sync_succeeds() {
    let platform = FakePlatform {
      labels: vec![
        live_label("bug", "d73a4a", ""),
        live_label("feature", "5319E7", "New capability"),
      ],
      ..Default::default()
    };

    let (result, out) = run(&platform, true);

    assert!(result.is_ok());
    assert!(platform.calls().is_empty());
    assert!(out.contains("already in sync"), "{}", out);
  }
}
