//! `warden draft`: compile release notes and sync the draft release

use super::{RunOptions, catalog_source, platform};
use crate::catalog::HttpFetcher;
use crate::catalog::source::DocumentFetcher;
use crate::core::context::RepoContext;
use crate::core::error::{PolicyError, WardenError, WardenResult};
use crate::core::plan::Plan;
use crate::core::vcs::VersionControl;
use crate::hosting::{HostingPlatform, PullState};
use crate::reconcile::{Reconciliation, pulls, resolve_window};
use crate::release::{DraftAction, compile, draft};
use crate::ui::term::hyperlink;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct DraftReport<'a> {
  repository: String,
  boundary: &'a str,
  cutoff: DateTime<Utc>,
  body: &'a str,
  action: &'a DraftAction,
  plan: &'a Plan,
  reconciliation: &'a Reconciliation,
}

/// Run the draft command
pub fn run_draft(ctx: &RepoContext, opts: RunOptions) -> WardenResult<()> {
  let git = ctx.git()?;
  if opts.prune_tags {
    git.prune_tags("origin")?;
  }

  let fetcher = HttpFetcher::new()?;
  let client = platform(ctx)?;
  run_draft_with(ctx, opts, git, &fetcher, &client, &mut io::stdout().lock())
}

/// Draft flow over injected capabilities; the report goes to `out`
pub fn run_draft_with(
  ctx: &RepoContext,
  opts: RunOptions,
  vcs: &dyn VersionControl,
  fetcher: &dyn DocumentFetcher,
  platform: &dyn HostingPlatform,
  out: &mut dyn Write,
) -> WardenResult<()> {
  tracing::info!("Draft release notes");

  // History is local: a missing boundary fails before any network call
  let window = resolve_window(vcs, "HEAD")?;

  let categories = catalog_source(ctx, fetcher).release_categories()?;
  let releases = platform.list_releases()?;
  let existing = draft::find_draft(&releases);

  let boundary = window.boundary.name.clone();
  let cutoff = window.cutoff;
  let result = pulls::reconcile(
    &categories,
    window.commits,
    cutoff,
    platform.pull_requests(PullState::Closed),
  )?;
  tracing::debug!("Inspected {} pull requests", result.inspected);
  if !result.has_entries() {
    tracing::info!("No categorized changes since {}", boundary);
  }

  let body = compile(&ctx.config.release.heading, &result.sections);
  let action = draft::decide(&body, existing);
  let plan = draft::to_plan(&action, &ctx.config.release, &ctx.repo.to_string(), &body);

  if opts.json {
    let report = DraftReport {
      repository: ctx.repo.to_string(),
      boundary: &boundary,
      cutoff,
      body: &body,
      action: &action,
      plan: &plan,
      reconciliation: &result,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
  } else {
    write!(out, "{}", body)?;
    write_findings(out, platform, &result)?;
    if !opts.fix && !plan.is_empty() {
      writeln!(out, "\n{}", plan.to_human_readable())?;
    }
  }
  out.flush()?;

  draft::apply(platform, &action, &ctx.config.release, &body, opts.fix)?;

  if !result.violations.is_empty() {
    return Err(WardenError::Policy(PolicyError::ViolationsFound {
      count: result.violations.len(),
      subject: "pull request label",
    }));
  }

  Ok(())
}

/// Diagnostics after the body, never interleaved with it
fn write_findings(out: &mut dyn Write, platform: &dyn HostingPlatform, result: &Reconciliation) -> io::Result<()> {
  if !result.unmatched.is_empty() {
    writeln!(out, "\nIgnored pull requests (merge commit not among unreleased commits):")?;
    for pull in &result.unmatched {
      writeln!(
        out,
        "  {} ({})",
        hyperlink(&pull.url, &format!("PR #{}", pull.number)),
        pull.merge_commit.as_deref().unwrap_or("no merge commit")
      )?;
    }
  }

  if !result.orphans.is_empty() {
    writeln!(out, "\nCommits without a pull request ({}):", result.orphans.len())?;
    for commit in &result.orphans {
      let short = &commit.sha[..commit.sha.len().min(10)];
      writeln!(
        out,
        "  Commit '{}' not included. See {}",
        commit.summary(),
        hyperlink(&platform.commit_url(&commit.sha), short)
      )?;
    }
  }

  if !result.violations.is_empty() {
    writeln!(out, "\n⚠️  Pull requests missing a required label ({}):", result.violations.len())?;
    for violation in &result.violations {
      writeln!(out, "  {}", violation)?;
    }
  }

  Ok(())
}
