//! `warden pulls`: audit pull requests for required labels

use super::{RunOptions, catalog_source, platform};
use crate::catalog::HttpFetcher;
use crate::catalog::source::DocumentFetcher;
use crate::core::context::RepoContext;
use crate::core::error::{PolicyError, WardenError, WardenResult};
use crate::hosting::{HostingPlatform, PullState};
use crate::reconcile::audit::{Finding, audit};
use std::io::{self, Write};

/// Run the pull-request audit
pub fn run_pulls(ctx: &RepoContext, opts: RunOptions) -> WardenResult<()> {
  let fetcher = HttpFetcher::new()?;
  let client = platform(ctx)?;
  run_pulls_with(ctx, opts, &fetcher, &client, &mut io::stdout().lock())
}

/// Audit over injected capabilities; findings stream to `out` as they are found
pub fn run_pulls_with(
  ctx: &RepoContext,
  opts: RunOptions,
  fetcher: &dyn DocumentFetcher,
  platform: &dyn HostingPlatform,
  out: &mut dyn Write,
) -> WardenResult<()> {
  tracing::info!("Auditing pull requests");

  let categories = catalog_source(ctx, fetcher).release_categories()?;

  let required: Vec<&str> = categories.required().iter().map(String::as_str).collect();
  let required = required.join(", ");

  let mut collected: Vec<Finding> = Vec::new();
  let mut written = Ok(());
  let outcome = audit(
    &categories,
    platform.pull_requests(PullState::All),
    ctx.config.audit.max_violations,
    |finding| {
      if opts.json {
        collected.push(finding.clone());
      } else if written.is_ok() {
        written = writeln!(out, "{}\n\tShould have at least one label out of {}", finding, required);
      }
    },
  );
  written?;

  if opts.json {
    writeln!(out, "{}", serde_json::to_string_pretty(&collected)?)?;
  }
  out.flush()?;

  let findings = outcome?;
  if !findings.is_empty() {
    return Err(WardenError::Policy(PolicyError::ViolationsFound {
      count: findings.len(),
      subject: "pull request label",
    }));
  }

  if !opts.json {
    writeln!(out, "✅ Every open or merged pull request carries a category label")?;
  }
  Ok(())
}
