//! CLI commands for warden
//!
//! - **draft**: Compile the release notes draft and keep the draft release in sync
//! - **pulls**: Audit pull requests for required category labels
//! - **labels**: Reconcile the label catalog with the live labels
//!
//! All commands accept `&RepoContext` and share the `fix`/dry-run switch. Reports go to
//! stdout; logs go to stderr.
//!
//! Each `run_*` builds the real capabilities (local clone, document fetcher, GitHub
//! client) and hands them to a `run_*_with` core, which only sees the traits and writes
//! its report to the given writer.

pub mod draft;
pub mod labels;
pub mod pulls;

pub use draft::run_draft;
pub use labels::run_labels;
pub use pulls::run_pulls;

use crate::catalog::ConfigSource;
use crate::catalog::source::DocumentFetcher;
use crate::core::context::RepoContext;
use crate::core::error::WardenResult;
use crate::hosting::GitHubClient;

/// Switches shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
  /// Mutate the hosting platform (default: dry-run)
  pub fix: bool,
  /// Machine-readable output on stdout
  pub json: bool,
  /// Mirror remote tags before resolving the release window
  pub prune_tags: bool,
}

fn catalog_source<'a>(ctx: &'a RepoContext, fetcher: &'a dyn DocumentFetcher) -> ConfigSource<'a> {
  ConfigSource::new(&ctx.root, &ctx.repo.org, &ctx.config, fetcher)
}

fn platform(ctx: &RepoContext) -> WardenResult<GitHubClient> {
  GitHubClient::new(&ctx.config.github, ctx.repo.clone())
}
