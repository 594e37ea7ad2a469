//! Per-run context, built once in `main` and passed to every command
//!
//! ```text
//! main.rs:
//!   RepoContext::build() -> &RepoContext
//!   |
//!   v
//! commands/draft.rs, pulls.rs, labels.rs:
//!   fn run_*(ctx: &RepoContext, ...)
//! ```

use crate::core::config::{RepositoryConfig, WardenConfig};
use crate::core::error::{ConfigError, GitError, WardenError, WardenResult};
use crate::core::vcs::{SystemGit, VersionControl};
use crate::hosting::RepoId;
use crate::utils::parse_remote_url;
use std::path::{Path, PathBuf};

/// Identity overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct IdentityArgs {
  pub org: Option<String>,
  pub repo: Option<String>,
}

/// Everything a command needs to know about the repository being reconciled
pub struct RepoContext {
  /// Working tree root (or the given directory when it is not a clone)
  pub root: PathBuf,

  /// Local clone, absent when the directory is not a git repository
  git: Option<SystemGit>,

  /// Tool settings (`warden.toml`), defaults when absent
  pub config: WardenConfig,

  /// `org/repo` on the hosting platform
  pub repo: RepoId,
}

impl RepoContext {
  /// Open the clone (if any), load settings, and resolve the repository identity
  pub fn build(root: &Path, args: &IdentityArgs) -> WardenResult<Self> {
    let git = match SystemGit::open(root) {
      Ok(git) => Some(git),
      Err(WardenError::Git(GitError::RepoNotFound { .. })) => {
        tracing::debug!("{} is not a git repository", root.display());
        None
      }
      Err(e) => return Err(e),
    };

    let root = git
      .as_ref()
      .map(|g| g.work_tree().to_path_buf())
      .unwrap_or_else(|| root.to_path_buf());
    let config = WardenConfig::load(&root)?;

    let repo = resolve_identity(args, &config.repository, || match &git {
      Some(git) => git.remote_origin_url(),
      None => Err(WardenError::Git(GitError::RepoNotFound { path: root.clone() })),
    })?;
    tracing::debug!("Reconciling {}", repo);

    Ok(Self {
      root,
      git,
      config,
      repo,
    })
  }

  /// Context without a clone, on default settings
  #[cfg(test)]
  pub fn detached(root: &Path, repo: RepoId) -> Self {
    Self {
      root: root.to_path_buf(),
      git: None,
      config: WardenConfig::default(),
      repo,
    }
  }

  /// The local clone; commands reading history fail without one
  pub fn git(&self) -> WardenResult<&SystemGit> {
    self.git.as_ref().ok_or_else(|| {
      WardenError::Git(GitError::RepoNotFound {
        path: self.root.clone(),
      })
    })
  }
}

/// Resolve `org` and `repo` independently: CLI flag, then settings, then `origin`
///
/// The remote is only consulted when a part is still missing.
pub fn resolve_identity<F>(args: &IdentityArgs, settings: &RepositoryConfig, origin: F) -> WardenResult<RepoId>
where
  F: FnOnce() -> WardenResult<String>,
{
  let org = args.org.clone().or_else(|| settings.org.clone());
  let repo = args.repo.clone().or_else(|| settings.repo.clone());

  if let (Some(org), Some(repo)) = (&org, &repo) {
    return Ok(RepoId {
      org: org.clone(),
      repo: repo.clone(),
    });
  }

  let url = origin().map_err(|e| {
    WardenError::Config(ConfigError::UnknownIdentity {
      reason: format!("no --org/--repo given and the origin remote is unavailable ({})", e),
    })
  })?;
  let inferred = parse_remote_url(&url).ok_or_else(|| {
    WardenError::Config(ConfigError::UnknownIdentity {
      reason: format!("cannot parse origin remote URL '{}'", url),
    })
  })?;

  Ok(RepoId {
    org: org.unwrap_or(inferred.org),
    repo: repo.unwrap_or(inferred.repo),
  })
}
