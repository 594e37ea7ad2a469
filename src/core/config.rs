use crate::core::error::{ConfigError, WardenError, WardenResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tool settings for warden
/// Searched in order: warden.toml, .warden.toml, .github/warden.toml, .config/warden.toml
///
/// Every section is optional; a repository without a settings file runs on defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
  #[serde(default)]
  pub repository: RepositoryConfig,
  #[serde(default)]
  pub catalog: CatalogConfig,
  #[serde(default)]
  pub github: GithubConfig,
  #[serde(default)]
  pub release: ReleaseConfig,
  #[serde(default)]
  pub audit: AuditConfig,
}

/// Repository identity overrides (CLI flags take precedence)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
  #[serde(default)]
  pub org: Option<String>,
  #[serde(default)]
  pub repo: Option<String>,
}

/// Where the label catalog and release categories come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
  /// Label catalog document, relative to the repository root
  #[serde(default = "default_labels_path")]
  pub labels: PathBuf,

  /// Release-drafter document holding the categories
  #[serde(default = "default_categories_path")]
  pub categories: PathBuf,

  /// Consult shared `meta` repositories when a local file is missing
  #[serde(default = "default_true")]
  pub search_remote: bool,

  /// Name of the organization-wide shared configuration repository
  #[serde(default = "default_shared_repo")]
  pub shared_repo: String,

  /// Branch of the shared configuration repository
  #[serde(default = "default_shared_branch")]
  pub shared_branch: String,

  /// Organizations consulted after the project's own organization
  #[serde(default)]
  pub fallback_orgs: Vec<String>,
}

fn default_labels_path() -> PathBuf {
  PathBuf::from(".github/labels.yml")
}

fn default_categories_path() -> PathBuf {
  PathBuf::from(".github/release-drafter.yml")
}

fn default_true() -> bool {
  true
}

fn default_shared_repo() -> String {
  "meta".to_string()
}

fn default_shared_branch() -> String {
  "master".to_string()
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      labels: default_labels_path(),
      categories: default_categories_path(),
      search_remote: true,
      shared_repo: default_shared_repo(),
      shared_branch: default_shared_branch(),
      fallback_orgs: Vec::new(),
    }
  }
}

/// Hosting platform endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
  #[serde(default = "default_api_url")]
  pub api_url: String,
  #[serde(default = "default_web_url")]
  pub web_url: String,
  #[serde(default = "default_raw_url")]
  pub raw_url: String,
  /// Environment variable holding the API token (GH_TOKEN is the fallback)
  #[serde(default = "default_token_env")]
  pub token_env: String,
}

fn default_api_url() -> String {
  "https://api.github.com".to_string()
}

fn default_web_url() -> String {
  "https://github.com".to_string()
}

fn default_raw_url() -> String {
  "https://raw.githubusercontent.com".to_string()
}

fn default_token_env() -> String {
  "GITHUB_TOKEN".to_string()
}

impl Default for GithubConfig {
  fn default() -> Self {
    Self {
      api_url: default_api_url(),
      web_url: default_web_url(),
      raw_url: default_raw_url(),
      token_env: default_token_env(),
    }
  }
}

impl GithubConfig {
  /// Read the API token from the configured variable, then GH_TOKEN
  pub fn token(&self) -> Option<String> {
    [self.token_env.as_str(), "GH_TOKEN"]
      .into_iter()
      .filter_map(|var| std::env::var(var).ok())
      .find(|value| !value.trim().is_empty())
  }
}

/// How the draft release is rendered and named
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
  /// First line of every compiled body
  #[serde(default = "default_heading")]
  pub heading: String,
  #[serde(default = "default_draft_name")]
  pub draft_name: String,
  /// Tag name given to a newly created draft (the platform rejects empty tags)
  #[serde(default = "default_draft_tag")]
  pub draft_tag: String,
}

fn default_heading() -> String {
  "## Changes".to_string()
}

fn default_draft_name() -> String {
  "Draft".to_string()
}

fn default_draft_tag() -> String {
  "next".to_string()
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      heading: default_heading(),
      draft_name: default_draft_name(),
      draft_tag: default_draft_tag(),
    }
  }
}

/// Pull-request audit limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
  /// Abort once more than this many non-compliant pull requests were reported
  #[serde(default = "default_max_violations")]
  pub max_violations: usize,
}

fn default_max_violations() -> usize {
  20
}

impl Default for AuditConfig {
  fn default() -> Self {
    Self {
      max_violations: default_max_violations(),
    }
  }
}

impl WardenConfig {
  /// Find settings file in search order: warden.toml, .warden.toml, .github/warden.toml, .config/warden.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("warden.toml"),
      path.join(".warden.toml"),
      path.join(".github").join("warden.toml"),
      path.join(".config").join("warden.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load settings, falling back to defaults when no file exists
  pub fn load(path: &Path) -> WardenResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!("No warden.toml under {}, using defaults", path.display());
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read settings from {}", config_path.display()))?;
    let config = Self::parse(&content).map_err(|e| match e {
      WardenError::Config(ConfigError::Malformed { reason, .. }) => WardenError::Config(ConfigError::Malformed {
        location: Some(config_path.display().to_string()),
        reason,
      }),
      other => other,
    })?;

    tracing::info!("Loaded settings from {}", config_path.display());
    Ok(config)
  }

  /// Parse and validate a settings document
  pub fn parse(content: &str) -> WardenResult<Self> {
    let config: WardenConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate settings values
  pub fn validate(&self) -> WardenResult<()> {
    for (field, url) in [
      ("github.api_url", &self.github.api_url),
      ("github.web_url", &self.github.web_url),
      ("github.raw_url", &self.github.raw_url),
    ] {
      if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(WardenError::Config(ConfigError::Malformed {
          location: None,
          reason: format!("{} must be an http(s) URL, got '{}'", field, url),
        }));
      }
    }

    if self.audit.max_violations == 0 {
      return Err(WardenError::Config(ConfigError::Malformed {
        location: None,
        reason: "audit.max_violations must be at least 1".to_string(),
      }));
    }

    if self.release.draft_tag.trim().is_empty() {
      return Err(WardenError::Config(ConfigError::Malformed {
        location: None,
        reason: "release.draft_tag must not be empty".to_string(),
      }));
    }

    Ok(())
  }
}
