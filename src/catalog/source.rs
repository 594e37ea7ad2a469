//! First-match-wins search for catalog documents
//!
//! A document is looked up in the repository first, then in the organization's shared
//! configuration repository, then in each configured fallback organization. The first
//! location that yields content wins; a location that simply does not have the file is
//! skipped, while malformed content is fatal.

use super::{LabelCatalog, ReleaseCategories};
use crate::core::config::WardenConfig;
use crate::core::error::{ConfigError, HostingError, WardenError, WardenResult};
use reqwest::StatusCode;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One place a document may live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
  Local(PathBuf),
  Remote(String),
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Location::Local(path) => write!(f, "{}", path.display()),
      Location::Remote(url) => write!(f, "{}", url),
    }
  }
}

/// Reads a document from a location; `Ok(None)` means "not there, try the next one"
pub trait DocumentFetcher {
  fn fetch(&self, location: &Location) -> WardenResult<Option<String>>;
}

/// Fetches local files from disk and remote documents over HTTP
pub struct HttpFetcher {
  client: reqwest::blocking::Client,
}

impl HttpFetcher {
  pub fn new() -> WardenResult<Self> {
    let client = reqwest::blocking::Client::builder()
      .user_agent(concat!("warden/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client })
  }
}

impl DocumentFetcher for HttpFetcher {
  fn fetch(&self, location: &Location) -> WardenResult<Option<String>> {
    match location {
      Location::Local(path) => match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
          tracing::info!("Config file {} not found", path.display());
          Ok(None)
        }
        Err(e) => Err(WardenError::Io(e).context(format!("Failed to read {}", path.display()))),
      },
      Location::Remote(url) => {
        let response = self.client.get(url).send()?;
        if !found(response.status(), url)? {
          return Ok(None);
        }
        Ok(Some(response.text()?))
      }
    }
  }
}

/// Whether a response carries the document; only a 404 means "try the next location"
fn found(status: StatusCode, url: &str) -> WardenResult<bool> {
  if status.is_success() {
    return Ok(true);
  }
  if status == StatusCode::NOT_FOUND {
    tracing::info!("Config file {} not found (HTTP 404)", url);
    return Ok(false);
  }
  Err(WardenError::Hosting(HostingError::Api {
    status: status.as_u16(),
    endpoint: url.to_string(),
    message: status.canonical_reason().unwrap_or("request failed").to_string(),
  }))
}

/// Ordered candidate locations for the catalog documents
pub struct ConfigSource<'a> {
  root: PathBuf,
  org: String,
  config: &'a WardenConfig,
  fetcher: &'a dyn DocumentFetcher,
}

impl<'a> ConfigSource<'a> {
  pub fn new(root: &Path, org: &str, config: &'a WardenConfig, fetcher: &'a dyn DocumentFetcher) -> Self {
    Self {
      root: root.to_path_buf(),
      org: org.to_string(),
      config,
      fetcher,
    }
  }

  /// Candidate locations for a document, duplicates removed, order preserved
  pub fn candidates(&self, document: &Path) -> Vec<Location> {
    let mut locations = vec![Location::Local(self.root.join(document))];

    if self.config.catalog.search_remote {
      let relative = document.to_string_lossy().replace('\\', "/");
      let orgs = std::iter::once(&self.org).chain(self.config.catalog.fallback_orgs.iter());
      for org in orgs {
        locations.push(Location::Remote(format!(
          "{}/{}/{}/{}/{}",
          self.config.github.raw_url.trim_end_matches('/'),
          org,
          self.config.catalog.shared_repo,
          self.config.catalog.shared_branch,
          relative
        )));
      }
    }

    let mut unique = Vec::with_capacity(locations.len());
    for location in locations {
      if !unique.contains(&location) {
        unique.push(location);
      }
    }
    unique
  }

  /// Load the first available copy of a document
  pub fn load(&self, document: &Path) -> WardenResult<(Location, String)> {
    let candidates = self.candidates(document);

    for location in &candidates {
      if let Some(content) = self.fetcher.fetch(location)? {
        tracing::info!("Loaded {}", location);
        return Ok((location.clone(), content));
      }
    }

    Err(WardenError::Config(ConfigError::NotFound {
      document: document.display().to_string(),
      tried: candidates.iter().map(ToString::to_string).collect(),
    }))
  }

  /// Load and parse the label catalog
  pub fn label_catalog(&self) -> WardenResult<LabelCatalog> {
    let (location, content) = self.load(&self.config.catalog.labels)?;
    LabelCatalog::from_yaml(&content).map_err(|e| at_location(e, &location))
  }

  /// Load and parse the release categories
  pub fn release_categories(&self) -> WardenResult<ReleaseCategories> {
    let (location, content) = self.load(&self.config.catalog.categories)?;
    ReleaseCategories::from_yaml(&content).map_err(|e| at_location(e, &location))
  }
}

fn at_location(err: WardenError, location: &Location) -> WardenError {
  match err {
    WardenError::Config(ConfigError::Malformed { reason, .. }) => WardenError::Config(ConfigError::Malformed {
      location: Some(location.to_string()),
      reason,
    }),
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::MemoryFetcher;

  fn config(fallback: &[&str]) -> WardenConfig {
    let mut config = WardenConfig::default();
    config.catalog.fallback_orgs = fallback.iter().map(|s| s.to_string()).collect();
    config
  }

  #[test]
  fn test_candidates_order_and_dedup() {
    let config = config(&["shared", "acme"]);
    let fetcher = MemoryFetcher::default();
    let source = ConfigSource::new(Path::new("/repo"), "acme", &config, &fetcher);

    let candidates: Vec<String> = source
      .candidates(Path::new(".github/labels.yml"))
      .iter()
      .map(ToString::to_string)
      .collect();

    assert_eq!(
      candidates,
      vec![
        "/repo/.github/labels.yml".to_string(),
        "https://raw.githubusercontent.com/acme/meta/master/.github/labels.yml".to_string(),
        "https://raw.githubusercontent.com/shared/meta/master/.github/labels.yml".to_string(),
      ]
    );
  }

  #[test]
  fn test_local_copy_wins() {
    let config = config(&[]);
    let fetcher = MemoryFetcher::default()
      .with("/repo/.github/labels.yml", "- {name: bug, color: d73a4a}\n")
      .with(
        "https://raw.githubusercontent.com/acme/meta/master/.github/labels.yml",
        "- {name: other, color: ffffff}\n",
      );
    let source = ConfigSource::new(Path::new("/repo"), "acme", &config, &fetcher);

    let catalog = source.label_catalog().unwrap();
    assert!(catalog.get("bug").is_some());
    assert!(catalog.get("other").is_none());
    assert_eq!(fetcher.lookups.borrow().len(), 1);
  }

  #[test]
  fn test_falls_back_to_shared_repository() {
    let config = config(&["shared"]);
    let fetcher = MemoryFetcher::default().with(
      "https://raw.githubusercontent.com/shared/meta/master/.github/release-drafter.yml",
      "categories:\n  - {title: Fixes, labels: [bug]}\n",
    );
    let source = ConfigSource::new(Path::new("/repo"), "acme", &config, &fetcher);

    let categories = source.release_categories().unwrap();
    assert_eq!(categories.categories()[0].title, "Fixes");
    assert_eq!(fetcher.lookups.borrow().len(), 3);
  }

  #[test]
  fn test_remote_search_can_be_disabled() {
    let mut config = config(&["shared"]);
    config.catalog.search_remote = false;
    let fetcher = MemoryFetcher::default();
    let source = ConfigSource::new(Path::new("/repo"), "acme", &config, &fetcher);

    let err = source.label_catalog().unwrap_err();
    assert!(matches!(err, WardenError::Config(ConfigError::NotFound { ref tried, .. }) if tried.len() == 1));
  }

  #[test]
  fn test_malformed_document_names_its_location() {
    let config = config(&[]);
    let fetcher = MemoryFetcher::default().with("/repo/.github/labels.yml", "- name: [unterminated\n");
    let source = ConfigSource::new(Path::new("/repo"), "acme", &config, &fetcher);

    let err = source.label_catalog().unwrap_err();
    assert!(err.to_string().contains("/repo/.github/labels.yml"), "{}", err);
  }

  #[test]
  fn test_http_fetcher_reads_local_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("labels.yml");
    std::fs::write(&path, "[]").unwrap();

    let fetcher = HttpFetcher::new().unwrap();
    assert_eq!(fetcher.fetch(&Location::Local(path)).unwrap().as_deref(), Some("[]"));
    assert!(fetcher.fetch(&Location::Local(dir.path().join("missing.yml"))).unwrap().is_none());
  }

  #[test]
  fn test_only_not_found_moves_on() {
    let url = "https://raw.githubusercontent.com/acme/meta/master/.github/labels.yml";
    assert!(found(StatusCode::OK, url).unwrap());
    assert!(!found(StatusCode::NOT_FOUND, url).unwrap());

    for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN, StatusCode::BAD_GATEWAY] {
      let err = found(status, url).unwrap_err();
      assert!(
        matches!(err, WardenError::Hosting(HostingError::Api { status: code, .. }) if code == status.as_u16()),
        "{}",
        err
      );
      assert_eq!(err.exit_code(), crate::core::error::ExitCode::System);
    }
  }
}
