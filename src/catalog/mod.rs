//! Declared label catalog and release-note categories
//!
//! Both documents are plain YAML shared with other tooling:
//!
//! ```yaml
//! # .github/labels.yml
//! - name: bug
//!   color: d73a4a
//!   description: Something isn't working
//! ```
//!
//! ```yaml
//! # .github/release-drafter.yml
//! categories:
//!   - title: Fixes
//!     labels: [bug]
//! exclude-labels: [skip-changelog]
//! ```
//!
//! Loading is strict: label and category entries reject unknown keys, so a typo fails the
//! run at load time rather than silently dropping a label.

pub mod source;

use crate::core::error::{ConfigError, WardenError, WardenResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use source::{ConfigSource, HttpFetcher};

/// Label excluding a pull request from release notes when none is configured
pub const DEFAULT_EXCLUDE_LABEL: &str = "skip-changelog";

/// A label as declared in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Label {
  pub name: String,
  /// Kept as written: unquoted `000000` or `5319e7` would otherwise resolve to numbers
  pub color: String,
  #[serde(default)]
  pub description: String,
}

/// Normalize a color for comparison and writing: no leading `#`, lowercase hex
pub fn normalize_color(color: &str) -> String {
  color.trim().trim_start_matches('#').to_ascii_lowercase()
}

/// Declared set of canonical labels, keyed by name
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
  labels: BTreeMap<String, Label>,
}

impl LabelCatalog {
  /// Build a catalog, rejecting duplicate names
  pub fn new(labels: Vec<Label>) -> WardenResult<Self> {
    let mut map = BTreeMap::new();
    for label in labels {
      if map.contains_key(&label.name) {
        return Err(WardenError::Config(ConfigError::DuplicateLabel { name: label.name }));
      }
      map.insert(label.name.clone(), label);
    }
    Ok(Self { labels: map })
  }

  /// Parse the YAML label list
  pub fn from_yaml(content: &str) -> WardenResult<Self> {
    let labels: Vec<Label> = serde_yaml::from_str(content)?;
    Self::new(labels)
  }

  pub fn get(&self, name: &str) -> Option<&Label> {
    self.labels.get(name)
  }

  /// Labels in name order
  pub fn iter(&self) -> impl Iterator<Item = &Label> {
    self.labels.values()
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }
}

/// A release-note category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
  pub title: String,
  #[serde(default)]
  pub labels: Vec<String>,
  /// Single-label shorthand accepted by release-drafter
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

impl Category {
  /// All labels routing a pull request into this category
  pub fn all_labels(&self) -> impl Iterator<Item = &str> {
    self.labels.iter().map(String::as_str).chain(self.label.as_deref())
  }
}

/// The release-drafter document, of which only categories and exclusions are used
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DrafterDocument {
  #[serde(default)]
  categories: Vec<Category>,
  #[serde(default)]
  exclude_labels: Option<Vec<String>>,
  /// Templates and resolvers used by other release tooling
  #[serde(flatten)]
  other: BTreeMap<String, serde_yaml::Value>,
}

/// Categories in declaration order plus the derived label sets
#[derive(Debug, Clone)]
pub struct ReleaseCategories {
  categories: Vec<Category>,
  required: BTreeSet<String>,
  exclude: BTreeSet<String>,
  /// First declaring category wins for each label
  label_to_category: HashMap<String, usize>,
}

impl ReleaseCategories {
  /// Build from categories and an optional exclusion list
  pub fn new(categories: Vec<Category>, exclude: Option<Vec<String>>) -> Self {
    let mut required = BTreeSet::new();
    let mut label_to_category = HashMap::new();

    for (index, category) in categories.iter().enumerate() {
      let mut any = false;
      for label in category.all_labels() {
        any = true;
        required.insert(label.to_string());
        label_to_category.entry(label.to_string()).or_insert(index);
      }
      if !any {
        tracing::warn!("Category '{}' does not have any labels defined", category.title);
      }
    }

    let exclude: BTreeSet<String> = match exclude {
      Some(labels) => labels.into_iter().collect(),
      None => BTreeSet::from([DEFAULT_EXCLUDE_LABEL.to_string()]),
    };

    let overlap: Vec<&String> = required.intersection(&exclude).collect();
    if !overlap.is_empty() {
      tracing::warn!(
        "Labels {:?} are both required and excluded; exclusion takes precedence",
        overlap
      );
    }

    tracing::info!(
      "Labels mapped to release notes sections: {}",
      required.iter().cloned().collect::<Vec<_>>().join(", ")
    );

    Self {
      categories,
      required,
      exclude,
      label_to_category,
    }
  }

  /// Parse the release-drafter YAML document
  pub fn from_yaml(content: &str) -> WardenResult<Self> {
    let document: DrafterDocument = serde_yaml::from_str(content)?;
    if !document.other.is_empty() {
      tracing::debug!(
        "Ignoring release-drafter keys: {}",
        document.other.keys().cloned().collect::<Vec<_>>().join(", ")
      );
    }
    Ok(Self::new(document.categories, document.exclude_labels))
  }

  /// Categories in declaration order
  pub fn categories(&self) -> &[Category] {
    &self.categories
  }

  /// Union of all category labels; a pull request needs at least one
  pub fn required(&self) -> &BTreeSet<String> {
    &self.required
  }

  /// True when any label is in the exclusion set
  pub fn is_excluded<'a>(&self, labels: impl IntoIterator<Item = &'a String>) -> bool {
    labels.into_iter().any(|label| self.exclude.contains(label))
  }

  /// Required labels present in `labels`
  pub fn matched<'a>(&self, labels: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
    labels
      .into_iter()
      .filter(|label| self.required.contains(*label))
      .cloned()
      .collect()
  }

  /// First category, in declaration order, owning any of the labels
  pub fn category_for<'a>(&self, labels: impl IntoIterator<Item = &'a String>) -> Option<&Category> {
    labels
      .into_iter()
      .filter_map(|label| self.label_to_category.get(label).copied())
      .min()
      .map(|index| &self.categories[index])
  }
}
