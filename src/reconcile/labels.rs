//! Label Catalog Reconciler
//!
//! Three-way diff between the declared catalog and the live labels. Declared values always
//! win; live labels missing from the catalog are only reported, never deleted.

use crate::catalog::{Label, LabelCatalog, normalize_color};
use crate::core::error::WardenResult;
use crate::core::plan::{Operation, OperationType, Plan};
use crate::hosting::{HostingPlatform, LiveLabel};
use crate::ui::progress::TaskProgress;
use rayon::prelude::*;
use serde::Serialize;

/// A live label whose attributes drifted from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelUpdate {
  pub live: LiveLabel,
  pub declared: Label,
}

/// Outcome of diffing the catalog against the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelDiff {
  /// Declared but absent on the platform (catalog order)
  pub create: Vec<Label>,
  pub update: Vec<LabelUpdate>,
  /// Live but undeclared (platform order)
  pub unknown: Vec<LiveLabel>,
}

impl LabelDiff {
  /// No create or update is needed
  pub fn in_sync(&self) -> bool {
    self.create.is_empty() && self.update.is_empty()
  }

  /// Mutations as a plan; unknown labels become notes
  pub fn to_plan(&self, repository: &str) -> Plan {
    let mut plan = Plan::new(OperationType::Labels, repository);

    plan.add_operations(self.create.iter().map(|label| Operation::CreateLabel {
      name: label.name.clone(),
      color: normalize_color(&label.color),
      description: label.description.clone(),
    }));
    plan.add_operations(self.update.iter().map(|update| Operation::UpdateLabel {
      name: update.declared.name.clone(),
      color: normalize_color(&update.declared.color),
      description: update.declared.description.clone(),
    }));

    for label in &self.unknown {
      plan.add_note(unknown_message(label));
    }

    plan.with_summary(format!(
      "   {} to create, {} to update, {} unknown",
      self.create.len(),
      self.update.len(),
      self.unknown.len()
    ))
  }
}

pub fn unknown_message(label: &LiveLabel) -> String {
  format!("Unknown label '{}' found defined, you may want to rename or remove", label.name)
}

/// Compare declared and live labels
pub fn diff(catalog: &LabelCatalog, live: &[LiveLabel]) -> LabelDiff {
  let mut result = LabelDiff::default();

  for declared in catalog.iter() {
    if !live.iter().any(|l| l.name == declared.name) {
      result.create.push(declared.clone());
    }
  }

  for label in live {
    match catalog.get(&label.name) {
      Some(declared) => {
        let drifted = normalize_color(&label.color) != normalize_color(&declared.color)
          || label.description != declared.description;
        if drifted {
          result.update.push(LabelUpdate {
            live: label.clone(),
            declared: declared.clone(),
          });
        }
      }
      None => result.unknown.push(label.clone()),
    }
  }

  result
}

/// Execute creates and updates in parallel
///
/// All operations run to completion; the first failure (in plan order) is returned.
pub fn apply(diff: &LabelDiff, platform: &dyn HostingPlatform, progress: &TaskProgress) -> WardenResult<usize> {
  enum Job<'a> {
    Create(&'a Label),
    Update(&'a Label),
  }

  let jobs: Vec<Job<'_>> = diff
    .create
    .iter()
    .map(Job::Create)
    .chain(diff.update.iter().map(|u| Job::Update(&u.declared)))
    .collect();

  let results: Vec<WardenResult<()>> = jobs
    .par_iter()
    .map(|job| {
      let result = match job {
        Job::Create(label) => {
          tracing::warn!("Adding label '{}'", label.name);
          platform.create_label(label)
        }
        Job::Update(label) => {
          tracing::warn!("Updating label '{}' attributes", label.name);
          platform.update_label(&label.name, &normalize_color(&label.color), &label.description)
        }
      };
      progress.inc();
      result
    })
    .collect();

  let applied = results.len();
  for result in results {
    result?;
  }
  Ok(applied)
}
