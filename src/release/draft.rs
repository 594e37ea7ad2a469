//! Draft Compiler
//!
//! Renders reconciled sections into a release body and keeps a single draft release on
//! the platform in sync with it. Bodies compare byte-for-byte, so rerunning on an
//! unchanged window issues no mutating call.

use crate::core::config::ReleaseConfig;
use crate::core::error::WardenResult;
use crate::core::plan::{Operation, OperationType, Plan};
use crate::hosting::{HostingPlatform, Release};
use crate::reconcile::Section;
use serde::Serialize;

/// Render the release body
///
/// Sections without entries are omitted; the rest keep their given (category) order.
pub fn compile(heading: &str, sections: &[Section]) -> String {
  let mut body = format!("{}\n\n", heading);

  for section in sections.iter().filter(|s| !s.entries.is_empty()) {
    body.push_str(&format!("### {}\n\n", section.title));
    for entry in &section.entries {
      body.push_str(&format!("{}\n", entry));
    }
    body.push('\n');
  }

  body
}

/// The existing draft: the first release marked as draft
pub fn find_draft(releases: &[Release]) -> Option<&Release> {
  for release in releases {
    tracing::debug!(
      "tag_name={} name={} draft={} prerelease={}",
      release.tag_name,
      release.name.as_deref().unwrap_or(""),
      release.draft,
      release.prerelease
    );
    if release.draft {
      return Some(release);
    }
  }
  None
}

/// What the draft needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DraftAction {
  /// Stored body already matches
  Unchanged { id: u64 },
  Create,
  Update { id: u64 },
}

/// Compare the compiled body against the existing draft
pub fn decide(body: &str, existing: Option<&Release>) -> DraftAction {
  match existing {
    Some(draft) if draft.body.as_deref() == Some(body) => DraftAction::Unchanged { id: draft.id },
    Some(draft) => DraftAction::Update { id: draft.id },
    None => DraftAction::Create,
  }
}

/// The mutation (if any) as a plan
pub fn to_plan(action: &DraftAction, config: &ReleaseConfig, repository: &str, body: &str) -> Plan {
  let mut plan = Plan::new(OperationType::Draft, repository);
  match action {
    DraftAction::Unchanged { .. } => {}
    DraftAction::Create => plan.add_operation(Operation::CreateDraftRelease {
      name: config.draft_name.clone(),
      tag: config.draft_tag.clone(),
      body: body.to_string(),
    }),
    DraftAction::Update { id } => plan.add_operation(Operation::UpdateDraftRelease {
      id: *id,
      name: config.draft_name.clone(),
      body: body.to_string(),
    }),
  }
  plan
}

/// Carry out `action`; returns whether the platform was mutated
///
/// Without `fix` nothing is sent, whatever the action.
pub fn apply(
  platform: &dyn HostingPlatform,
  action: &DraftAction,
  config: &ReleaseConfig,
  body: &str,
  fix: bool,
) -> WardenResult<bool> {
  match action {
    DraftAction::Unchanged { .. } => {
      tracing::info!("Release body already in sync, doing nothing");
      Ok(false)
    }
    _ if !fix => {
      tracing::info!("Dry run, not touching the draft release (use --fix)");
      Ok(false)
    }
    DraftAction::Update { id } => {
      tracing::info!("Updating release body");
      platform.update_release(*id, &config.draft_name, body)?;
      Ok(true)
    }
    DraftAction::Create => {
      tracing::info!("Creating new draft release");
      let created = platform.create_draft_release(&config.draft_name, &config.draft_tag, body)?;
      tracing::debug!("Created draft release {}", created.id);
      Ok(true)
    }
  }
}
