//! Plans of hosting-platform mutations
//!
//! Every mutating command builds a `Plan` before touching the platform:
//!
//! - **Dry-run mode**: the plan is printed and nothing is executed
//! - **Idempotency**: an empty plan means the repository is already in sync
//! - **Auditability**: plans serialize to JSON for CI logs
//!
//! ```text
//! Command (labels, draft)
//!   ↓
//! Plan (what to do)
//!   ↓
//! Apply (fix mode only)
//! ```

use crate::core::error::WardenResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of the operations)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// A single mutating call against the hosting platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
  CreateLabel {
    name: String,
    color: String,
    description: String,
  },

  /// Overwrite the live label with the declared values
  UpdateLabel {
    name: String,
    color: String,
    description: String,
  },

  CreateDraftRelease { name: String, tag: String, body: String },

  UpdateDraftRelease { id: u64, name: String, body: String },
}

/// Plan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
  /// Plan ID (content hash)
  pub id: PlanId,

  /// What command this plan belongs to
  pub operation_type: OperationType,

  /// `org/repo` the plan targets
  pub repository: String,
}

/// Type of operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
  Labels,
  Draft,
}

impl fmt::Display for OperationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OperationType::Labels => write!(f, "labels"),
      OperationType::Draft => write!(f, "draft"),
    }
  }
}

/// Ordered operations for one command run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
  pub metadata: PlanMetadata,

  /// Operations to perform (in order)
  pub operations: Vec<Operation>,

  /// Diagnostics that need an operator rather than an operation
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub notes: Vec<String>,

  /// Human-readable summary
  pub summary: String,
}

impl Plan {
  /// Create an empty plan
  pub fn new(operation_type: OperationType, repository: impl Into<String>) -> Self {
    Self {
      metadata: PlanMetadata {
        id: PlanId::from_contents(&[]),
        operation_type,
        repository: repository.into(),
      },
      operations: Vec::new(),
      notes: Vec::new(),
      summary: String::new(),
    }
  }

  /// Add an operation to the plan
  pub fn add_operation(&mut self, operation: Operation) {
    self.operations.push(operation);
    self.recompute_id();
  }

  /// Add multiple operations
  pub fn add_operations(&mut self, operations: impl IntoIterator<Item = Operation>) {
    self.operations.extend(operations);
    self.recompute_id();
  }

  pub fn add_note(&mut self, note: impl Into<String>) {
    self.notes.push(note.into());
  }

  /// Set the summary
  pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
    self.summary = summary.into();
    self
  }

  /// Recompute plan ID based on current operations
  fn recompute_id(&mut self) {
    let json = serde_json::to_vec(&self.operations).unwrap_or_default();
    self.metadata.id = PlanId::from_contents(&json);
  }

  /// Serialize to JSON
  pub fn to_json(&self) -> WardenResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!(
      "📋 Plan: {} ({})\n",
      self.metadata.operation_type, self.metadata.id
    ));
    output.push_str(&format!("   Repository: {}\n", self.metadata.repository));

    if !self.summary.is_empty() {
      output.push_str(&format!("\n{}\n", self.summary));
    }

    if self.operations.is_empty() {
      output.push_str("\n   Nothing to do, already in sync\n");
    } else {
      output.push_str(&format!("\n   Operations ({}):\n", self.operations.len()));
      for (i, op) in self.operations.iter().enumerate() {
        output.push_str(&format!("   {}. {}\n", i + 1, operation_to_string(op)));
      }
    }

    if !self.notes.is_empty() {
      output.push_str(&format!("\n   Needs attention ({}):\n", self.notes.len()));
      for note in &self.notes {
        output.push_str(&format!("   - {}\n", note));
      }
    }

    output
  }

  /// Get number of operations
  pub fn len(&self) -> usize {
    self.operations.len()
  }

  /// Check if plan is empty
  pub fn is_empty(&self) -> bool {
    self.operations.is_empty()
  }
}

/// Convert operation to human-readable string
fn operation_to_string(op: &Operation) -> String {
  match op {
    Operation::CreateLabel { name, color, .. } => format!("Create label '{}' (#{})", name, color),
    Operation::UpdateLabel { name, color, description } => {
      format!("Update label '{}' → #{} \"{}\"", name, color, description)
    }
    Operation::CreateDraftRelease { name, tag, body } => {
      format!("Create draft release '{}' on tag '{}' ({} bytes)", name, tag, body.len())
    }
    Operation::UpdateDraftRelease { id, name, body } => {
      format!("Update draft release '{}' [{}] ({} bytes)", name, id, body.len())
    }
  }
}
