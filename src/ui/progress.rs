//! Progress indicators for hosting-platform mutations
//!
//! Uses `linya`, which draws to stderr and is safe to share across rayon workers.

use linya::{Bar, Progress};
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};

/// Thread-safe single progress bar
///
/// Disabled bars (non-terminal stderr, JSON output) accept `inc` calls and draw nothing.
pub struct TaskProgress {
  inner: Option<(Arc<Mutex<Progress>>, Bar)>,
}

impl TaskProgress {
  /// Create a bar with a label and total
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      inner: Some((Arc::new(Mutex::new(progress)), bar)),
    }
  }

  /// A bar that never draws
  pub fn hidden() -> Self {
    Self { inner: None }
  }

  /// Draw only when stderr is an interactive terminal and `enabled` is set
  pub fn for_terminal(total: usize, label: impl Into<String>, enabled: bool) -> Self {
    if enabled && total > 0 && std::io::stderr().is_terminal() {
      Self::new(total, label)
    } else {
      Self::hidden()
    }
  }

  /// Increment by 1 (thread-safe)
  pub fn inc(&self) {
    if let Some((progress, bar)) = &self.inner
      && let Ok(mut progress) = progress.lock()
    {
      progress.inc_and_draw(bar, 1);
    }
  }
}
