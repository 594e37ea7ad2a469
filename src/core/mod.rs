//! Core building blocks shared by every command
//!
//! - **config**: Tool settings (warden.toml) search and validation
//! - **context**: Per-run repository context (root, identity, settings)
//! - **error**: Error types with contextual help messages and exit codes
//! - **plan**: Serializable plans of hosting-platform mutations
//! - **vcs**: Read-only git access (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod plan;
pub mod vcs;
