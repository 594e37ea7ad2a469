//! The reconciliation engine
//!
//! Each component takes its inputs by value or reference and returns an immutable,
//! serializable result; nothing here prints.

pub mod audit;
pub mod labels;
pub mod pulls;
pub mod window;

pub use pulls::{Reconciliation, Section};
pub use window::resolve_window;
