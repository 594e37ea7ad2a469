//! Release notes drafting
//!
//! The draft release is the only release warden ever writes. It is created as a draft
//! pre-release and updated in place on every run until a maintainer publishes it.

pub mod draft;

pub use draft::{DraftAction, compile};
