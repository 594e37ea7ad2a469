//! End-to-end tests against the `warden` binary
//!
//! Every scenario here stays offline: each one fails (or finishes) before the hosting
//! platform or a remote catalog would be contacted.

mod helpers;
mod test_cli;
mod test_draft;
mod test_identity;
mod test_labels;
