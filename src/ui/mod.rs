pub mod progress;
pub mod term;
