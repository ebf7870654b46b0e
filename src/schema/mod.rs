//! Schema module - Configuration and reporting types for biomorph evolution.

mod config;
mod evolution;

pub use config::*;
pub use evolution::*;
