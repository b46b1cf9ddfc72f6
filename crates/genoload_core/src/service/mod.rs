//! Load use-case services.
//!
//! # Responsibility
//! - Resolve entities under a select/insert policy.
//! - Orchestrate row-by-row loading and progress reporting.
//!
//! # See also
//! - `crate::storage` for genotype call layouts.

pub mod loader;
pub mod progress;
pub mod resolver;
