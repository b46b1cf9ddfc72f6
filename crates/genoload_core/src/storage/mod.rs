//! Pluggable genotype storage methods.
//!
//! # Responsibility
//! - Define the single-operation storage contract for genotype calls.
//! - Register built-in methods under stable ids and resolve one per load.
//!
//! # Invariants
//! - Every method accepts the same `GenotypeCall` field set.
//! - A missing geolocation is "not applicable", never an error.

pub mod methods;
pub mod registry;
