//! Genetic-entity records exchanged between the loader and persistence.
//!
//! # Responsibility
//! - Define the logical records the resolver looks up or creates.
//! - Define the assembled genotype call handed to storage strategies.
//!
//! # Invariants
//! - Records carry storage identifiers (`RecordId`), never row handles.
//! - Record shapes are validated before any write.

pub mod feature;
pub mod genotype;
pub mod upsert;
