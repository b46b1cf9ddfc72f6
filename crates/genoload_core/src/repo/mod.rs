//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence capabilities the loader consumes: entity lookup
//!   and creation per kind, and genotype writes.
//! - Isolate SQLite query details from resolution and orchestration.
//!
//! # Invariants
//! - Repository writes must validate records before persistence.
//! - Repository APIs return semantic errors in addition to DB transport errors.

pub mod chado_repo;
