//! Genotype matrix ingestion.
//!
//! # Responsibility
//! - Stream tab-delimited matrix lines with line numbers.
//! - Validate one data row into a normalized record.
//!
//! # Invariants
//! - Reading never buffers more than one line.
//! - Validation never touches storage; it only consults the sample lookup.

pub mod reader;
pub mod validator;
