//! Row validation for genotype matrix data lines.
//!
//! # Responsibility
//! - Apply the column rules in order and produce a normalized record.
//! - Derive the marker display name from the variant and marker type.
//!
//! # Invariants
//! - `fmax - fmin == 1` and `fmin == position - 1` for every record.
//! - Marker names depend only on file content and configuration.
//! - Columns after the fifth are ignored.

use crate::config::{SampleList, SampleStock};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WORD_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)(\p{Ll})").expect("valid word start regex"));

const COL_VARIANT: usize = 0;
const COL_BACKBONE: usize = 1;
const COL_POSITION: usize = 2;
const COL_SOURCE: usize = 3;
const COL_ALLELE: usize = 4;

/// Normalized content of one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenotypeRow {
    pub variant_name: String,
    pub backbone_name: String,
    pub marker_name: String,
    pub fmin: i64,
    pub fmax: i64,
    pub source_name: String,
    pub stock: SampleStock,
    pub allele: String,
}

/// Why a row produced no record without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than two populated columns.
    Blank,
    /// Allele column empty: missing genotype data.
    MissingAllele,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::MissingAllele => "missing_allele",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Skip(SkipReason),
    Record(GenotypeRow),
}

/// Row rule violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    UnknownSample(String),
    InvalidPosition(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::UnknownSample(name) => write!(f, "sample not in sample list: {name}"),
            Self::InvalidPosition(value) => {
                write!(f, "position must be a positive integer, got `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Validates one data row against the column rules and the sample lookup.
pub fn validate_row<S: AsRef<str>>(
    fields: &[S],
    samples: &SampleList,
    marker_type: &str,
) -> Result<RowOutcome, ValidationError> {
    let populated = fields
        .iter()
        .filter(|field| !field.as_ref().trim().is_empty())
        .count();
    if populated < 2 {
        return Ok(RowOutcome::Skip(SkipReason::Blank));
    }

    let variant_name = required(fields, COL_VARIANT, "variant_name")?;
    let backbone_name = required(fields, COL_BACKBONE, "backbone")?;
    let position = required(fields, COL_POSITION, "position")?;
    let (fmin, fmax) = snp_interval(position)?;

    let source_name = required(fields, COL_SOURCE, "source")?;
    let stock = samples
        .get(source_name)
        .cloned()
        .ok_or_else(|| ValidationError::UnknownSample(source_name.to_string()))?;

    let allele = column(fields, COL_ALLELE);
    if allele.is_empty() {
        return Ok(RowOutcome::Skip(SkipReason::MissingAllele));
    }

    Ok(RowOutcome::Record(GenotypeRow {
        variant_name: variant_name.to_string(),
        backbone_name: backbone_name.to_string(),
        marker_name: derive_marker_name(variant_name, marker_type),
        fmin,
        fmax,
        source_name: source_name.to_string(),
        stock,
        allele: allele.to_string(),
    }))
}

/// Returns `<variant_name> <Title Cased marker type>`.
///
/// Underscores in the marker type become spaces and every word is
/// capitalized with the rest lowercased: `snp_marker` -> `Snp Marker`.
pub fn derive_marker_name(variant_name: &str, marker_type: &str) -> String {
    let spaced = marker_type.trim().replace('_', " ").to_lowercase();
    let titled = WORD_START_RE.replace_all(&spaced, |caps: &Captures<'_>| {
        format!("{}{}", &caps[1], caps[2].to_uppercase())
    });
    format!("{variant_name} {titled}")
}

/// Converts a 1-based SNP position into the half-open `[fmin, fmax)`.
pub fn snp_interval(position: &str) -> Result<(i64, i64), ValidationError> {
    match position.trim().parse::<i64>() {
        Ok(value) if value >= 1 => Ok((value - 1, value)),
        _ => Err(ValidationError::InvalidPosition(position.to_string())),
    }
}

fn column<S: AsRef<str>>(fields: &[S], index: usize) -> &str {
    fields.get(index).map_or("", |field| field.as_ref().trim())
}

fn required<'a, S: AsRef<str>>(
    fields: &'a [S],
    index: usize,
    name: &'static str,
) -> Result<&'a str, ValidationError> {
    let value = column(fields, index);
    if value.is_empty() {
        return Err(ValidationError::MissingField(name));
    }
    Ok(value)
}
