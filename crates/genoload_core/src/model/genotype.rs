//! Genotype call assembled by the loader and written by a storage method.
//!
//! # Invariants
//! - `variant_id` and `marker_id` were resolved in the same input row.
//! - `nd_geolocation` is only set for geolocation-aware storage methods.

use crate::model::feature::RecordId;

/// One observed allele for a (marker, sample) pair plus descriptive context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenotypeCall {
    pub project_id: RecordId,
    pub project_name: String,
    pub variant_id: RecordId,
    pub variant_name: String,
    pub variant_type: String,
    pub marker_id: RecordId,
    pub marker_name: String,
    /// Literal marker type, e.g. `SNP`.
    pub marker_type: String,
    pub feature_type_of_marker: String,
    pub sample_name: String,
    pub stock_id: RecordId,
    pub stock_name: String,
    pub allele: String,
    /// Type id for created genotype records.
    pub genotype_type_id: RecordId,
    /// Type id for experiments; only the experiment method reads it.
    pub experiment_type_id: Option<RecordId>,
    pub nd_geolocation: Option<RecordId>,
}

impl GenotypeCall {
    /// Genotype record this call points at; shared by every sample that
    /// carries the same allele for the same marker.
    pub fn genotype_record(&self) -> GenotypeRecord {
        GenotypeRecord {
            uniquename: format!("{}_{}", self.marker_name, self.allele),
            name: self.allele.clone(),
            type_id: self.genotype_type_id,
        }
    }
}

/// Marker-scoped allele record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenotypeRecord {
    pub uniquename: String,
    pub name: String,
    pub type_id: RecordId,
}

/// Row written by the direct genotype-call method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenotypeCallRow {
    pub variant_id: RecordId,
    pub marker_id: RecordId,
    pub genotype_id: RecordId,
    pub project_id: RecordId,
    pub stock_id: RecordId,
}
