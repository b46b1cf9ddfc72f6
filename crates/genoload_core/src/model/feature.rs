//! Feature-centric entity records.
//!
//! # Responsibility
//! - Describe the four entity kinds the resolver handles: features
//!   (backbones, variants, markers), feature properties, feature
//!   relationships and feature locations.
//! - Validate record shape before persistence.
//!
//! # Invariants
//! - Locations are half-open intervals with `0 <= fmin <= fmax`.
//! - A feature that is created must carry a non-blank unique name and a type.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage identifier of any persisted record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecordId = i64;

/// Entity kind dispatched by the resolver to the persistence capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Feature,
    FeatureProp,
    FeatureRelationship,
    FeatureLocation,
}

impl EntityKind {
    /// Stable table-like name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::FeatureProp => "featureprop",
            Self::FeatureRelationship => "feature_relationship",
            Self::FeatureLocation => "featureloc",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sequence feature: backbone, variant or marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    /// Required for lookup and creation.
    pub uniquename: String,
    /// Display name; lookups ignore it when `None`.
    pub name: Option<String>,
    pub organism_id: RecordId,
    /// Lookups ignore the type when `None`; creation requires it.
    pub type_id: Option<RecordId>,
}

/// A literal property value attached to a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturePropRecord {
    pub feature_id: RecordId,
    pub type_id: RecordId,
    pub value: String,
}

/// Directed link `subject -[type]-> object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRelationshipRecord {
    pub subject_id: RecordId,
    pub object_id: RecordId,
    pub type_id: RecordId,
}

/// Position of a feature on a backbone as `[fmin, fmax)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLocationRecord {
    pub feature_id: RecordId,
    pub srcfeature_id: RecordId,
    pub fmin: i64,
    pub fmax: i64,
}

/// Logical record handed to the resolver, tagged by entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRecord {
    Feature(FeatureRecord),
    FeatureProp(FeaturePropRecord),
    FeatureRelationship(FeatureRelationshipRecord),
    FeatureLocation(FeatureLocationRecord),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Feature(_) => EntityKind::Feature,
            Self::FeatureProp(_) => EntityKind::FeatureProp,
            Self::FeatureRelationship(_) => EntityKind::FeatureRelationship,
            Self::FeatureLocation(_) => EntityKind::FeatureLocation,
        }
    }

    /// Validates the record for creation.
    ///
    /// Lookups accept partially specified features; only writes call this.
    pub fn validate_for_insert(&self) -> Result<(), RecordValidationError> {
        match self {
            Self::Feature(feature) => {
                if feature.uniquename.trim().is_empty() {
                    return Err(RecordValidationError::BlankUniqueName);
                }
                if feature.type_id.is_none() {
                    return Err(RecordValidationError::MissingType(EntityKind::Feature));
                }
                Ok(())
            }
            Self::FeatureProp(prop) => {
                if prop.value.trim().is_empty() {
                    return Err(RecordValidationError::BlankPropertyValue);
                }
                Ok(())
            }
            Self::FeatureRelationship(relationship) => {
                if relationship.subject_id == relationship.object_id {
                    return Err(RecordValidationError::SelfRelationship(
                        relationship.subject_id,
                    ));
                }
                Ok(())
            }
            Self::FeatureLocation(location) => {
                if location.fmin < 0 || location.fmin > location.fmax {
                    return Err(RecordValidationError::InvalidInterval {
                        fmin: location.fmin,
                        fmax: location.fmax,
                    });
                }
                Ok(())
            }
        }
    }
}

/// Shape errors detected before a record is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    BlankUniqueName,
    BlankPropertyValue,
    MissingType(EntityKind),
    SelfRelationship(RecordId),
    InvalidInterval { fmin: i64, fmax: i64 },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUniqueName => write!(f, "feature uniquename must not be blank"),
            Self::BlankPropertyValue => write!(f, "feature property value must not be blank"),
            Self::MissingType(kind) => write!(f, "{kind} record requires a type id"),
            Self::SelfRelationship(id) => {
                write!(f, "feature {id} cannot be related to itself")
            }
            Self::InvalidInterval { fmin, fmax } => {
                write!(f, "invalid location interval [{fmin}, {fmax})")
            }
        }
    }
}

impl Error for RecordValidationError {}

#[cfg(test)]
mod tests {
    use super::{
        EntityKind, EntityRecord, FeatureLocationRecord, FeatureRecord, RecordValidationError,
    };

    #[test]
    fn feature_without_type_cannot_be_created() {
        let record = EntityRecord::Feature(FeatureRecord {
            uniquename: "Chr1".to_string(),
            name: None,
            organism_id: 1,
            type_id: None,
        });
        assert_eq!(record.kind(), EntityKind::Feature);
        assert_eq!(
            record.validate_for_insert(),
            Err(RecordValidationError::MissingType(EntityKind::Feature))
        );
    }

    #[test]
    fn location_interval_must_be_ordered_and_non_negative() {
        let inverted = EntityRecord::FeatureLocation(FeatureLocationRecord {
            feature_id: 1,
            srcfeature_id: 2,
            fmin: 10,
            fmax: 9,
        });
        assert!(inverted.validate_for_insert().is_err());

        let negative = EntityRecord::FeatureLocation(FeatureLocationRecord {
            feature_id: 1,
            srcfeature_id: 2,
            fmin: -1,
            fmax: 0,
        });
        assert!(negative.validate_for_insert().is_err());

        let snp = EntityRecord::FeatureLocation(FeatureLocationRecord {
            feature_id: 1,
            srcfeature_id: 2,
            fmin: 1499,
            fmax: 1500,
        });
        assert!(snp.validate_for_insert().is_ok());
    }
}
