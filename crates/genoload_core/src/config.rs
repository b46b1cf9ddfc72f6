//! Loader configuration and externally supplied lookups.
//!
//! # Responsibility
//! - Hold every caller-supplied option of a genotype matrix load.
//! - Turn the external type-name map into the ids one load needs.
//!
//! # Invariants
//! - A validated config has positive ids and non-blank names.
//! - Required vocabulary terms are resolved before any row is read.

use crate::model::feature::RecordId;
use crate::model::upsert::UpsertMode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Feature-property type for the literal marker type value.
pub const MARKER_TYPE_TERM: &str = "marker_type";
/// Relationship type for `marker -> variant`.
pub const MARKER_OF_TERM: &str = "is_marker_of";
/// Type of created genotype records.
pub const GENOTYPE_TERM: &str = "genotype";
/// Optional experiment type used by the experiment storage method.
pub const GENOTYPING_TERM: &str = "genotyping";

/// External type-name -> vocabulary id map.
pub type TypeMap = BTreeMap<String, RecordId>;

/// Stock a sample name resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SampleStock {
    pub stock_id: RecordId,
    pub stock_name: String,
}

/// Externally built sample name -> stock lookup.
pub type SampleList = BTreeMap<String, SampleStock>;

/// Options for one genotype matrix load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoaderConfig {
    pub organism_id: RecordId,
    pub variant_type: String,
    pub feature_type_of_marker: String,
    pub marker_type: String,
    pub project_name: String,
    pub project_id: RecordId,
    pub storage_method: String,
    #[serde(default)]
    pub insert_variants: UpsertMode,
    #[serde(default)]
    pub insert_markers: UpsertMode,
    #[serde(default)]
    pub sample_list: SampleList,
    #[serde(default)]
    pub nd_geolocation: Option<RecordId>,
}

impl LoaderConfig {
    /// Reads a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_json_str(text.as_str())
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|err| ConfigError::Malformed(err.to_string()))
    }

    /// Checks ids and names; does not touch storage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.organism_id <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "organism_id",
                message: format!("must be positive, got {}", self.organism_id),
            });
        }
        if self.project_id <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "project_id",
                message: format!("must be positive, got {}", self.project_id),
            });
        }

        for (field, value) in [
            ("variant_type", &self.variant_type),
            ("feature_type_of_marker", &self.feature_type_of_marker),
            ("marker_type", &self.marker_type),
            ("project_name", &self.project_name),
            ("storage_method", &self.storage_method),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "must not be blank".to_string(),
                });
            }
        }

        if let Some(geolocation) = self.nd_geolocation {
            if geolocation <= 0 {
                return Err(ConfigError::InvalidValue {
                    field: "nd_geolocation",
                    message: format!("must be positive, got {geolocation}"),
                });
            }
        }

        Ok(())
    }
}

/// Vocabulary ids resolved once per load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeIds {
    pub variant: RecordId,
    pub marker: RecordId,
    pub marker_type_prop: RecordId,
    pub marker_of: RecordId,
    pub genotype: RecordId,
    pub genotyping: Option<RecordId>,
}

impl TypeIds {
    pub fn resolve(types: &TypeMap, config: &LoaderConfig) -> Result<Self, ConfigError> {
        let require = |name: &str| {
            types
                .get(name)
                .copied()
                .ok_or_else(|| ConfigError::UnknownType(name.to_string()))
        };

        Ok(Self {
            variant: require(config.variant_type.as_str())?,
            marker: require(config.feature_type_of_marker.as_str())?,
            marker_type_prop: require(MARKER_TYPE_TERM)?,
            marker_of: require(MARKER_OF_TERM)?,
            genotype: require(GENOTYPE_TERM)?,
            genotyping: types.get(GENOTYPING_TERM).copied(),
        })
    }
}

/// Configuration errors raised before the first row is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        field: &'static str,
        message: String,
    },
    UnknownType(String),
    Unreadable {
        path: String,
        message: String,
    },
    Malformed(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "invalid config value `{field}`: {message}")
            }
            Self::UnknownType(name) => write!(f, "type name not found: {name}"),
            Self::Unreadable { path, message } => {
                write!(f, "failed to read config `{path}`: {message}")
            }
            Self::Malformed(message) => write!(f, "malformed config: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, LoaderConfig, TypeIds, TypeMap};
    use crate::model::upsert::UpsertMode;

    const MINIMAL: &str = r#"{
        "organism_id": 1,
        "variant_type": "SNP",
        "feature_type_of_marker": "genetic_marker",
        "marker_type": "SNP",
        "project_name": "Lentil Diversity",
        "project_id": 3,
        "storage_method": "genotype_call",
        "sample_list": {
            "SampleA": { "stock_id": 7, "stock_name": "LR-01" }
        }
    }"#;

    #[test]
    fn parses_json_with_default_modes() {
        let config = LoaderConfig::from_json_str(MINIMAL).expect("config should parse");
        assert_eq!(config.insert_variants, UpsertMode::InsertOrSelect);
        assert_eq!(config.insert_markers, UpsertMode::InsertOrSelect);
        assert_eq!(config.sample_list["SampleA"].stock_id, 7);
        assert_eq!(config.nd_geolocation, None);
        config.validate().expect("config should validate");
    }

    #[test]
    fn validate_rejects_blank_names_and_non_positive_ids() {
        let mut config = LoaderConfig::from_json_str(MINIMAL).unwrap();
        config.marker_type = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "marker_type",
                ..
            })
        ));

        let mut config = LoaderConfig::from_json_str(MINIMAL).unwrap();
        config.organism_id = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "organism_id",
                ..
            })
        ));
    }

    #[test]
    fn type_ids_report_first_missing_name() {
        let config = LoaderConfig::from_json_str(MINIMAL).unwrap();
        let mut types = TypeMap::new();
        types.insert("SNP".to_string(), 10);
        types.insert("genetic_marker".to_string(), 11);
        types.insert("marker_type".to_string(), 12);

        let err = TypeIds::resolve(&types, &config).expect_err("is_marker_of is missing");
        assert_eq!(err, ConfigError::UnknownType("is_marker_of".to_string()));

        types.insert("is_marker_of".to_string(), 13);
        types.insert("genotype".to_string(), 14);
        let ids = TypeIds::resolve(&types, &config).expect("all required types present");
        assert_eq!(ids.variant, 10);
        assert_eq!(ids.marker, 11);
        assert_eq!(ids.genotyping, None);
    }
}
