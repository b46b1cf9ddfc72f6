//! Genotype matrix loading into a normalized genetics schema.
//!
//! Rows of a tab-delimited matrix are validated, their backbone, variant and
//! marker entities resolved under a select/insert policy, and one genotype
//! call per row written through a pluggable storage method.

pub mod config;
pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{ConfigError, LoaderConfig, SampleList, SampleStock, TypeIds, TypeMap};
pub use ingest::reader::{count_data_lines, LineKind, MatrixLine, MatrixReader};
pub use ingest::validator::{
    derive_marker_name, validate_row, GenotypeRow, RowOutcome, SkipReason, ValidationError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::feature::{
    EntityKind, EntityRecord, FeatureLocationRecord, FeaturePropRecord,
    FeatureRelationshipRecord, FeatureRecord, RecordId, RecordValidationError,
};
pub use model::genotype::{GenotypeCall, GenotypeCallRow, GenotypeRecord};
pub use model::upsert::UpsertMode;
pub use repo::chado_repo::{
    EntityStore, ExperimentLink, GenotypeStore, RepoError, RepoResult, SqliteChadoRepository,
};
pub use service::loader::{LoadError, LoadId, LoadResult, LoadSummary, MatrixLoader, RowContext};
pub use service::progress::{LogProgress, NoProgress, ProgressObserver};
pub use service::resolver::{EntityResolver, ResolveError, ResolveResult};
pub use storage::methods::{
    ExperimentStorage, GenotypeCallStorage, GenotypeStorage, StockStorage,
};
pub use storage::registry::{StorageRegistry, StorageRegistryError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
