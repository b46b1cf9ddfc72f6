//! Genotype matrix load orchestration.
//!
//! # Responsibility
//! - Stream matrix rows, validate them and drive the fixed resolution chain:
//!   backbone, variant, marker, marker-type property, marker/variant
//!   relationship, variant location, marker location, genotype call.
//! - Report progress and return a summary or the first failure.
//!
//! # Invariants
//! - Rows are processed strictly in file order, one at a time.
//! - The first failure aborts the load; nothing is retried.
//! - A genotype call is stored only after every entity of its row resolved.
//! - Counters belong to the loader instance and reset on each load.

use crate::config::{ConfigError, LoaderConfig, TypeIds, TypeMap};
use crate::ingest::reader::{count_data_lines, LineKind, MatrixReader};
use crate::ingest::validator::{validate_row, GenotypeRow, RowOutcome, ValidationError};
use crate::model::feature::{
    EntityKind, EntityRecord, FeatureLocationRecord, FeaturePropRecord,
    FeatureRelationshipRecord, FeatureRecord, RecordId,
};
use crate::model::genotype::GenotypeCall;
use crate::model::upsert::UpsertMode;
use crate::repo::chado_repo::{EntityStore, GenotypeStore, RepoError};
use crate::service::progress::ProgressObserver;
use crate::service::resolver::{EntityResolver, ResolveError};
use crate::storage::methods::GenotypeStorage;
use crate::storage::registry::{StorageRegistry, StorageRegistryError};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Identifier attached to every log event of one load.
pub type LoadId = Uuid;

pub type LoadResult<T> = Result<T, LoadError>;

/// Location of the row being processed when a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContext {
    pub line: u64,
    pub variant_name: String,
    pub backbone_name: String,
    pub marker_name: String,
}

impl RowContext {
    fn new(line: u64, row: &GenotypeRow) -> Self {
        Self {
            line,
            variant_name: row.variant_name.clone(),
            backbone_name: row.backbone_name.clone(),
            marker_name: row.marker_name.clone(),
        }
    }
}

impl Display for RowContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {} (backbone `{}`, variant `{}`, marker `{}`)",
            self.line, self.backbone_name, self.variant_name, self.marker_name
        )
    }
}

/// Load failure taxonomy.
#[derive(Debug)]
pub enum LoadError {
    Config(ConfigError),
    UnknownStorageMethod(StorageRegistryError),
    FileUnreadable {
        path: String,
        line: u64,
        source: io::Error,
    },
    LineCountUnavailable {
        path: String,
        source: io::Error,
    },
    /// Row rule violation (`MissingField`, `UnknownSample`, `InvalidPosition`).
    Invalid { line: u64, source: ValidationError },
    /// Select-only lookup miss.
    EntityNotFound {
        context: RowContext,
        label: String,
        kind: EntityKind,
    },
    EntityCreationFailed {
        context: RowContext,
        source: ResolveError,
    },
    RelationshipFailed {
        context: RowContext,
        source: ResolveError,
    },
    LocationFailed {
        context: RowContext,
        source: ResolveError,
    },
    StorageFailed {
        context: RowContext,
        method: String,
        source: RepoError,
    },
}

impl LoadError {
    fn from_resolve(context: RowContext, err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound { label, kind } => Self::EntityNotFound {
                context,
                label,
                kind,
            },
            other => match other.kind() {
                EntityKind::Feature | EntityKind::FeatureProp => Self::EntityCreationFailed {
                    context,
                    source: other,
                },
                EntityKind::FeatureRelationship => Self::RelationshipFailed {
                    context,
                    source: other,
                },
                EntityKind::FeatureLocation => Self::LocationFailed {
                    context,
                    source: other,
                },
            },
        }
    }

    /// Physical line of the failing row, when the failure is row-scoped.
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::Config(_) | Self::UnknownStorageMethod(_) | Self::LineCountUnavailable { .. } => {
                None
            }
            Self::FileUnreadable { line, .. } | Self::Invalid { line, .. } => Some(*line),
            Self::EntityNotFound { context, .. }
            | Self::EntityCreationFailed { context, .. }
            | Self::RelationshipFailed { context, .. }
            | Self::LocationFailed { context, .. }
            | Self::StorageFailed { context, .. } => Some(context.line),
        }
    }

    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_invalid",
            Self::UnknownStorageMethod(_) => "unknown_storage_method",
            Self::FileUnreadable { .. } => "file_unreadable",
            Self::LineCountUnavailable { .. } => "line_count_unavailable",
            Self::Invalid {
                source: ValidationError::MissingField(_),
                ..
            } => "missing_field",
            Self::Invalid {
                source: ValidationError::UnknownSample(_),
                ..
            } => "unknown_sample",
            Self::Invalid {
                source: ValidationError::InvalidPosition(_),
                ..
            } => "invalid_position",
            Self::EntityNotFound { .. } => "entity_not_found",
            Self::EntityCreationFailed { .. } => "entity_creation_failed",
            Self::RelationshipFailed { .. } => "relationship_failed",
            Self::LocationFailed { .. } => "location_failed",
            Self::StorageFailed { .. } => "storage_failed",
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::UnknownStorageMethod(err) => write!(f, "{err}"),
            Self::FileUnreadable { path, line, source } => {
                write!(f, "failed to read `{path}` after line {line}: {source}")
            }
            Self::LineCountUnavailable { path, source } => {
                write!(f, "failed to count lines of `{path}`: {source}")
            }
            Self::Invalid { line, source } => write!(f, "line {line}: {source}"),
            Self::EntityNotFound {
                context,
                label,
                kind,
            } => write!(f, "{context}: {label} not found in {kind}"),
            Self::EntityCreationFailed { context, source }
            | Self::RelationshipFailed { context, source }
            | Self::LocationFailed { context, source } => write!(f, "{context}: {source}"),
            Self::StorageFailed {
                context,
                method,
                source,
            } => write!(f, "{context}: storage method `{method}` failed: {source}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::UnknownStorageMethod(err) => Some(err),
            Self::FileUnreadable { source, .. } | Self::LineCountUnavailable { source, .. } => {
                Some(source)
            }
            Self::Invalid { source, .. } => Some(source),
            Self::EntityNotFound { .. } => None,
            Self::EntityCreationFailed { source, .. }
            | Self::RelationshipFailed { source, .. }
            | Self::LocationFailed { source, .. } => Some(source),
            Self::StorageFailed { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for LoadError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StorageRegistryError> for LoadError {
    fn from(value: StorageRegistryError) -> Self {
        Self::UnknownStorageMethod(value)
    }
}

/// Counters of one successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub load_id: LoadId,
    /// Non-comment lines read, header included.
    pub lines_read: u64,
    /// Rows whose genotype call was stored.
    pub rows_loaded: u64,
    /// Blank rows and rows without an allele.
    pub rows_skipped: u64,
}

#[derive(Debug, Default)]
struct LoadState {
    lines_read: u64,
    rows_loaded: u64,
    rows_skipped: u64,
}

/// Sequential loader for one storage target.
pub struct MatrixLoader<S: EntityStore + GenotypeStore> {
    resolver: EntityResolver<S>,
    config: LoaderConfig,
    types: TypeIds,
    storage: Arc<dyn GenotypeStorage>,
    state: LoadState,
}

impl<S: EntityStore + GenotypeStore> MatrixLoader<S> {
    /// Validates config, resolves vocabulary ids and the storage method.
    ///
    /// Fails before any file is opened when the method or a type is unknown.
    pub fn new(
        store: S,
        config: LoaderConfig,
        types: &TypeMap,
        registry: &StorageRegistry,
    ) -> LoadResult<Self> {
        config.validate()?;
        let types = TypeIds::resolve(types, &config)?;
        let storage = registry.resolve(config.storage_method.as_str())?;

        Ok(Self {
            resolver: EntityResolver::new(store),
            config,
            types,
            storage,
            state: LoadState::default(),
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn storage_method(&self) -> &str {
        self.storage.method_id()
    }

    /// Loads a matrix file; the progress total excludes `#` lines.
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
        progress: &mut dyn ProgressObserver,
    ) -> LoadResult<LoadSummary> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let total = count_data_lines(path).map_err(|source| LoadError::LineCountUnavailable {
            path: label.clone(),
            source,
        })?;
        let file = File::open(path).map_err(|source| LoadError::FileUnreadable {
            path: label.clone(),
            line: 0,
            source,
        })?;

        self.run(BufReader::new(file), label.as_str(), total, progress)
    }

    /// Loads from any buffered reader with a caller-computed total.
    pub fn load_reader<R: BufRead>(
        &mut self,
        reader: R,
        total_lines: u64,
        progress: &mut dyn ProgressObserver,
    ) -> LoadResult<LoadSummary> {
        self.run(reader, "<reader>", total_lines, progress)
    }

    fn run<R: BufRead>(
        &mut self,
        reader: R,
        source: &str,
        total_lines: u64,
        progress: &mut dyn ProgressObserver,
    ) -> LoadResult<LoadSummary> {
        let load_id = Uuid::new_v4();
        let started_at = Instant::now();
        self.state = LoadState::default();
        info!(
            "event=load_start module=loader status=start load_id={load_id} source={source} total_lines={total_lines} storage_method={}",
            self.storage.method_id()
        );

        match self.stream(reader, source, total_lines, progress) {
            Ok(()) => {
                let summary = LoadSummary {
                    load_id,
                    lines_read: self.state.lines_read,
                    rows_loaded: self.state.rows_loaded,
                    rows_skipped: self.state.rows_skipped,
                };
                info!(
                    "event=load_finish module=loader status=ok load_id={load_id} duration_ms={} lines_read={} rows_loaded={} rows_skipped={}",
                    started_at.elapsed().as_millis(),
                    summary.lines_read,
                    summary.rows_loaded,
                    summary.rows_skipped
                );
                Ok(summary)
            }
            Err(err) => {
                error!(
                    "event=load_abort module=loader status=error load_id={load_id} duration_ms={} error_code={} line={} rows_loaded={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err.line().unwrap_or(0),
                    self.state.rows_loaded,
                    err
                );
                Err(err)
            }
        }
    }

    fn stream<R: BufRead>(
        &mut self,
        reader: R,
        source: &str,
        total_lines: u64,
        progress: &mut dyn ProgressObserver,
    ) -> LoadResult<()> {
        let mut lines = MatrixReader::new(reader);
        while let Some(next) = lines.next() {
            let line = next.map_err(|err| LoadError::FileUnreadable {
                path: source.to_string(),
                line: lines.line_number(),
                source: err,
            })?;
            if line.kind == LineKind::Comment {
                continue;
            }
            self.state.lines_read += 1;

            if line.kind == LineKind::Data {
                let outcome = validate_row(
                    line.fields.as_slice(),
                    &self.config.sample_list,
                    &self.config.marker_type,
                )
                .map_err(|err| LoadError::Invalid {
                    line: line.number,
                    source: err,
                })?;
                match outcome {
                    RowOutcome::Skip(reason) => {
                        self.state.rows_skipped += 1;
                        debug!(
                            "event=row_skip module=loader status=skip line={} reason={}",
                            line.number,
                            reason.as_str()
                        );
                    }
                    RowOutcome::Record(row) => {
                        self.load_row(line.number, &row)?;
                        self.state.rows_loaded += 1;
                    }
                }
            }

            progress.on_progress(self.state.lines_read, total_lines);
        }
        Ok(())
    }

    fn load_row(&self, line: u64, row: &GenotypeRow) -> LoadResult<()> {
        let context = RowContext::new(line, row);
        let organism_id = self.config.organism_id;

        let backbone_id = self.resolve_step(
            &context,
            format!("backbone {}", row.backbone_name),
            UpsertMode::SelectOnly,
            EntityRecord::Feature(FeatureRecord {
                uniquename: row.backbone_name.clone(),
                name: None,
                organism_id,
                type_id: None,
            }),
        )?;

        let variant_id = self.resolve_step(
            &context,
            format!("variant {}", row.variant_name),
            self.config.insert_variants,
            EntityRecord::Feature(FeatureRecord {
                uniquename: row.variant_name.clone(),
                name: Some(row.variant_name.clone()),
                organism_id,
                type_id: Some(self.types.variant),
            }),
        )?;

        let marker_id = self.resolve_step(
            &context,
            format!("marker {}", row.marker_name),
            self.config.insert_markers,
            EntityRecord::Feature(FeatureRecord {
                uniquename: row.marker_name.clone(),
                name: Some(row.marker_name.clone()),
                organism_id,
                type_id: Some(self.types.marker),
            }),
        )?;

        self.resolve_step(
            &context,
            format!("marker type property of {}", row.marker_name),
            UpsertMode::InsertOrSelect,
            EntityRecord::FeatureProp(FeaturePropRecord {
                feature_id: marker_id,
                type_id: self.types.marker_type_prop,
                value: self.config.marker_type.clone(),
            }),
        )?;

        self.resolve_step(
            &context,
            format!("{} is_marker_of {}", row.marker_name, row.variant_name),
            UpsertMode::InsertOrSelect,
            EntityRecord::FeatureRelationship(FeatureRelationshipRecord {
                subject_id: marker_id,
                object_id: variant_id,
                type_id: self.types.marker_of,
            }),
        )?;

        for (feature_id, feature_name) in [
            (variant_id, row.variant_name.as_str()),
            (marker_id, row.marker_name.as_str()),
        ] {
            self.resolve_step(
                &context,
                format!("location of {feature_name} on {}", row.backbone_name),
                UpsertMode::InsertOrSelect,
                EntityRecord::FeatureLocation(FeatureLocationRecord {
                    feature_id,
                    srcfeature_id: backbone_id,
                    fmin: row.fmin,
                    fmax: row.fmax,
                }),
            )?;
        }

        let call = self.assemble_call(row, variant_id, marker_id);
        self.storage
            .store(self.resolver.store(), &call)
            .map_err(|source| LoadError::StorageFailed {
                context,
                method: self.storage.method_id().to_string(),
                source,
            })?;

        debug!(
            "event=row_load module=loader status=ok line={line} variant_id={variant_id} marker_id={marker_id} stock_id={}",
            row.stock.stock_id
        );
        Ok(())
    }

    fn resolve_step(
        &self,
        context: &RowContext,
        label: String,
        mode: UpsertMode,
        record: EntityRecord,
    ) -> LoadResult<RecordId> {
        self.resolver
            .resolve(label.as_str(), mode, &record)
            .map_err(|err| LoadError::from_resolve(context.clone(), err))
    }

    fn assemble_call(
        &self,
        row: &GenotypeRow,
        variant_id: RecordId,
        marker_id: RecordId,
    ) -> GenotypeCall {
        let nd_geolocation = if self.storage.uses_geolocation() {
            self.config.nd_geolocation
        } else {
            None
        };

        GenotypeCall {
            project_id: self.config.project_id,
            project_name: self.config.project_name.clone(),
            variant_id,
            variant_name: row.variant_name.clone(),
            variant_type: self.config.variant_type.clone(),
            marker_id,
            marker_name: row.marker_name.clone(),
            marker_type: self.config.marker_type.clone(),
            feature_type_of_marker: self.config.feature_type_of_marker.clone(),
            sample_name: row.source_name.clone(),
            stock_id: row.stock.stock_id,
            stock_name: row.stock.stock_name.clone(),
            allele: row.allele.clone(),
            genotype_type_id: self.types.genotype,
            experiment_type_id: self.types.genotyping,
            nd_geolocation,
        }
    }
}
