//! Entity/genotype persistence contracts and SQLite implementation.
//!
//! # Responsibility
//! - Look up and create features, feature properties, relationships and
//!   locations on behalf of the resolver.
//! - Write genotype records and their call/stock/experiment links on behalf
//!   of storage methods.
//!
//! # Invariants
//! - `create_entity` validates the record before any SQL mutation.
//! - Feature lookups never fail on duplicates: the lowest id wins.

use crate::config::TypeMap;
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::feature::{EntityRecord, RecordId, RecordValidationError};
use crate::model::genotype::{GenotypeCallRow, GenotypeRecord};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for entity and genotype persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    SchemaNotReady { found: u32, expected: u32 },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "database schema version {found} does not match expected {expected}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::SchemaNotReady { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Per-kind lookup/creation capability invoked by the resolver.
pub trait EntityStore {
    /// Returns the id of a record matching every specified field.
    fn find_entity(&self, record: &EntityRecord) -> RepoResult<Option<RecordId>>;
    /// Creates a record without checking for duplicates.
    fn create_entity(&self, record: &EntityRecord) -> RepoResult<RecordId>;
}

/// Link kinds attached to one experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentLink {
    Genotype(RecordId),
    Stock(RecordId),
    Project(RecordId),
}

/// Genotype write capability used by storage methods.
pub trait GenotypeStore {
    fn select_or_insert_genotype(&self, genotype: &GenotypeRecord) -> RepoResult<RecordId>;
    fn insert_genotype_call(&self, row: &GenotypeCallRow) -> RepoResult<RecordId>;
    fn select_or_insert_stock_genotype(
        &self,
        stock_id: RecordId,
        genotype_id: RecordId,
    ) -> RepoResult<RecordId>;
    /// Creates one experiment; `nd_geolocation_id = None` stores NULL.
    fn insert_experiment(
        &self,
        nd_geolocation_id: Option<RecordId>,
        type_id: Option<RecordId>,
    ) -> RepoResult<RecordId>;
    fn link_experiment(&self, experiment_id: RecordId, link: ExperimentLink)
        -> RepoResult<RecordId>;
}

/// SQLite-backed store over the normalized genetics schema.
pub struct SqliteChadoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChadoRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Rejects connections whose schema version differs from this binary.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected = latest_version();
        if found != expected {
            return Err(RepoError::SchemaNotReady { found, expected });
        }
        Ok(Self { conn })
    }

    /// Reads every vocabulary term as a name -> id map.
    pub fn type_map(&self) -> RepoResult<TypeMap> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, cvterm_id FROM cvterm ORDER BY cvterm_id;")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, RecordId>(1)?))
        })?;

        let mut types = TypeMap::new();
        for row in rows {
            let (name, id) = row?;
            types.insert(name, id);
        }
        Ok(types)
    }

    fn find_feature_id(
        &self,
        uniquename: &str,
        name: Option<&str>,
        organism_id: RecordId,
        type_id: Option<RecordId>,
    ) -> RepoResult<Option<RecordId>> {
        let mut stmt = self.conn.prepare(
            "SELECT feature_id
             FROM feature
             WHERE uniquename = ?1
               AND organism_id = ?2
               AND (?3 IS NULL OR name = ?3)
               AND (?4 IS NULL OR type_id = ?4)
             ORDER BY feature_id ASC
             LIMIT 2;",
        )?;
        let ids = stmt
            .query_map(params![uniquename, organism_id, name, type_id], |row| {
                row.get::<_, RecordId>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if ids.len() > 1 {
            warn!(
                "event=feature_lookup module=repo status=ambiguous uniquename={} organism_id={} selected_id={}",
                uniquename, organism_id, ids[0]
            );
        }
        Ok(ids.first().copied())
    }
}

impl EntityStore for SqliteChadoRepository<'_> {
    fn find_entity(&self, record: &EntityRecord) -> RepoResult<Option<RecordId>> {
        match record {
            EntityRecord::Feature(feature) => self.find_feature_id(
                feature.uniquename.as_str(),
                feature.name.as_deref(),
                feature.organism_id,
                feature.type_id,
            ),
            EntityRecord::FeatureProp(prop) => Ok(self
                .conn
                .query_row(
                    "SELECT featureprop_id
                     FROM featureprop
                     WHERE feature_id = ?1 AND type_id = ?2 AND value = ?3;",
                    params![prop.feature_id, prop.type_id, prop.value.as_str()],
                    |row| row.get(0),
                )
                .optional()?),
            EntityRecord::FeatureRelationship(relationship) => Ok(self
                .conn
                .query_row(
                    "SELECT feature_relationship_id
                     FROM feature_relationship
                     WHERE subject_id = ?1 AND object_id = ?2 AND type_id = ?3;",
                    params![
                        relationship.subject_id,
                        relationship.object_id,
                        relationship.type_id
                    ],
                    |row| row.get(0),
                )
                .optional()?),
            EntityRecord::FeatureLocation(location) => Ok(self
                .conn
                .query_row(
                    "SELECT featureloc_id
                     FROM featureloc
                     WHERE feature_id = ?1
                       AND srcfeature_id = ?2
                       AND fmin = ?3
                       AND fmax = ?4;",
                    params![
                        location.feature_id,
                        location.srcfeature_id,
                        location.fmin,
                        location.fmax
                    ],
                    |row| row.get(0),
                )
                .optional()?),
        }
    }

    fn create_entity(&self, record: &EntityRecord) -> RepoResult<RecordId> {
        record.validate_for_insert()?;

        match record {
            EntityRecord::Feature(feature) => {
                self.conn.execute(
                    "INSERT INTO feature (organism_id, name, uniquename, type_id)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        feature.organism_id,
                        feature.name.as_deref(),
                        feature.uniquename.as_str(),
                        feature.type_id,
                    ],
                )?;
            }
            EntityRecord::FeatureProp(prop) => {
                self.conn.execute(
                    "INSERT INTO featureprop (feature_id, type_id, value, rank)
                     VALUES (
                        ?1,
                        ?2,
                        ?3,
                        COALESCE(
                            (SELECT MAX(rank) + 1 FROM featureprop
                             WHERE feature_id = ?1 AND type_id = ?2),
                            0
                        )
                     );",
                    params![prop.feature_id, prop.type_id, prop.value.as_str()],
                )?;
            }
            EntityRecord::FeatureRelationship(relationship) => {
                self.conn.execute(
                    "INSERT INTO feature_relationship (subject_id, object_id, type_id)
                     VALUES (?1, ?2, ?3);",
                    params![
                        relationship.subject_id,
                        relationship.object_id,
                        relationship.type_id
                    ],
                )?;
            }
            EntityRecord::FeatureLocation(location) => {
                self.conn.execute(
                    "INSERT INTO featureloc (feature_id, srcfeature_id, fmin, fmax)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        location.feature_id,
                        location.srcfeature_id,
                        location.fmin,
                        location.fmax
                    ],
                )?;
            }
        }

        Ok(self.conn.last_insert_rowid())
    }
}

impl GenotypeStore for SqliteChadoRepository<'_> {
    fn select_or_insert_genotype(&self, genotype: &GenotypeRecord) -> RepoResult<RecordId> {
        if genotype.uniquename.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "genotype uniquename must not be blank".to_string(),
            ));
        }

        let existing = self
            .conn
            .query_row(
                "SELECT genotype_id FROM genotype WHERE uniquename = ?1;",
                [genotype.uniquename.as_str()],
                |row| row.get::<_, RecordId>(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO genotype (name, uniquename, type_id) VALUES (?1, ?2, ?3);",
            params![
                genotype.name.as_str(),
                genotype.uniquename.as_str(),
                genotype.type_id
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_genotype_call(&self, row: &GenotypeCallRow) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO genotype_call (variant_id, marker_id, genotype_id, project_id, stock_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                row.variant_id,
                row.marker_id,
                row.genotype_id,
                row.project_id,
                row.stock_id
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn select_or_insert_stock_genotype(
        &self,
        stock_id: RecordId,
        genotype_id: RecordId,
    ) -> RepoResult<RecordId> {
        let existing = self
            .conn
            .query_row(
                "SELECT stock_genotype_id
                 FROM stock_genotype
                 WHERE stock_id = ?1 AND genotype_id = ?2;",
                params![stock_id, genotype_id],
                |row| row.get::<_, RecordId>(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO stock_genotype (stock_id, genotype_id) VALUES (?1, ?2);",
            params![stock_id, genotype_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_experiment(
        &self,
        nd_geolocation_id: Option<RecordId>,
        type_id: Option<RecordId>,
    ) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO nd_experiment (nd_geolocation_id, type_id) VALUES (?1, ?2);",
            params![nd_geolocation_id, type_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn link_experiment(
        &self,
        experiment_id: RecordId,
        link: ExperimentLink,
    ) -> RepoResult<RecordId> {
        let (sql, target_id) = match link {
            ExperimentLink::Genotype(id) => (
                "INSERT INTO nd_experiment_genotype (nd_experiment_id, genotype_id)
                 VALUES (?1, ?2);",
                id,
            ),
            ExperimentLink::Stock(id) => (
                "INSERT INTO nd_experiment_stock (nd_experiment_id, stock_id)
                 VALUES (?1, ?2);",
                id,
            ),
            ExperimentLink::Project(id) => (
                "INSERT INTO nd_experiment_project (nd_experiment_id, project_id)
                 VALUES (?1, ?2);",
                id,
            ),
        };
        self.conn.execute(sql, params![experiment_id, target_id])?;
        Ok(self.conn.last_insert_rowid())
    }
}
