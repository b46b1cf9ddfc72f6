//! Chado-style SQLite store: connection setup and schema versioning.
//!
//! Schema state lives in `PRAGMA user_version`. The loader and repository
//! only touch feature and genotype tables on a connection opened through
//! [`open_db`] or [`open_db_in_memory`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer genoload schema.
    SchemaTooNew { found: u32, supported: u32 },
    /// A migration script failed; earlier versions stay applied.
    MigrationFailed {
        version: u32,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "genetics schema v{found} is newer than this loader (v{supported})"
            ),
            Self::MigrationFailed { version, source } => {
                write!(f, "genetics schema migration v{version} failed: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::MigrationFailed { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
