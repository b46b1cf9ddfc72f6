//! Versioned genetics schema.
//!
//! `0001_features.sql` holds the organism, vocabulary and feature graph
//! tables; `0002_genotypes.sql` adds projects, stocks, genotypes and
//! experiments. Pending scripts run in one transaction, each followed by a
//! `user_version` bump.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const MIGRATIONS: [(u32, &str); 2] = [
    (1, include_str!("0001_features.sql")),
    (2, include_str!("0002_genotypes.sql")),
];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to [`latest_version`]; a no-op on a current schema.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }
    if found == supported {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > found) {
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::MigrationFailed {
                version: *version,
                source,
            })?;
        info!("event=schema_migrate module=db status=ok version={version}");
    }
    tx.commit()?;
    Ok(())
}
