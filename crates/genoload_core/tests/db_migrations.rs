use genoload_core::db::migrations::latest_version;
use genoload_core::db::{open_db, open_db_in_memory, DbError};
use genoload_core::{RepoError, SqliteChadoRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "organism",
        "cvterm",
        "feature",
        "featureprop",
        "feature_relationship",
        "featureloc",
        "project",
        "stock",
        "genotype",
        "genotype_call",
        "stock_genotype",
        "nd_geolocation",
        "nd_experiment",
        "nd_experiment_genotype",
        "nd_experiment_stock",
        "nd_experiment_project",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("genetics.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO organism (genus, species) VALUES ('Lens', 'culinaris');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let organisms: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM organism;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(organisms, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_migration_reports_version_and_leaves_schema_unversioned() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clash.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE organism (legacy TEXT);")
        .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::MigrationFailed { version, .. } => assert_eq!(version, 1),
        other => panic!("unexpected error: {other}"),
    }
    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteChadoRepository::try_new(&conn)
        .err()
        .expect("bare connection has no schema");
    assert!(matches!(err, RepoError::SchemaNotReady { found: 0, .. }));
}

#[test]
fn featureloc_rejects_inverted_interval_at_schema_level() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO organism (organism_id, genus, species) VALUES (1, 'Lens', 'culinaris');
         INSERT INTO cvterm (cvterm_id, name) VALUES (1, 'chromosome');
         INSERT INTO feature (feature_id, organism_id, uniquename, type_id) VALUES
            (1, 1, 'Chr1', 1), (2, 1, 'V1', 1);",
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO featureloc (feature_id, srcfeature_id, fmin, fmax) VALUES (2, 1, 10, 9);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
