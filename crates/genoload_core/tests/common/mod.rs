#![allow(dead_code)]

use genoload_core::db::open_db_in_memory;
use genoload_core::{LoaderConfig, SampleList, SampleStock, UpsertMode};
use rusqlite::Connection;

pub const ORGANISM_ID: i64 = 1;
pub const PROJECT_ID: i64 = 1;
pub const GEOLOCATION_ID: i64 = 1;
pub const STOCK_A: i64 = 1;
pub const STOCK_B: i64 = 2;

/// In-memory database with one organism, the loader vocabulary, backbone
/// `Chr1`, stocks for `SampleA`/`SampleB`, a project and a geolocation.
pub fn seeded_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO organism (organism_id, genus, species, common_name)
         VALUES (1, 'Lens', 'culinaris', 'lentil');

         INSERT INTO cvterm (cvterm_id, name) VALUES
            (1, 'chromosome'),
            (2, 'SNP'),
            (3, 'genetic_marker'),
            (4, 'marker_type'),
            (5, 'is_marker_of'),
            (6, 'genotype'),
            (7, 'genotyping');

         INSERT INTO feature (feature_id, organism_id, name, uniquename, type_id)
         VALUES (1, 1, 'Chr1', 'Chr1', 1);

         INSERT INTO stock (stock_id, organism_id, name, uniquename)
         VALUES (1, 1, 'LR-01', 'LR-01'), (2, 1, 'LR-02', 'LR-02');

         INSERT INTO project (project_id, name) VALUES (1, 'Lentil Diversity Panel');
         INSERT INTO nd_geolocation (nd_geolocation_id, description) VALUES (1, 'Saskatoon');",
    )
    .unwrap();
    conn
}

pub fn samples() -> SampleList {
    let mut samples = SampleList::new();
    samples.insert(
        "SampleA".to_string(),
        SampleStock {
            stock_id: STOCK_A,
            stock_name: "LR-01".to_string(),
        },
    );
    samples.insert(
        "SampleB".to_string(),
        SampleStock {
            stock_id: STOCK_B,
            stock_name: "LR-02".to_string(),
        },
    );
    samples
}

pub fn config(storage_method: &str) -> LoaderConfig {
    LoaderConfig {
        organism_id: ORGANISM_ID,
        variant_type: "SNP".to_string(),
        feature_type_of_marker: "genetic_marker".to_string(),
        marker_type: "SNP".to_string(),
        project_name: "Lentil Diversity Panel".to_string(),
        project_id: PROJECT_ID,
        storage_method: storage_method.to_string(),
        insert_variants: UpsertMode::InsertOrSelect,
        insert_markers: UpsertMode::InsertOrSelect,
        sample_list: samples(),
        nd_geolocation: None,
    }
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

pub fn feature_ids(conn: &Connection, uniquename: &str) -> Vec<i64> {
    let mut stmt = conn
        .prepare("SELECT feature_id FROM feature WHERE uniquename = ?1 ORDER BY feature_id;")
        .unwrap();
    stmt.query_map([uniquename], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

pub const HEADER: &str = "variant\tbackbone\tposition\tsample\tallele\n";
