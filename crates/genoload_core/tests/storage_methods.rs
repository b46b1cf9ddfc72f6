mod common;

use common::{config, count, seeded_db, GEOLOCATION_ID, HEADER, PROJECT_ID, STOCK_A, STOCK_B};
use genoload_core::{
    ExperimentStorage, GenotypeCall, GenotypeStorage, LoaderConfig, MatrixLoader, NoProgress,
    SqliteChadoRepository, StockStorage, StorageRegistry,
};
use rusqlite::Connection;
use std::io::Cursor;

const MATRIX: &str = "Variant1\tChr1\t1500\tSampleA\tT\nVariant1\tChr1\t1500\tSampleB\tT\n";

fn run(conn: &Connection, config: LoaderConfig) {
    let repo = SqliteChadoRepository::try_new(conn).unwrap();
    let types = repo.type_map().unwrap();
    let mut loader =
        MatrixLoader::new(repo, config, &types, &StorageRegistry::with_builtin_methods()).unwrap();
    loader
        .load_reader(Cursor::new(format!("{HEADER}{MATRIX}")), 3, &mut NoProgress)
        .unwrap();
}

fn call(stock_id: i64, nd_geolocation: Option<i64>) -> GenotypeCall {
    GenotypeCall {
        project_id: PROJECT_ID,
        project_name: "Lentil Diversity Panel".to_string(),
        variant_id: 1,
        variant_name: "Chr1".to_string(),
        variant_type: "SNP".to_string(),
        marker_id: 1,
        marker_name: "Chr1 Snp".to_string(),
        marker_type: "SNP".to_string(),
        feature_type_of_marker: "genetic_marker".to_string(),
        sample_name: "SampleA".to_string(),
        stock_id,
        stock_name: "LR-01".to_string(),
        allele: "A".to_string(),
        genotype_type_id: 6,
        experiment_type_id: Some(7),
        nd_geolocation,
    }
}

#[test]
fn genotype_call_method_shares_genotype_between_samples() {
    let conn = seeded_db();
    run(&conn, config("genotype_call"));

    assert_eq!(count(&conn, "genotype"), 1);
    assert_eq!(count(&conn, "genotype_call"), 2);
    assert_eq!(count(&conn, "nd_experiment"), 0);
    assert_eq!(count(&conn, "stock_genotype"), 0);

    let uniquename: String = conn
        .query_row("SELECT uniquename FROM genotype;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(uniquename, "Variant1 Snp_T");
}

#[test]
fn experiment_method_links_genotype_stock_and_project() {
    let conn = seeded_db();
    let mut with_location = config("nd_experiment");
    with_location.nd_geolocation = Some(GEOLOCATION_ID);
    run(&conn, with_location);

    assert_eq!(count(&conn, "nd_experiment"), 2);
    assert_eq!(count(&conn, "nd_experiment_genotype"), 2);
    assert_eq!(count(&conn, "nd_experiment_project"), 2);
    assert_eq!(count(&conn, "genotype_call"), 0);

    let stocks: Vec<i64> = conn
        .prepare("SELECT stock_id FROM nd_experiment_stock ORDER BY stock_id;")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(stocks, vec![STOCK_A, STOCK_B]);

    let located: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM nd_experiment WHERE nd_geolocation_id = ?1 AND type_id = 7;",
            [GEOLOCATION_ID],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(located, 2);
}

#[test]
fn experiment_method_without_geolocation_is_not_an_error() {
    let conn = seeded_db();
    run(&conn, config("nd_experiment"));

    let unlocated: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM nd_experiment WHERE nd_geolocation_id IS NULL;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(unlocated, 2);
}

#[test]
fn stock_method_links_each_stock_once() {
    let conn = seeded_db();
    run(&conn, config("stock"));
    run(&conn, config("stock"));

    assert_eq!(count(&conn, "genotype"), 1);
    assert_eq!(count(&conn, "stock_genotype"), 2);
}

#[test]
fn strategies_accept_the_same_call_with_or_without_geolocation() {
    let conn = seeded_db();
    let repo = SqliteChadoRepository::try_new(&conn).unwrap();

    StockStorage.store(&repo, &call(STOCK_A, None)).unwrap();
    ExperimentStorage.store(&repo, &call(STOCK_A, None)).unwrap();
    ExperimentStorage
        .store(&repo, &call(STOCK_B, Some(GEOLOCATION_ID)))
        .unwrap();

    assert_eq!(count(&conn, "genotype"), 1);
    assert_eq!(count(&conn, "stock_genotype"), 1);
    assert_eq!(count(&conn, "nd_experiment"), 2);
}
