//! Command-line entry point for genotype matrix loads.
//!
//! The database must already hold the organism, vocabulary terms, backbones,
//! stocks and project referenced by the config.

use clap::Parser;
use genoload_core::db::open_db;
use genoload_core::{
    core_version, default_log_level, init_logging, LoaderConfig, LogProgress, MatrixLoader,
    SqliteChadoRepository, StorageRegistry,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(version = core_version(), about = "Load a tab-delimited genotype matrix into a Chado-style SQLite store", long_about = None)]
struct Args {
    /// SQLite database; migrated to the current schema on open
    #[arg(value_name = "DATABASE")]
    database: PathBuf,

    /// Genotype matrix: header line, then variant, backbone, position, sample, allele
    #[arg(value_name = "MATRIX")]
    matrix: PathBuf,

    /// Loader configuration JSON
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Directory for rotating log files; logging stays off when omitted
    #[arg(value_name = "LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level written to LOG_DIR
    #[arg(long, value_name = "LEVEL", default_value_t = default_log_level().to_string())]
    log_level: String,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = args.log_dir.as_ref() {
        let log_dir = std::path::absolute(log_dir)?;
        init_logging(&args.log_level, log_dir)?;
    }

    let config = LoaderConfig::from_json_file(&args.config)?;
    let conn = open_db(&args.database)?;
    let repo = SqliteChadoRepository::try_new(&conn)?;
    let types = repo.type_map()?;
    let registry = StorageRegistry::with_builtin_methods();

    let mut loader = MatrixLoader::new(repo, config, &types, &registry)?;
    let summary = loader.load_file(&args.matrix, &mut LogProgress::default())?;

    println!(
        "loaded {} rows ({} skipped, {} lines) with storage method `{}`; load_id={}",
        summary.rows_loaded,
        summary.rows_skipped,
        summary.lines_read,
        loader.storage_method(),
        summary.load_id
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("load failed: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::error::ErrorKind;
    use clap::{CommandFactory, Parser};
    use std::path::Path;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_required_and_optional_arguments() {
        let parsed =
            Args::try_parse_from(["genoload_cli", "db.sqlite", "matrix.tsv", "load.json"]).unwrap();
        assert_eq!(parsed.database, Path::new("db.sqlite"));
        assert_eq!(parsed.matrix, Path::new("matrix.tsv"));
        assert_eq!(parsed.config, Path::new("load.json"));
        assert!(parsed.log_dir.is_none());

        let parsed = Args::try_parse_from([
            "genoload_cli",
            "db.sqlite",
            "matrix.tsv",
            "load.json",
            "/var/log/genoload",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(parsed.log_dir.as_deref(), Some(Path::new("/var/log/genoload")));
        assert_eq!(parsed.log_level, "debug");
    }

    #[test]
    fn rejects_missing_or_extra_arguments() {
        let err = Args::try_parse_from(["genoload_cli", "db.sqlite", "matrix.tsv"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Args::try_parse_from(["genoload_cli", "a", "b", "c", "d", "e"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
