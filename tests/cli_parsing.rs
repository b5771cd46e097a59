//! Tests for CLI subcommand parsing.

use std::path::PathBuf;

use clap::Parser;
use loggeo::config::{Command, LogFormat, LogLevel, Opt, DB_PATH, DEFAULT_BATCH_SIZE};

#[test]
fn test_cli_ingest_defaults() {
    let opt = Opt::try_parse_from(["loggeo", "ingest"]).expect("Should parse ingest command");

    assert_eq!(opt.db_path, PathBuf::from(DB_PATH));
    assert!(matches!(opt.log_level, LogLevel::Info));
    assert!(matches!(opt.log_format, LogFormat::Plain));
    match opt.command {
        Command::Ingest {
            file,
            batch_size,
            date_field,
            flush_interval_secs,
        } => {
            assert_eq!(file, PathBuf::from("-"));
            assert_eq!(batch_size, DEFAULT_BATCH_SIZE);
            assert_eq!(date_field, 4);
            assert_eq!(flush_interval_secs, 5);
        }
        other => panic!("Expected ingest, got {other:?}"),
    }
}

#[test]
fn test_cli_ingest_options() {
    let opt = Opt::try_parse_from([
        "loggeo",
        "ingest",
        "access.log",
        "--batch-size",
        "1",
        "--date-field",
        "3",
        "--flush-interval-secs",
        "0",
    ])
    .expect("Should parse ingest options");

    match opt.command {
        Command::Ingest {
            file,
            batch_size,
            date_field,
            flush_interval_secs,
        } => {
            assert_eq!(file, PathBuf::from("access.log"));
            assert_eq!(batch_size, 1);
            assert_eq!(date_field, 3);
            assert_eq!(flush_interval_secs, 0);
        }
        other => panic!("Expected ingest, got {other:?}"),
    }
}

#[test]
fn test_cli_rejects_zero_batch_size() {
    let result = Opt::try_parse_from(["loggeo", "ingest", "--batch-size", "0"]);
    assert!(result.is_err(), "Batch size of 0 should be rejected");
}

#[test]
fn test_cli_global_options_after_subcommand() {
    let opt = Opt::try_parse_from([
        "loggeo",
        "logs",
        "42",
        "--db-path",
        "/tmp/other.db",
        "--log-level",
        "debug",
        "--log-format",
        "json",
    ])
    .expect("Should parse global options after the subcommand");

    assert_eq!(opt.db_path, PathBuf::from("/tmp/other.db"));
    assert!(matches!(opt.log_level, LogLevel::Debug));
    assert!(matches!(opt.log_format, LogFormat::Json));
    assert!(matches!(opt.command, Command::Logs { ref collection } if collection == "42"));
}

#[test]
fn test_cli_import_and_lookup_commands() {
    let opt = Opt::try_parse_from(["loggeo", "import-blocks", "blocks.csv"]).unwrap();
    assert!(matches!(
        opt.command,
        Command::ImportBlocks { ref file, chunk_size: 1000 } if file == &PathBuf::from("blocks.csv")
    ));

    let opt =
        Opt::try_parse_from(["loggeo", "import-cities", "cities.csv", "--chunk-size", "10"])
            .unwrap();
    assert!(matches!(opt.command, Command::ImportCities { chunk_size: 10, .. }));

    let opt = Opt::try_parse_from(["loggeo", "resolve", "1.0.1.5"]).unwrap();
    assert!(matches!(opt.command, Command::Resolve { ref ip } if ip == "1.0.1.5"));

    let opt = Opt::try_parse_from(["loggeo", "aggregate", "--ip-field", "0"]).unwrap();
    assert!(matches!(opt.command, Command::Aggregate { ip_field: 0 }));

    let opt = Opt::try_parse_from(["loggeo", "collections"]).unwrap();
    assert!(matches!(opt.command, Command::Collections));
}

#[test]
fn test_cli_requires_subcommand() {
    assert!(Opt::try_parse_from(["loggeo"]).is_err());
    assert!(Opt::try_parse_from(["loggeo", "logs"]).is_err());
}
