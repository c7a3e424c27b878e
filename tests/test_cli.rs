//! Tests for CLI argument parsing

use clap::Parser;
use std::path::PathBuf;
use tabsift::cli::{Cli, Commands, SelectArgs};
use tabsift::pipeline::FeatureCount;

fn parse_select(args: &[&str]) -> SelectArgs {
    let cli = Cli::parse_from(
        ["tabsift", "select"]
            .iter()
            .chain(args.iter())
            .copied()
            .collect::<Vec<_>>(),
    );
    match cli.command {
        Commands::Select(args) => args,
        other => panic!("expected select, got {:?}", other),
    }
}

#[test]
fn test_select_default_values() {
    let args = parse_select(&["-i", "data.csv", "-t", "price"]);

    assert_eq!(args.k_numerical, 3, "Default numeric count should be 3");
    assert_eq!(args.k_categorical, 0, "Default categorical count should be 0");
    assert!(args.exclude.is_empty());
    assert!(!args.no_one_hot);
    assert!(args.test_size.is_none());
    assert!(args.seed.is_none());
    assert!(args.report.is_none());
    assert_eq!(
        args.infer_schema_length, 10000,
        "Default schema inference should be 10000"
    );
}

#[test]
fn test_select_options_mapping() {
    let args = parse_select(&[
        "-i",
        "data.csv",
        "-t",
        "price",
        "--k-numerical",
        "-1",
        "--k-categorical",
        "2",
        "--exclude",
        "id,timestamp",
        "--no-one-hot",
        "--test-size",
        "0.2",
        "--seed",
        "7",
    ]);

    let options = args.selection_options();
    assert_eq!(options.k_numerical, FeatureCount::All);
    assert_eq!(options.k_categorical, FeatureCount::Top(2));
    assert_eq!(options.exclude, vec!["id", "timestamp"]);
    assert!(!options.one_hot);
    let split = options.split.unwrap();
    assert_eq!(split.test_size, 0.2);
    assert_eq!(split.seed, Some(7));
}

#[test]
fn test_select_output_path_derivation() {
    let args = parse_select(&["-i", "/path/to/data.csv", "-t", "price"]);
    assert_eq!(args.output_path(), PathBuf::from("/path/to/data_selected.csv"));

    let args = parse_select(&["-i", "/path/to/data.parquet", "-t", "price"]);
    assert_eq!(
        args.output_path(),
        PathBuf::from("/path/to/data_selected.parquet")
    );
}

#[test]
fn test_select_explicit_output_path() {
    let args = parse_select(&["-i", "data.csv", "-t", "price", "-o", "custom.parquet"]);
    assert_eq!(args.output_path(), PathBuf::from("custom.parquet"));
}

#[test]
fn test_select_split_paths() {
    let args = parse_select(&["-i", "/data/jobs.csv", "-t", "price", "--test-size", "0.3"]);
    assert_eq!(
        args.split_paths(),
        (
            PathBuf::from("/data/jobs_train.csv"),
            PathBuf::from("/data/jobs_test.csv")
        )
    );

    let args = parse_select(&["-i", "jobs.csv", "-t", "price", "-o", "out/sel.parquet"]);
    assert_eq!(
        args.split_paths(),
        (
            PathBuf::from("out/sel_train.parquet"),
            PathBuf::from("out/sel_test.parquet")
        )
    );
}

#[test]
fn test_select_rejects_invalid_test_size() {
    for value in ["0", "1", "1.5", "abc"] {
        let result = Cli::try_parse_from([
            "tabsift",
            "select",
            "-i",
            "data.csv",
            "-t",
            "price",
            "--test-size",
            value,
        ]);
        assert!(result.is_err(), "test size {} should be rejected", value);
    }
}

#[test]
fn test_rank_defaults_and_confidence_validation() {
    let cli = Cli::parse_from(["tabsift", "rank", "-i", "data.csv", "-t", "price"]);
    match cli.command {
        Commands::Rank {
            confidence,
            ascending,
            ..
        } => {
            assert_eq!(confidence, 0.95);
            assert!(!ascending);
        }
        other => panic!("expected rank, got {:?}", other),
    }

    let result = Cli::try_parse_from([
        "tabsift",
        "rank",
        "-i",
        "data.csv",
        "-t",
        "price",
        "--confidence",
        "1.0",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_symmetry_default_tolerance() {
    let cli = Cli::parse_from(["tabsift", "symmetry", "-i", "data.csv"]);
    match cli.command {
        Commands::Symmetry { tolerance, .. } => assert_eq!(tolerance, 1.0),
        other => panic!("expected symmetry, got {:?}", other),
    }
}

#[test]
fn test_no_banner_is_global() {
    let cli = Cli::parse_from(["tabsift", "symmetry", "-i", "data.csv", "--no-banner"]);
    assert!(cli.no_banner);

    let cli = Cli::parse_from(["tabsift", "symmetry", "-i", "data.csv"]);
    assert!(!cli.no_banner);
}

#[test]
fn test_missing_subcommand_is_error() {
    assert!(Cli::try_parse_from(["tabsift"]).is_err());
}
