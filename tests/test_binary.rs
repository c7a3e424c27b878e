//! End-to-end tests running the tabsift binary

#[path = "common/mod.rs"]
mod common;

use assert_cmd::Command;
use common::{assert_shape, column_names, create_dependency_dataframe, create_temp_csv};
use polars::prelude::*;
use predicates::prelude::*;

fn read_csv(path: &std::path::Path) -> DataFrame {
    CsvReadOptions::default()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .unwrap()
        .finish()
        .unwrap()
}

#[test]
fn test_select_writes_features_and_target() {
    let mut df = create_dependency_dataframe();
    let (dir, csv_path) = create_temp_csv(&mut df);
    let report_path = dir.path().join("report.json");

    Command::cargo_bin("tabsift")
        .unwrap()
        .args(["--no-banner", "select", "-i"])
        .arg(&csv_path)
        .args(["-t", "price", "--k-categorical", "1", "--report"])
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("SELECTION SUMMARY"));

    let output = read_csv(&dir.path().join("test_data_selected.csv"));
    assert_eq!(
        column_names(&output),
        vec!["area", "rooms", "color_blue", "color_green", "color_red", "price"]
    );
    assert_shape(&output, 12, 6);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["metadata"]["target_column"], "price");
    assert_eq!(report["categorical_features"][0]["name"], "color");
}

#[test]
fn test_select_with_split_writes_two_files() {
    let mut df = create_dependency_dataframe();
    let (dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("tabsift")
        .unwrap()
        .args(["--no-banner", "select", "-i"])
        .arg(&csv_path)
        .args(["-t", "price", "--test-size", "0.25", "--seed", "3"])
        .assert()
        .success();

    let train = read_csv(&dir.path().join("test_data_train.csv"));
    let test = read_csv(&dir.path().join("test_data_test.csv"));
    assert_eq!(train.height(), 9);
    assert_eq!(test.height(), 3);
}

#[test]
fn test_rank_prints_tables() {
    let mut df = create_dependency_dataframe();
    let (_dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("tabsift")
        .unwrap()
        .args(["--no-banner", "rank", "-i"])
        .arg(&csv_path)
        .args(["-t", "price"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NUMERIC DEPENDENCIES"))
        .stdout(predicate::str::contains("area"))
        .stdout(predicate::str::contains("color"));
}

#[test]
fn test_unknown_target_fails() {
    let mut df = create_dependency_dataframe();
    let (_dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("tabsift")
        .unwrap()
        .args(["--no-banner", "rank", "-i"])
        .arg(&csv_path)
        .args(["-t", "salary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("salary"));
}

#[test]
fn test_unsupported_extension_fails() {
    Command::cargo_bin("tabsift")
        .unwrap()
        .args(["--no-banner", "symmetry", "-i", "data.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}
