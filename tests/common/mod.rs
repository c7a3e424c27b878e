//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a small dataset with known dependency structure
///
/// This DataFrame includes:
/// - `price`: Numeric target
/// - `area`: Exactly `2 * price` (ρ = 1)
/// - `rooms`: Moderately correlated with price (r ≈ 0.64, p ≈ 0.025)
/// - `noise`: Unrelated to price (r ≈ -0.17, p ≈ 0.6)
/// - `color`: Three groups with clearly different price means (F = 240)
/// - `size`: Two groups with nearly equal means (F ≈ 0.15)
/// - `shape`: A single category
pub fn create_dependency_dataframe() -> DataFrame {
    df! {
        "price" => [10.0f64, 12.0, 11.0, 13.0, 20.0, 22.0, 21.0, 23.0, 30.0, 32.0, 31.0, 33.0],
        "area" => [20.0f64, 24.0, 22.0, 26.0, 40.0, 44.0, 42.0, 46.0, 60.0, 64.0, 62.0, 66.0],
        "rooms" => [3i64, 9, 1, 7, 6, 14, 10, 4, 12, 8, 15, 11],
        "noise" => [5.0f64, 1.0, 8.0, 2.0, 9.0, 3.0, 7.0, 4.0, 6.0, 0.0, 5.0, 3.0],
        "color" => ["red", "red", "red", "red", "green", "green", "green", "green", "blue", "blue", "blue", "blue"],
        "size" => ["s", "l", "s", "l", "s", "l", "s", "l", "s", "l", "s", "l"],
        "shape" => ["square"; 12],
    }
    .unwrap()
}

/// Create a larger dataset with a random target for split and stress tests
pub fn create_large_test_dataframe(rows: usize, cols: usize) -> DataFrame {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let mut columns: Vec<Column> = Vec::with_capacity(cols + 1);

    let target: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>() * 100.0).collect();

    for i in 0..cols {
        // Even features follow the target, odd ones are noise
        let values: Vec<f64> = if i % 2 == 0 {
            target.iter().map(|t| t + rng.gen::<f64>()).collect()
        } else {
            (0..rows).map(|_| rng.gen::<f64>()).collect()
        };
        columns.push(Column::new(format!("feature_{}", i).into(), values));
    }
    columns.push(Column::new("target".into(), target));

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Column names of a DataFrame, in order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols = column_names(df);
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols = column_names(df);
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
