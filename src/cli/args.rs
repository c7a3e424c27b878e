//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{SelectFeaturesOptions, SplitOptions, DEFAULT_CONFIDENCE};

/// tabsift - Statistical dependency tests and feature selection for tabular data
#[derive(Parser, Debug)]
#[command(name = "tabsift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Do not print the banner
    #[arg(long, global = true, default_value = "false")]
    pub no_banner: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report the skewness of every numeric column and whether it is symmetric
    Symmetry {
        /// Input file path (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Largest absolute skewness still considered symmetric
        #[arg(long, default_value = "1.0", value_parser = validate_tolerance)]
        tolerance: f64,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Rank numeric and categorical variables by their influence on the target
    Rank {
        /// Input file path (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Numeric target column
        #[arg(short, long)]
        target: String,

        /// Confidence level of the dependency tests, strictly between 0 and 1
        #[arg(long, default_value = "0.95", value_parser = validate_confidence)]
        confidence: f64,

        /// List the weakest dependencies first
        #[arg(long, default_value = "false")]
        ascending: bool,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Select the best features for the target and write them to a file
    Select(SelectArgs),
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Numeric target column
    #[arg(short, long)]
    pub target: String,

    /// Number of numeric features to keep (-1 keeps every dependent one)
    #[arg(long, default_value = "3", allow_negative_numbers = true)]
    pub k_numerical: i64,

    /// Number of categorical features to keep (-1 keeps every dependent one)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub k_categorical: i64,

    /// Columns to ignore (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Keep categorical features as they are instead of one-hot encoding them
    #[arg(long, default_value = "false")]
    pub no_one_hot: bool,

    /// Fraction of rows to hold out as a test set, strictly between 0 and 1.
    /// When set, separate train and test files are written.
    #[arg(long, value_parser = validate_test_size)]
    pub test_size: Option<f64>,

    /// Random seed for the train/test split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file path (CSV or Parquet, determined by extension).
    /// Defaults to input directory with '_selected' suffix (e.g., data.csv → data_selected.csv);
    /// split runs use '_train' and '_test' suffixes instead.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a JSON selection report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl SelectArgs {
    /// Output path of a run without split, deriving from input if not
    /// explicitly provided.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling_path(&self.input, "selected"))
    }

    /// Train and test output paths of a split run. An explicit output path
    /// is used as the base name.
    pub fn split_paths(&self) -> (PathBuf, PathBuf) {
        let base = self.output.as_deref().unwrap_or(&self.input);
        (sibling_path(base, "train"), sibling_path(base, "test"))
    }

    /// Library options equivalent to these arguments.
    pub fn selection_options(&self) -> SelectFeaturesOptions {
        SelectFeaturesOptions {
            k_numerical: self.k_numerical.into(),
            k_categorical: self.k_categorical.into(),
            exclude: self.exclude.clone(),
            one_hot: !self.no_one_hot,
            split: self.test_size.map(|test_size| SplitOptions {
                test_size,
                seed: self.seed,
            }),
        }
    }
}

/// `<dir>/<stem>_<suffix>.<ext>` next to `path`.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("parquet");
    parent.join(format!("{}_{}.{}", stem, suffix, extension))
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse()
        .map_err(|_| format!("'{}' is not a valid number", s))
}

/// Validator for the confidence level
fn validate_confidence(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "confidence must be strictly between 0.0 and 1.0 (e.g. {}), got {}",
            DEFAULT_CONFIDENCE, value
        ))
    }
}

/// Validator for the test set fraction
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}

/// Validator for the symmetry tolerance
fn validate_tolerance(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("tolerance must be a positive number, got {}", value))
    }
}
