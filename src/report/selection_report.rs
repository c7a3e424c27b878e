//! JSON export of feature selection results

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{FeatureChoice, FeatureCount, SelectFeaturesOptions};

/// Settings the selection ran with
#[derive(Debug, Clone, Serialize)]
pub struct SelectionSettings {
    /// `null` keeps every dependent variable
    pub k_numerical: Option<usize>,
    pub k_categorical: Option<usize>,
    pub one_hot: bool,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    pub tabsift_version: String,
    pub input_file: String,
    pub output_files: Vec<String>,
    pub target_column: String,
    pub settings: SelectionSettings,
}

/// A selected numeric variable
#[derive(Debug, Clone, Serialize)]
pub struct NumericEntry {
    pub name: String,
    pub abs_correlation: f64,
}

/// A selected categorical variable. Infinite F statistics serialize as
/// `null`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoricalEntry {
    pub name: String,
    pub f_statistic: f64,
}

/// Row and column counts of the written data
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub initial_columns: usize,
    pub final_features: usize,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_rows: Option<usize>,
}

/// Complete selection report
#[derive(Debug, Clone, Serialize)]
pub struct SelectionReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub numeric_features: Vec<NumericEntry>,
    pub categorical_features: Vec<CategoricalEntry>,
    /// Final feature matrix columns, after one-hot expansion
    pub feature_columns: Vec<String>,
}

/// Parameters for building a [`SelectionReport`]
pub struct ReportParams<'a> {
    pub input_file: &'a Path,
    pub output_files: &'a [&'a Path],
    pub target_column: &'a str,
    pub options: &'a SelectFeaturesOptions,
    pub confidence: f64,
}

fn count_limit(count: FeatureCount) -> Option<usize> {
    match count {
        FeatureCount::All => None,
        FeatureCount::Top(k) => Some(k),
    }
}

impl SelectionReport {
    pub fn new(
        params: &ReportParams,
        choice: &FeatureChoice,
        feature_columns: Vec<String>,
        summary: ReportSummary,
    ) -> Self {
        let options = params.options;
        let metadata = ReportMetadata {
            timestamp: Utc::now().to_rfc3339(),
            tabsift_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.display().to_string(),
            output_files: params
                .output_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            target_column: params.target_column.to_string(),
            settings: SelectionSettings {
                k_numerical: count_limit(options.k_numerical),
                k_categorical: count_limit(options.k_categorical),
                one_hot: options.one_hot,
                confidence: params.confidence,
                exclude: options.exclude.clone(),
                test_size: options.split.map(|s| s.test_size),
                seed: options.split.and_then(|s| s.seed),
            },
        };

        Self {
            metadata,
            summary,
            numeric_features: choice
                .numeric
                .iter()
                .map(|f| NumericEntry {
                    name: f.name.clone(),
                    abs_correlation: f.strength,
                })
                .collect(),
            categorical_features: choice
                .categorical
                .iter()
                .map(|c| CategoricalEntry {
                    name: c.name.clone(),
                    f_statistic: c.f_statistic,
                })
                .collect(),
            feature_columns,
        }
    }
}

/// Export the selection report to a JSON file
pub fn export_selection_report(report: &SelectionReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize selection report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write selection report to {}", output_path.display()))?;

    Ok(())
}
