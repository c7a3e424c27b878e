//! Subcommand implementations

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;

use super::args::SelectArgs;
use crate::pipeline::{
    check_symmetry, load_dataset, rank_categorical_influence, rank_dependencies, save_dataset,
    select_features_with_choice, FeatureCount, FeatureSet, Selection, SortOrder,
    DEFAULT_CONFIDENCE,
};
use crate::report::{
    display_categorical_ranking, display_numeric_ranking, display_symmetry,
    export_selection_report, ReportParams, ReportSummary, SelectionReport, SelectionSummary,
};
use crate::utils::{
    create_spinner, finish_with_failure, finish_with_success, print_completion, print_config,
    print_dataset_stats, print_info, print_step_header, print_step_time, print_success,
};

fn load_with_stats(input: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let df = match load_dataset(input, infer_schema_length) {
        Ok(df) => df,
        Err(e) => {
            finish_with_failure(&spinner, "Failed to load dataset");
            return Err(e);
        }
    };
    finish_with_success(&spinner, "Dataset loaded");

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    print_dataset_stats(rows, cols, memory_mb);
    print_step_time(start.elapsed());
    Ok(df)
}

/// `tabsift symmetry`
pub fn run_symmetry(input: &Path, tolerance: f64, infer_schema_length: usize) -> Result<()> {
    print_config(input, None, None, &[("Tolerance", format!("{}", tolerance))]);

    print_step_header(1, "Load Dataset");
    let df = load_with_stats(input, infer_schema_length)?;

    print_step_header(2, "Symmetry Check");
    let checks = check_symmetry(&df, tolerance).context("Symmetry check failed")?;
    if checks.is_empty() {
        print_info("No numeric columns found");
    } else {
        display_symmetry(&checks, tolerance);
    }

    print_completion("Symmetry check complete!");
    Ok(())
}

/// `tabsift rank`
pub fn run_rank(
    input: &Path,
    target: &str,
    confidence: f64,
    ascending: bool,
    infer_schema_length: usize,
) -> Result<()> {
    let order = if ascending {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };
    print_config(
        input,
        Some(target),
        None,
        &[
            ("Confidence", format!("{}", confidence)),
            ("Order", format!("{:?}", order).to_lowercase()),
        ],
    );

    print_step_header(1, "Load Dataset");
    let df = load_with_stats(input, infer_schema_length)?;

    print_step_header(2, "Dependency Ranking");
    let start = Instant::now();
    let spinner = create_spinner("Testing variables...");
    let ranked = rank_dependencies(&df, target, confidence, order)
        .and_then(|numeric| {
            rank_categorical_influence(&df, None, target, FeatureCount::All, confidence)
                .map(|categorical| (numeric, categorical))
        });
    let (numeric, mut categorical) = match ranked {
        Ok(ranked) => ranked,
        Err(e) => {
            finish_with_failure(&spinner, "Dependency ranking failed");
            return Err(e).context("Dependency ranking failed");
        }
    };
    finish_with_success(&spinner, "Dependency tests complete");
    print_step_time(start.elapsed());

    if ascending {
        categorical.reverse();
    }
    display_numeric_ranking(&numeric);
    display_categorical_ranking(&categorical);

    print_completion("Ranking complete!");
    Ok(())
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// `tabsift select`
pub fn run_select(args: &SelectArgs) -> Result<()> {
    let options = args.selection_options();
    let output_display = match options.split {
        Some(_) => args.split_paths().0,
        None => args.output_path(),
    };
    print_config(
        &args.input,
        Some(args.target.as_str()),
        Some(output_display.as_path()),
        &[
            ("Numeric features", args.k_numerical.to_string()),
            ("Categorical features", args.k_categorical.to_string()),
            ("One-hot", (!args.no_one_hot).to_string()),
            (
                "Test size",
                args.test_size.map_or("none".to_string(), |t| t.to_string()),
            ),
        ],
    );

    print_step_header(1, "Load Dataset");
    let df = load_with_stats(&args.input, args.infer_schema_length)?;
    let mut summary = SelectionSummary::new(df.width());
    summary.excluded = args.exclude.len();

    print_step_header(2, "Feature Selection");
    let start = Instant::now();
    let spinner = create_spinner("Ranking variables...");
    let (choice, selection) = match select_features_with_choice(&df, &args.target, &options) {
        Ok(result) => result,
        Err(e) => {
            finish_with_failure(&spinner, "Feature selection failed");
            return Err(e).context("Feature selection failed");
        }
    };
    finish_with_success(&spinner, "Features selected");
    print_step_time(start.elapsed());

    summary.numeric_selected = choice.numeric.iter().map(|f| f.name.clone()).collect();
    summary.categorical_selected = choice.categorical_names();

    print_step_header(3, "Save Results");
    let start = Instant::now();
    let (outputs, feature_columns) = match selection {
        Selection::Full(set) => {
            let path = args.output_path();
            let feature_columns = column_names(&set.x);
            write_feature_set(set, &path)?;
            (vec![path], feature_columns)
        }
        Selection::Split { train, test } => {
            let (train_path, test_path) = args.split_paths();
            let feature_columns = column_names(&train.x);
            summary.train_rows = Some(train.y.len());
            summary.test_rows = Some(test.y.len());
            write_feature_set(train, &train_path)?;
            write_feature_set(test, &test_path)?;
            (vec![train_path, test_path], feature_columns)
        }
    };
    summary.final_features = feature_columns.len();
    print_step_time(start.elapsed());

    if let Some(report_path) = &args.report {
        let output_refs: Vec<&Path> = outputs.iter().map(PathBuf::as_path).collect();
        let params = ReportParams {
            input_file: &args.input,
            output_files: &output_refs,
            target_column: &args.target,
            options: &options,
            confidence: DEFAULT_CONFIDENCE,
        };
        let report_summary = ReportSummary {
            initial_columns: summary.initial_columns,
            final_features: summary.final_features,
            rows: df.height(),
            train_rows: summary.train_rows,
            test_rows: summary.test_rows,
        };
        let report = SelectionReport::new(&params, &choice, feature_columns, report_summary);
        export_selection_report(&report, report_path)?;
        print_success(&format!("Report written to {}", report_path.display()));
    }

    summary.display();
    print_completion("Feature selection complete!");
    Ok(())
}

/// Write `X` with the target appended as the last column.
fn write_feature_set(set: FeatureSet, path: &Path) -> Result<()> {
    let spinner = create_spinner("Writing output file...");
    let FeatureSet { mut x, y } = set;
    if x.width() == 0 {
        x = DataFrame::new(vec![y.into()])?;
    } else {
        x.with_column(y)
            .with_context(|| format!("Failed to append target column for {}", path.display()))?;
    }
    save_dataset(&mut x, path)?;
    finish_with_success(&spinner, &format!("Saved to {}", path.display()));
    Ok(())
}
