//! Skewness-based symmetry checks

use polars::prelude::*;
use tracing::debug;

use super::columns::{f64_values, numeric_columns};
use super::error::Result;
use super::stats::skewness;

/// Largest |skewness| still considered symmetric
pub const DEFAULT_SYMMETRY_TOLERANCE: f64 = 1.0;

/// Skewness verdict for one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryCheck {
    pub name: String,
    pub skewness: f64,
    pub symmetric: bool,
}

/// Whether |skewness| of the non-missing values is below `tolerance`.
pub fn is_symmetric(series: &Series, tolerance: f64) -> Result<bool> {
    Ok(series_skewness(series)?.abs() < tolerance)
}

fn series_skewness(series: &Series) -> Result<f64> {
    let values: Vec<f64> = f64_values(series)?.into_iter().flatten().collect();
    skewness(&values)
}

/// Symmetry of every numeric column, in dataset order.
pub fn check_symmetry(df: &DataFrame, tolerance: f64) -> Result<Vec<SymmetryCheck>> {
    numeric_columns(df)
        .into_iter()
        .map(|name| -> Result<SymmetryCheck> {
            let skew = series_skewness(df.column(&name)?.as_materialized_series())?;
            debug!(column = %name, skewness = skew, "symmetry check");
            Ok(SymmetryCheck {
                name,
                skewness: skew,
                symmetric: skew.abs() < tolerance,
            })
        })
        .collect()
}
