//! Outlier trimming with interquartile-range or z-score bounds

use std::collections::BTreeMap;
use std::fmt;

use polars::prelude::*;
use tracing::info;

use super::columns::{column_kind, f64_values, require_column, string_values, ColumnKind};
use super::error::{Result, TabularError};
use super::stats::{mean_std, percentile};

/// Rule used to derive the accepted value range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutlierMethod {
    /// `[Q1 - w·IQR, Q3 + w·IQR]`
    #[default]
    Iqr,
    /// `mean ± w·std`
    ZScore,
}

impl OutlierMethod {
    pub fn default_width(self) -> f64 {
        match self {
            OutlierMethod::Iqr => 1.5,
            OutlierMethod::ZScore => 2.5,
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlierMethod::Iqr => write!(f, "iqr"),
            OutlierMethod::ZScore => write!(f, "z-score"),
        }
    }
}

/// Accepted range and removal count of one group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBounds {
    /// Separating value, `None` for the whole column or a missing key
    pub group: Option<String>,
    pub lower: f64,
    pub upper: f64,
    pub removed: usize,
}

/// Summary of an outlier trimming run
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    pub column: String,
    pub method: OutlierMethod,
    pub width: f64,
    pub groups: Vec<GroupBounds>,
    pub removed: usize,
    pub remaining: usize,
}

impl OutlierReport {
    /// Removed rows as a percentage of the remaining rows.
    pub fn removed_pct(&self) -> f64 {
        if self.remaining == 0 {
            0.0
        } else {
            self.removed as f64 / self.remaining as f64 * 100.0
        }
    }
}

fn bounds(values: &mut [f64], method: OutlierMethod, width: f64) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    match method {
        OutlierMethod::Iqr => {
            values.sort_by(|a, b| a.total_cmp(b));
            let q1 = percentile(values, 25.0)?;
            let q3 = percentile(values, 75.0)?;
            let iqr = q3 - q1;
            Some((q1 - width * iqr, q3 + width * iqr))
        }
        OutlierMethod::ZScore => {
            let (mean, std) = mean_std(values)?;
            Some((mean - width * std, mean + width * std))
        }
    }
}

/// Drop rows whose `by` value lies outside the accepted range.
///
/// Bounds are computed over the whole column, or separately for each value
/// of `separating`, in which case every row is judged against its own
/// group. Missing values are never outliers. `width` defaults to 1.5 for
/// [`OutlierMethod::Iqr`] and 2.5 for [`OutlierMethod::ZScore`].
pub fn remove_outliers(
    df: DataFrame,
    by: &str,
    method: OutlierMethod,
    separating: Option<&str>,
    width: Option<f64>,
) -> Result<DataFrame> {
    Ok(remove_outliers_with_report(df, by, method, separating, width)?.0)
}

/// [`remove_outliers`] that also returns the per-group bounds.
pub fn remove_outliers_with_report(
    df: DataFrame,
    by: &str,
    method: OutlierMethod,
    separating: Option<&str>,
    width: Option<f64>,
) -> Result<(DataFrame, OutlierReport)> {
    let width = width.unwrap_or_else(|| method.default_width());
    if !(width.is_finite() && width >= 0.0) {
        return Err(TabularError::invalid(format!(
            "outlier width must be a non-negative number, got {}",
            width
        )));
    }

    let column = require_column(&df, by)?;
    if column_kind(column.dtype()) != ColumnKind::Numeric {
        return Err(TabularError::invalid(format!(
            "column '{}' must be numeric to remove outliers, found {}",
            by,
            column.dtype()
        )));
    }
    let values = f64_values(column.as_materialized_series())?;
    let keys: Vec<Option<String>> = match separating {
        Some(name) => string_values(require_column(&df, name)?.as_materialized_series())?,
        None => vec![None; values.len()],
    };

    let mut grouped: BTreeMap<&Option<String>, Vec<f64>> = BTreeMap::new();
    for (key, value) in keys.iter().zip(&values) {
        let entry = grouped.entry(key).or_default();
        if let Some(v) = value {
            entry.push(*v);
        }
    }

    let mut group_bounds: BTreeMap<&Option<String>, GroupBounds> = BTreeMap::new();
    for (key, mut group_values) in grouped {
        if let Some((lower, upper)) = bounds(&mut group_values, method, width) {
            group_bounds.insert(
                key,
                GroupBounds {
                    group: key.clone(),
                    lower,
                    upper,
                    removed: 0,
                },
            );
        }
    }

    let mut keep = Vec::with_capacity(values.len());
    for (key, value) in keys.iter().zip(&values) {
        let outlier = match (value, group_bounds.get_mut(key)) {
            (Some(v), Some(b)) if *v < b.lower || *v > b.upper => {
                b.removed += 1;
                true
            }
            _ => false,
        };
        keep.push(!outlier);
    }

    let mask: BooleanChunked = keep.into_iter().collect();
    let trimmed = df.filter(&mask)?;

    let groups: Vec<GroupBounds> = group_bounds.into_values().collect();
    for g in &groups {
        info!(
            group = g.group.as_deref().unwrap_or("<all>"),
            lower = g.lower,
            upper = g.upper,
            removed = g.removed,
            "{:.2} < {} < {:.2}",
            g.lower,
            by,
            g.upper
        );
    }

    let report = OutlierReport {
        column: by.to_string(),
        method,
        width,
        removed: groups.iter().map(|g| g.removed).sum(),
        remaining: trimmed.height(),
        groups,
    };
    info!(
        column = by,
        method = %method,
        removed = report.removed,
        remaining = report.remaining,
        "{}/{} = {:.2}% of the samples are removed",
        report.removed,
        report.remaining,
        report.removed_pct()
    );

    Ok((trimmed, report))
}
