//! Dependency tests between an explanatory variable and a target
//!
//! Numeric variables are tested with Pearson correlation, categorical
//! variables with a one-way ANOVA of the target across their values.

use std::collections::BTreeMap;

use polars::prelude::*;

use super::columns::{
    column_kind, f64_values, numeric_columns, paired_values, require_column, string_values,
    ColumnKind,
};
use super::error::{Result, TabularError};
use super::stats::{one_way_anova, pearson};

/// Default confidence level for dependency tests
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Outcome of testing one variable against the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DependencyVerdict {
    pub dependent: bool,
    /// |r| for numeric variables, the F statistic for categorical ones
    pub strength: Option<f64>,
}

/// Significance threshold alpha = 1 - confidence.
fn significance(confidence: f64) -> Result<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(TabularError::invalid(format!(
            "confidence must be in (0, 1), got {}",
            confidence
        )));
    }
    Ok(1.0 - confidence)
}

/// Correlation-based verdict for a numeric variable `x` against `y`.
///
/// Rows where either value is missing are ignored. Degenerate input
/// (fewer than two complete pairs, a constant series) is reported as a
/// `Computation` error.
pub fn numeric_verdict(x: &Series, y: &Series, confidence: f64) -> Result<DependencyVerdict> {
    let alpha = significance(confidence)?;
    let (xs, ys) = paired_values(x, y)?;
    let result = pearson(&xs, &ys).map_err(|e| match e {
        TabularError::Computation(msg) => {
            TabularError::computation(format!("'{}' vs '{}': {}", x.name(), y.name(), msg))
        }
        other => other,
    })?;

    Ok(DependencyVerdict {
        dependent: result.p_value < alpha,
        strength: Some(result.r.abs()),
    })
}

/// Whether `y` depends on numeric variable `x` at the given confidence.
pub fn is_dependent(x: &Series, y: &Series, confidence: f64) -> Result<bool> {
    Ok(numeric_verdict(x, y, confidence)?.dependent)
}

/// Target values grouped by the distinct values of `x`, sorted by key.
///
/// Rows with a missing key or a missing target are left out.
pub fn values_by_group(x: &Series, y: &Series) -> Result<Vec<(String, Vec<f64>)>> {
    if x.len() != y.len() {
        return Err(TabularError::invalid(format!(
            "series '{}' and '{}' differ in length ({} vs {})",
            x.name(),
            y.name(),
            x.len(),
            y.len()
        )));
    }

    let keys = string_values(x)?;
    let values = f64_values(y)?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (key, value) in keys.into_iter().zip(values) {
        if let (Some(k), Some(v)) = (key, value) {
            groups.entry(k).or_default().push(v);
        }
    }

    Ok(groups.into_iter().collect())
}

/// ANOVA-based verdict for a categorical variable `x` against numeric `y`.
///
/// Fewer than two groups with a non-missing target cannot be tested and
/// yield `strength = 0, dependent = false`.
pub fn categorical_verdict(x: &Series, y: &Series, confidence: f64) -> Result<DependencyVerdict> {
    let alpha = significance(confidence)?;

    let groups = values_by_group(x, y)?;
    if groups.len() <= 1 {
        return Ok(DependencyVerdict {
            dependent: false,
            strength: Some(0.0),
        });
    }

    let slices: Vec<&[f64]> = groups.iter().map(|(_, v)| v.as_slice()).collect();
    let anova = one_way_anova(&slices).map_err(|e| match e {
        TabularError::Computation(msg) => {
            TabularError::computation(format!("'{}' vs '{}': {}", x.name(), y.name(), msg))
        }
        other => other,
    })?;

    Ok(DependencyVerdict {
        dependent: anova.p_value < alpha,
        strength: Some(anova.f_statistic),
    })
}

/// Whether categorical `x` influences `y`; returns `(F statistic, dependent)`.
pub fn is_dependent_categorical(x: &Series, y: &Series, confidence: f64) -> Result<(f64, bool)> {
    let verdict = categorical_verdict(x, y, confidence)?;
    Ok((verdict.strength.unwrap_or(0.0), verdict.dependent))
}

/// Dependency flag of every numeric column (except `y`) against `y`, in
/// dataset order.
pub fn check_dependency(df: &DataFrame, y: &str, confidence: f64) -> Result<Vec<(String, bool)>> {
    let target = require_column(df, y)?;
    if column_kind(target.dtype()) != ColumnKind::Numeric {
        return Err(TabularError::invalid(format!(
            "target column '{}' must be numeric, found {}",
            y,
            target.dtype()
        )));
    }
    let target = target.as_materialized_series();

    numeric_columns(df)
        .into_iter()
        .filter(|name| name != y)
        .map(|name| -> Result<(String, bool)> {
            let x = df.column(&name)?.as_materialized_series();
            let dependent = is_dependent(x, target, confidence)?;
            Ok((name, dependent))
        })
        .collect()
}
