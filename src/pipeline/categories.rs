//! Categorical transforms: low-frequency handling, "other" relabelling and
//! nominal/ordinal typing

use std::collections::{HashMap, HashSet};

use polars::prelude::*;
use tracing::debug;

use super::columns::{column_kind, require_column, restore_categorical, string_values, ColumnKind};
use super::error::{Result, TabularError};

/// Label given to relabelled categories
pub const OTHER_LABEL: &str = "other";

/// What to do with rows whose category is rare
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LowFreqAction {
    /// Drop the rows
    #[default]
    Remove,
    /// Relabel the value as [`OTHER_LABEL`]
    AsOther,
}

fn require_categorical<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    let column = require_column(df, name)?;
    if column_kind(column.dtype()) != ColumnKind::Categorical {
        return Err(TabularError::invalid(format!(
            "column '{}' must be categorical to relabel values, found {}",
            name,
            column.dtype()
        )));
    }
    Ok(column)
}

/// Handle rows whose value of `by` occurs fewer than `min_freq` times.
///
/// With `separating`, frequencies are counted within each value of that
/// column. Rows with a missing `by` (or separating) value are never
/// considered rare.
pub fn handle_low_freq(
    df: DataFrame,
    by: &str,
    min_freq: usize,
    separating: Option<&str>,
    action: LowFreqAction,
) -> Result<DataFrame> {
    let keys = string_values(require_column(&df, by)?.as_materialized_series())?;
    let groups: Vec<Option<String>> = match separating {
        Some(name) => string_values(require_column(&df, name)?.as_materialized_series())?,
        None => vec![Some(String::new()); keys.len()],
    };

    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for (key, group) in keys.iter().zip(&groups) {
        if let (Some(k), Some(g)) = (key, group) {
            *counts.entry((k.as_str(), g.as_str())).or_default() += 1;
        }
    }

    let rare: Vec<bool> = keys
        .iter()
        .zip(&groups)
        .map(|(key, group)| match (key, group) {
            (Some(k), Some(g)) => counts
                .get(&(k.as_str(), g.as_str()))
                .is_some_and(|&count| count < min_freq),
            _ => false,
        })
        .collect();

    let rare_rows = rare.iter().filter(|&&r| r).count();
    debug!(column = by, min_freq, rare_rows, action = ?action, "low-frequency handling");

    match action {
        LowFreqAction::Remove => {
            let keep: BooleanChunked = rare.iter().map(|&r| !r).collect();
            Ok(df.filter(&keep)?)
        }
        LowFreqAction::AsOther => {
            let dtype = require_categorical(&df, by)?.dtype().clone();
            let relabelled: Vec<Option<String>> = keys
                .into_iter()
                .zip(&rare)
                .map(|(key, &r)| if r { Some(OTHER_LABEL.to_string()) } else { key })
                .collect();
            let mut df = df;
            df.with_column(restore_categorical(by, &dtype, relabelled)?)?;
            Ok(df)
        }
    }
}

/// Relabel the listed values of `by` as [`OTHER_LABEL`].
pub fn as_other(mut df: DataFrame, by: &str, categories: &[&str]) -> Result<DataFrame> {
    let column = require_categorical(&df, by)?;
    let dtype = column.dtype().clone();
    let targets: HashSet<&str> = categories.iter().copied().collect();

    let relabelled: Vec<Option<String>> = string_values(column.as_materialized_series())?
        .into_iter()
        .map(|value| match value {
            Some(v) if targets.contains(v.as_str()) => Some(OTHER_LABEL.to_string()),
            other => other,
        })
        .collect();

    df.with_column(restore_categorical(by, &dtype, relabelled)?)?;
    Ok(df)
}

fn enum_dtype(categories: &[&str]) -> Result<DataType> {
    let mut seen = HashSet::new();
    if let Some(duplicate) = categories.iter().find(|c| !seen.insert(**c)) {
        return Err(TabularError::invalid(format!(
            "category '{}' is listed more than once",
            duplicate
        )));
    }

    let values = StringChunked::from_iter_values("categories".into(), categories.iter().copied());
    let values = values.rechunk();
    let array = values
        .downcast_iter()
        .next()
        .cloned()
        .ok_or_else(|| TabularError::invalid("an ordinal column needs at least one category"))?;
    Ok(create_enum_dtype(array))
}

/// Type columns as categorical.
///
/// `None` gives a nominal `Categorical`. `Some(categories)` gives an
/// ordinal `Enum` ordered as listed; values outside the list become
/// missing.
pub fn to_categorical(mut df: DataFrame, columns: &[(&str, Option<&[&str]>)]) -> Result<DataFrame> {
    for &(name, categories) in columns {
        let values = string_values(require_column(&df, name)?.as_materialized_series())?;

        let typed = match categories {
            None => Series::new(name.into(), values)
                .cast(&DataType::Categorical(None, CategoricalOrdering::default()))?,
            Some(categories) => {
                let allowed: HashSet<&str> = categories.iter().copied().collect();
                let kept: Vec<Option<String>> = values
                    .into_iter()
                    .map(|v| v.filter(|s| allowed.contains(s.as_str())))
                    .collect();
                Series::new(name.into(), kept).cast(&enum_dtype(categories)?)?
            }
        };
        df.with_column(typed)?;
    }
    Ok(df)
}
