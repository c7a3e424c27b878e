//! Dependency ranking of numeric and categorical variables

use polars::prelude::*;
use tracing::debug;

use super::columns::{
    categorical_columns, column_kind, numeric_columns, require_column, string_values, ColumnKind,
};
use super::dependency::{categorical_verdict, numeric_verdict, DEFAULT_CONFIDENCE};
use super::error::{Result, TabularError};

const MEAN_ALIAS: &str = "__tabsift_mean";
const COUNT_ALIAS: &str = "__tabsift_count";

/// Sort direction for rankings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Strongest first
    #[default]
    Descending,
    Ascending,
}

/// How many ranked variables to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureCount {
    /// Keep every dependent variable
    All,
    /// Keep at most this many
    Top(usize),
}

impl FeatureCount {
    /// Truncate a ranking to this count.
    pub fn truncate<T>(self, mut ranked: Vec<T>) -> Vec<T> {
        if let FeatureCount::Top(k) = self {
            ranked.truncate(k);
        }
        ranked
    }
}

/// Negative counts mean "all", as in `k = -1`.
impl From<i64> for FeatureCount {
    fn from(k: i64) -> Self {
        if k < 0 {
            FeatureCount::All
        } else {
            FeatureCount::Top(k as usize)
        }
    }
}

/// A dependent numeric variable with its ranking strength (|r|)
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    pub name: String,
    pub strength: f64,
}

/// A dependent categorical variable with its F statistic
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalInfluence {
    pub name: String,
    pub f_statistic: f64,
}

fn require_numeric_target<'a>(df: &'a DataFrame, y: &str) -> Result<&'a Series> {
    let target = require_column(df, y)?;
    if column_kind(target.dtype()) != ColumnKind::Numeric {
        return Err(TabularError::invalid(format!(
            "target column '{}' must be numeric, found {}",
            y,
            target.dtype()
        )));
    }
    Ok(target.as_materialized_series())
}

/// Rank numeric variables that `y` depends on by absolute correlation.
///
/// Only variables judged dependent at `confidence` are returned. Equal
/// strengths keep dataset column order.
pub fn rank_dependencies(
    df: &DataFrame,
    y: &str,
    confidence: f64,
    order: SortOrder,
) -> Result<Vec<RankedFeature>> {
    let target = require_numeric_target(df, y)?;

    let mut ranked = Vec::new();
    for name in numeric_columns(df).into_iter().filter(|name| name != y) {
        let x = df.column(&name)?.as_materialized_series();
        let verdict = numeric_verdict(x, target, confidence)?;
        debug!(feature = %name, dependent = verdict.dependent, strength = ?verdict.strength, "numeric dependency test");
        if verdict.dependent {
            ranked.push(RankedFeature {
                name,
                strength: verdict.strength.unwrap_or(0.0),
            });
        }
    }

    ranked.sort_by(|a, b| {
        let ord = a
            .strength
            .partial_cmp(&b.strength)
            .unwrap_or(std::cmp::Ordering::Equal);
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });

    Ok(ranked)
}

/// Names of dependent numeric variables ranked at the default confidence.
pub fn dependency_ranking(df: &DataFrame, y: &str, order: SortOrder) -> Result<Vec<String>> {
    Ok(rank_dependencies(df, y, DEFAULT_CONFIDENCE, order)?
        .into_iter()
        .map(|f| f.name)
        .collect())
}

/// Rank categorical variables by their influence on `y` (F statistic,
/// strongest first) and keep at most `k`.
///
/// `candidates` restricts the search to the given columns; `None` tests
/// every categorical column. The target itself is never a candidate.
/// A candidate whose ANOVA cannot be computed is not dependent.
pub fn rank_categorical_influence(
    df: &DataFrame,
    candidates: Option<&[&str]>,
    y: &str,
    k: FeatureCount,
    confidence: f64,
) -> Result<Vec<CategoricalInfluence>> {
    let target = require_numeric_target(df, y)?;

    let names: Vec<String> = match candidates {
        Some(names) => {
            for name in names {
                require_column(df, name)?;
            }
            names.iter().map(|s| s.to_string()).collect()
        }
        None => categorical_columns(df),
    };
    if k == FeatureCount::Top(0) {
        return Ok(Vec::new());
    }

    let mut influences = Vec::new();
    for name in names.into_iter().filter(|name| name != y) {
        let x = df.column(&name)?.as_materialized_series();
        let verdict = match categorical_verdict(x, target, confidence) {
            Ok(verdict) => verdict,
            Err(TabularError::Computation(reason)) => {
                debug!(
                    feature = %name,
                    %reason,
                    "categorical test not computable, treated as independent"
                );
                continue;
            }
            Err(e) => return Err(e),
        };
        debug!(feature = %name, dependent = verdict.dependent, f = ?verdict.strength, "categorical dependency test");
        if verdict.dependent {
            influences.push(CategoricalInfluence {
                name,
                f_statistic: verdict.strength.unwrap_or(0.0),
            });
        }
    }

    influences.sort_by(|a, b| {
        b.f_statistic
            .partial_cmp(&a.f_statistic)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(k.truncate(influences))
}

/// Names of the `k` most influential categorical variables at the default
/// confidence.
pub fn k_best_categorical_vars(df: &DataFrame, y: &str, k: FeatureCount) -> Result<Vec<String>> {
    Ok(
        rank_categorical_influence(df, None, y, k, DEFAULT_CONFIDENCE)?
            .into_iter()
            .map(|c| c.name)
            .collect(),
    )
}

/// Mean of the target within one combination of categorical values
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    /// One value per grouping column, in the order the columns were given
    pub key: Vec<Option<String>>,
    pub mean: f64,
    /// Number of non-missing target values in the group
    pub count: usize,
}

/// Rank value combinations of `xs` by the mean of `y` within each group.
///
/// Groups with fewer than `min_freq` non-missing target values are
/// dropped.
pub fn categorical_dependency_ranking(
    df: &DataFrame,
    xs: &[&str],
    y: &str,
    min_freq: usize,
    order: SortOrder,
) -> Result<Vec<GroupMean>> {
    if xs.is_empty() {
        return Err(TabularError::invalid("at least one grouping column is required"));
    }
    for name in xs {
        require_column(df, name)?;
    }
    require_numeric_target(df, y)?;

    let grouped = df
        .clone()
        .lazy()
        .group_by(xs.iter().map(|name| col(*name)).collect::<Vec<_>>())
        .agg([
            col(y).cast(DataType::Float64).mean().alias(MEAN_ALIAS),
            col(y).count().alias(COUNT_ALIAS),
        ])
        .filter(
            col(COUNT_ALIAS)
                .gt_eq(lit(min_freq as u64))
                .and(col(MEAN_ALIAS).is_not_null()),
        )
        .collect()?;

    let means = grouped.column(MEAN_ALIAS)?.f64()?.clone();
    let counts = grouped.column(COUNT_ALIAS)?.cast(&DataType::UInt64)?;
    let counts = counts.u64()?;
    let keys: Vec<Vec<Option<String>>> = xs
        .iter()
        .map(|name| -> Result<Vec<Option<String>>> {
            string_values(grouped.column(name)?.as_materialized_series())
        })
        .collect::<Result<_>>()?;

    let mut ranking: Vec<GroupMean> = (0..grouped.height())
        .filter_map(|row| {
            let mean = means.get(row)?;
            Some(GroupMean {
                key: keys.iter().map(|values| values[row].clone()).collect(),
                mean,
                count: counts.get(row).unwrap_or(0) as usize,
            })
        })
        .collect();

    // group_by output order is unspecified; sort keys first for stable ties
    ranking.sort_by(|a, b| a.key.cmp(&b.key));
    ranking.sort_by(|a, b| {
        let ord = a.mean.partial_cmp(&b.mean).unwrap_or(std::cmp::Ordering::Equal);
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });

    Ok(ranking)
}
