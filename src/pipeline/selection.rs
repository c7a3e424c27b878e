//! Feature selection: ranking-driven choice of columns, one-hot expansion,
//! train/test splitting and a fit/select lifecycle

use std::collections::{BTreeSet, HashMap, HashSet};

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use super::columns::{require_column, require_columns, string_values};
use super::dependency::DEFAULT_CONFIDENCE;
use super::error::{Result, TabularError};
use super::ranking::{
    rank_categorical_influence, rank_dependencies, CategoricalInfluence, FeatureCount,
    RankedFeature, SortOrder,
};

/// Feature matrix and target column
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub x: DataFrame,
    pub y: Series,
}

/// Output of [`select_features`]
#[derive(Debug, Clone)]
pub enum Selection {
    Full(FeatureSet),
    Split { train: FeatureSet, test: FeatureSet },
}

/// Train/test split settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOptions {
    /// Fraction of rows that go to the test set, in (0, 1)
    pub test_size: f64,
    /// Seed for the row permutation; fresh entropy when `None`
    pub seed: Option<u64>,
}

/// Options for the one-shot [`select_features`]
#[derive(Debug, Clone)]
pub struct SelectFeaturesOptions {
    pub k_numerical: FeatureCount,
    pub k_categorical: FeatureCount,
    /// Columns dropped before ranking
    pub exclude: Vec<String>,
    pub one_hot: bool,
    pub split: Option<SplitOptions>,
}

impl Default for SelectFeaturesOptions {
    fn default() -> Self {
        Self {
            k_numerical: FeatureCount::Top(3),
            k_categorical: FeatureCount::Top(0),
            exclude: Vec::new(),
            one_hot: true,
            split: None,
        }
    }
}

/// Ranked variables chosen for the feature matrix
#[derive(Debug, Clone, Default)]
pub struct FeatureChoice {
    pub numeric: Vec<RankedFeature>,
    pub categorical: Vec<CategoricalInfluence>,
}

impl FeatureChoice {
    /// Numeric names followed by categorical names.
    pub fn names(&self) -> Vec<String> {
        self.numeric
            .iter()
            .map(|f| f.name.clone())
            .chain(self.categorical.iter().map(|c| c.name.clone()))
            .collect()
    }

    pub fn categorical_names(&self) -> Vec<String> {
        self.categorical.iter().map(|c| c.name.clone()).collect()
    }
}

/// Rank numeric and categorical variables against `y` and keep the top
/// `k_numerical` and `k_categorical` of each. Uses the default confidence.
pub fn choose_features(
    df: &DataFrame,
    y: &str,
    k_numerical: FeatureCount,
    k_categorical: FeatureCount,
) -> Result<FeatureChoice> {
    let numeric = match k_numerical {
        FeatureCount::Top(0) => Vec::new(),
        k => k.truncate(rank_dependencies(
            df,
            y,
            DEFAULT_CONFIDENCE,
            SortOrder::Descending,
        )?),
    };
    let categorical = rank_categorical_influence(df, None, y, k_categorical, DEFAULT_CONFIDENCE)?;

    info!(
        target_column = y,
        numeric = numeric.len(),
        categorical = categorical.len(),
        "features chosen"
    );

    Ok(FeatureChoice {
        numeric,
        categorical,
    })
}

/// Expand categorical `columns` into `Int8` indicator columns.
///
/// Other columns keep their order; indicators are appended per source
/// column, one per distinct non-missing value in sorted order, named
/// `<column>_<value>`. Returns the new frame and the indicator names.
/// An indicator name already taken by another column is an
/// `InvalidArgument`.
pub fn one_hot_encode(df: &DataFrame, columns: &[String]) -> Result<(DataFrame, Vec<String>)> {
    require_columns(df, columns)?;

    let mut encoded = df.drop_many(columns);
    let mut indicator_names = Vec::new();

    for name in columns {
        let values = string_values(df.column(name)?.as_materialized_series())?;
        let categories: BTreeSet<&str> = values.iter().flatten().map(|s| s.as_str()).collect();

        for category in categories {
            let indicator: Vec<i8> = values
                .iter()
                .map(|v| i8::from(v.as_deref() == Some(category)))
                .collect();
            let indicator_name = format!("{}_{}", name, category);
            if encoded.get_column_index(&indicator_name).is_some() {
                return Err(TabularError::invalid(format!(
                    "indicator column '{}' for '{}' clashes with an existing column",
                    indicator_name, name
                )));
            }
            encoded.with_column(Series::new(indicator_name.as_str().into(), indicator))?;
            indicator_names.push(indicator_name);
        }
    }

    Ok((encoded, indicator_names))
}

/// Randomly split `(x, y)` into train and test sets.
///
/// The test set receives `ceil(test_size * n)` rows; both sides must end up
/// non-empty.
pub fn train_test_split(
    x: &DataFrame,
    y: &Series,
    split: SplitOptions,
) -> Result<(FeatureSet, FeatureSet)> {
    if !(split.test_size > 0.0 && split.test_size < 1.0) {
        return Err(TabularError::invalid(format!(
            "test_size must be in (0, 1), got {}",
            split.test_size
        )));
    }
    // a frame without columns has no height of its own
    let n = y.len();
    if x.width() > 0 && x.height() != n {
        return Err(TabularError::invalid(format!(
            "feature matrix has {} rows but target has {}",
            x.height(),
            n
        )));
    }

    let n_test = (split.test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(TabularError::invalid(format!(
            "test_size {} leaves an empty train or test set for {} rows",
            split.test_size, n
        )));
    }

    let mut rng = match split.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    indices.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("test".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("train".into(), indices[n_test..].to_vec());

    let train = FeatureSet {
        x: x.take(&train_idx)?,
        y: y.take(&train_idx)?,
    };
    let test = FeatureSet {
        x: x.take(&test_idx)?,
        y: y.take(&test_idx)?,
    };

    debug!(train = train.x.height(), test = test.x.height(), "train/test split");
    Ok((train, test))
}

fn build_feature_matrix(
    df: &DataFrame,
    choice: &FeatureChoice,
    one_hot: bool,
) -> Result<(DataFrame, Vec<String>)> {
    let x = df.select(choice.names())?;
    if one_hot {
        one_hot_encode(&x, &choice.categorical_names())
    } else {
        Ok((x, Vec::new()))
    }
}

/// Select the best features of `df` for predicting `y` in one shot.
///
/// Excluded columns are removed before ranking. With a split configured,
/// the resulting `(X, y)` pair is randomly divided into train and test
/// sets.
pub fn select_features(df: &DataFrame, y: &str, options: &SelectFeaturesOptions) -> Result<Selection> {
    Ok(select_features_with_choice(df, y, options)?.1)
}

/// [`select_features`] that also returns the ranked variables behind the
/// selection.
pub fn select_features_with_choice(
    df: &DataFrame,
    y: &str,
    options: &SelectFeaturesOptions,
) -> Result<(FeatureChoice, Selection)> {
    require_columns(df, &options.exclude)?;
    let df = df.drop_many(&options.exclude);

    let choice = choose_features(&df, y, options.k_numerical, options.k_categorical)?;
    let (x, _) = build_feature_matrix(&df, &choice, options.one_hot)?;
    let target = require_column(&df, y)?.as_materialized_series().clone();

    let selection = match options.split {
        None => Selection::Full(FeatureSet { x, y: target }),
        Some(split) => {
            let (train, test) = train_test_split(&x, &target, split)?;
            Selection::Split { train, test }
        }
    };
    Ok((choice, selection))
}

/// Configuration of a [`FeatureSelector`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorConfig {
    pub k_numerical: FeatureCount,
    pub k_categorical: FeatureCount,
    pub one_hot: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            k_numerical: FeatureCount::Top(4),
            k_categorical: FeatureCount::Top(0),
            one_hot: true,
        }
    }
}

/// What a fitted selector remembers about its feature matrix
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSelectorState {
    /// Final feature columns, in output order
    pub feature_names: Vec<String>,
    pub feature_dtypes: HashMap<String, DataType>,
    /// One-hot indicator columns among `feature_names`
    pub indicator_columns: Vec<String>,
    /// Categorical columns that were expanded into indicators
    pub encoded_columns: Vec<String>,
    pub target: String,
}

/// Ranks and selects features on one dataset, then reproduces the same
/// feature schema on new data.
#[derive(Debug, Clone, Default)]
pub struct FeatureSelector {
    config: SelectorConfig,
    state: Option<FeatureSelectorState>,
}

impl FeatureSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Recorded state, if fitted.
    pub fn state(&self) -> Option<&FeatureSelectorState> {
        self.state.as_ref()
    }

    /// Choose features of `df` for target `y` and remember the resulting
    /// schema. Fitting again replaces the previous state.
    pub fn fit(&mut self, df: &DataFrame, y: &str) -> Result<&mut Self> {
        let choice = choose_features(df, y, self.config.k_numerical, self.config.k_categorical)?;
        let (x, indicator_columns) = build_feature_matrix(df, &choice, self.config.one_hot)?;

        let feature_names: Vec<String> = x
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let feature_dtypes = x
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.dtype().clone()))
            .collect();
        let encoded_columns = if self.config.one_hot {
            choice.categorical_names()
        } else {
            Vec::new()
        };

        info!(
            target_column = y,
            features = feature_names.len(),
            indicators = indicator_columns.len(),
            "feature selector fitted"
        );

        self.state = Some(FeatureSelectorState {
            feature_names,
            feature_dtypes,
            indicator_columns,
            encoded_columns,
            target: y.to_string(),
        });
        Ok(self)
    }

    /// Build the remembered feature matrix from `df`.
    ///
    /// Indicator columns for categories that never occur in `df` are
    /// created filled with zero; categories unseen at fit time are dropped.
    pub fn select(&self, df: &DataFrame) -> Result<FeatureSet> {
        let state = self.state.as_ref().ok_or(TabularError::NotFitted)?;
        let target = require_column(df, &state.target)?
            .as_materialized_series()
            .clone();

        let indicators: HashSet<&str> = state.indicator_columns.iter().map(|s| s.as_str()).collect();
        let base_columns: Vec<String> = state
            .feature_names
            .iter()
            .filter(|name| !indicators.contains(name.as_str()))
            .chain(state.encoded_columns.iter())
            .cloned()
            .collect();
        require_columns(df, &base_columns)?;

        let mut frame = df.select(&base_columns)?;
        if !state.encoded_columns.is_empty() {
            frame = one_hot_encode(&frame, &state.encoded_columns)?.0;
        }

        let present: HashSet<String> = frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        for name in &state.indicator_columns {
            if !present.contains(name) {
                debug!(column = %name, "category absent from data; filling indicator with zeros");
                frame.with_column(Series::new(name.as_str().into(), vec![0i8; frame.height()]))?;
            }
        }

        let mut columns = Vec::with_capacity(state.feature_names.len());
        for name in &state.feature_names {
            let column = require_column(&frame, name)?;
            let column = match state.feature_dtypes.get(name) {
                Some(dtype) if column.dtype() != dtype => column.cast(dtype)?,
                _ => column.clone(),
            };
            columns.push(column);
        }

        Ok(FeatureSet {
            x: DataFrame::new(columns)?,
            y: target,
        })
    }
}
