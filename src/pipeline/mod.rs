//! Pipeline module - statistical tests, feature selection and preprocessing

pub mod categories;
pub mod columns;
pub mod dependency;
pub mod error;
pub mod loader;
pub mod mapping;
pub mod outliers;
pub mod preprocess;
pub mod ranking;
pub mod selection;
pub mod stats;
pub mod symmetry;

pub use categories::*;
pub use columns::{categorical_columns, column_kind, numeric_columns, ColumnKind};
pub use dependency::*;
pub use error::{Result, TabularError};
pub use loader::*;
pub use mapping::*;
pub use outliers::*;
pub use preprocess::*;
pub use ranking::*;
pub use selection::*;
pub use stats::{mean_std, one_way_anova, pearson, skewness, AnovaResult, PearsonResult};
pub use symmetry::*;
