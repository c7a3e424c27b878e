//! Column typing and value extraction helpers

use polars::prelude::*;

use super::error::{Result, TabularError};

/// Semantic kind of a dataset column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer or floating point values
    Numeric,
    /// String, categorical or enum values
    Categorical,
    /// Anything else (booleans, temporal, nested, ...)
    Other,
}

/// Classify a polars data type into a [`ColumnKind`].
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if dtype.is_primitive_numeric() {
        return ColumnKind::Numeric;
    }
    match dtype {
        DataType::String | DataType::Categorical(_, _) | DataType::Enum(_, _) => {
            ColumnKind::Categorical
        }
        _ => ColumnKind::Other,
    }
}

/// Names of all numeric columns, in dataset order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    columns_of_kind(df, ColumnKind::Numeric)
}

/// Names of all categorical columns, in dataset order.
pub fn categorical_columns(df: &DataFrame) -> Vec<String> {
    columns_of_kind(df, ColumnKind::Categorical)
}

fn columns_of_kind(df: &DataFrame, kind: ColumnKind) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| column_kind(col.dtype()) == kind)
        .map(|col| col.name().to_string())
        .collect()
}

/// Look up a column, reporting a schema mismatch when it is absent.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| TabularError::missing_column(name))
}

/// Fail with a schema mismatch for the first name absent from `df`.
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<()> {
    for name in names {
        require_column(df, name.as_ref())?;
    }
    Ok(())
}

/// Extract a series as `f64` values. Nulls and NaN both become `None`.
pub fn f64_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let float = series.cast(&DataType::Float64)?;
    Ok(float
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Extract a series as owned strings, whatever its physical type.
pub fn string_values(series: &Series) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Float32 | DataType::Float64 => {
            let cast = series.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()).map(|x| format!("{}", x)))
                .collect()
        }
        _ => {
            let cast = series.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };
    Ok(values)
}

/// Pairwise-complete extraction of two numeric series: rows where either
/// side is missing are dropped.
pub fn paired_values(x: &Series, y: &Series) -> Result<(Vec<f64>, Vec<f64>)> {
    if x.len() != y.len() {
        return Err(TabularError::invalid(format!(
            "series '{}' and '{}' differ in length ({} vs {})",
            x.name(),
            y.name(),
            x.len(),
            y.len()
        )));
    }

    let xs = f64_values(x)?;
    let ys = f64_values(y)?;

    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        })
        .unzip())
}

/// Rebuild a categorical-typed column from relabelled strings, keeping
/// string columns as strings and categorical/enum columns as nominal
/// categoricals.
pub(crate) fn restore_categorical(
    name: &str,
    original: &DataType,
    values: Vec<Option<String>>,
) -> Result<Series> {
    let series = Series::new(name.into(), values);
    match original {
        DataType::Categorical(_, _) | DataType::Enum(_, _) => Ok(series.cast(
            &DataType::Categorical(None, CategoricalOrdering::default()),
        )?),
        _ => Ok(series),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_kinds() {
        let df = df! {
            "num" => [1.0f64, 2.0],
            "int" => [1i32, 2],
            "text" => ["a", "b"],
            "flag" => [true, false],
        }
        .unwrap();

        assert_eq!(numeric_columns(&df), vec!["num", "int"]);
        assert_eq!(categorical_columns(&df), vec!["text"]);
        assert_eq!(column_kind(&DataType::Boolean), ColumnKind::Other);
    }

    #[test]
    fn test_require_column_reports_schema_mismatch() {
        let df = df! { "a" => [1i32] }.unwrap();
        let err = require_column(&df, "b").unwrap_err();
        assert!(matches!(err, TabularError::SchemaMismatch { column } if column == "b"));
    }

    #[test]
    fn test_paired_values_drop_incomplete_rows() {
        let x = Series::new("x".into(), &[Some(1.0f64), None, Some(3.0), Some(f64::NAN)]);
        let y = Series::new("y".into(), &[Some(2.0f64), Some(4.0), None, Some(8.0)]);
        let (xs, ys) = paired_values(&x, &y).unwrap();
        assert_eq!(xs, vec![1.0]);
        assert_eq!(ys, vec![2.0]);
    }
}
