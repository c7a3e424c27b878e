//! Value mapping transforms: generic per-cell mappers, unit and interval
//! parsing, keyword categorisation, datetime parsing and missing-value
//! filling

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use regex::Regex;

use super::columns::{
    column_kind, f64_values, require_column, restore_categorical, string_values, ColumnKind,
};
use super::error::{Result, TabularError};

static INTERVAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)*)\s*[-–]\s*(\d+(?:[.,]\d+)*)").expect("interval pattern is valid")
});

/// How mappers treat missing cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NaPolicy {
    /// Missing cells stay missing; the mapper is not called
    #[default]
    Ignore,
    /// The mapper receives `None` for missing cells
    Apply,
}

fn map_values<T, F>(
    df: &DataFrame,
    column: &str,
    mapper: &F,
    policy: NaPolicy,
) -> Result<Vec<Option<T>>>
where
    F: Fn(Option<&str>) -> Result<Option<T>>,
{
    let values = string_values(require_column(df, column)?.as_materialized_series())?;
    values
        .iter()
        .map(|value| match (value, policy) {
            (None, NaPolicy::Ignore) => Ok(None),
            _ => mapper(value.as_deref()),
        })
        .collect()
}

/// Map every cell of `cols` (viewed as text) through `mapper` into a
/// `String` column.
pub fn map_cols_str<F>(mut df: DataFrame, cols: &[&str], mapper: F, policy: NaPolicy) -> Result<DataFrame>
where
    F: Fn(Option<&str>) -> Result<Option<String>>,
{
    for &name in cols {
        let mapped = map_values(&df, name, &mapper, policy)?;
        df.with_column(Series::new(name.into(), mapped))?;
    }
    Ok(df)
}

/// Map every cell of `cols` (viewed as text) through `mapper` into a
/// `Float64` column.
pub fn map_cols_f64<F>(mut df: DataFrame, cols: &[&str], mapper: F, policy: NaPolicy) -> Result<DataFrame>
where
    F: Fn(Option<&str>) -> Result<Option<f64>>,
{
    for &name in cols {
        let mapped = map_values(&df, name, &mapper, policy)?;
        df.with_column(Series::new(name.into(), mapped))?;
    }
    Ok(df)
}

/// Parse a number written with `.` as thousands separator and `,` as the
/// decimal mark: `"1.234,5"` is 1234.5.
pub fn parse_locale_number(text: &str) -> Result<f64> {
    let normalized = text.trim().replace('.', "").replace(',', ".");
    normalized
        .parse::<f64>()
        .map_err(|_| TabularError::invalid(format!("'{}' is not a number", text)))
}

/// Convert `"<quantity> <unit>"` strings into numbers.
///
/// The cell is split at its last whitespace. The first entry of `units`
/// whose key occurs in the unit token supplies the multiplier; without a
/// match the cell becomes missing. Quantities are read with
/// `quantity_parser`, or [`parse_locale_number`] when none is given.
/// Columns that are already numeric are left as they are.
pub fn map_unit(
    df: DataFrame,
    cols: &[&str],
    units: &[(&str, f64)],
    quantity_parser: Option<&dyn Fn(&str) -> Result<f64>>,
    policy: NaPolicy,
) -> Result<DataFrame> {
    let mut text_cols = Vec::with_capacity(cols.len());
    for &name in cols {
        if column_kind(require_column(&df, name)?.dtype()) != ColumnKind::Numeric {
            text_cols.push(name);
        }
    }

    map_cols_f64(
        df,
        &text_cols,
        |cell| {
            let Some(cell) = cell else {
                return Ok(None);
            };
            let (quantity, unit) = cell.trim().rsplit_once(char::is_whitespace).ok_or_else(|| {
                TabularError::invalid(format!("'{}' is not in '<quantity> <unit>' form", cell))
            })?;

            match units.iter().find(|(key, _)| unit.contains(key)) {
                Some((_, multiplier)) => {
                    let quantity = match quantity_parser {
                        Some(parse) => parse(quantity.trim())?,
                        None => parse_locale_number(quantity)?,
                    };
                    Ok(Some(quantity * multiplier))
                }
                None => Ok(None),
            }
        },
        policy,
    )
}

/// Midpoint of a `"<lower> - <upper>"` interval; either bound may use
/// locale formatting (`"1.200 – 1.800"` is 1500).
pub fn interval_quant_mapper(text: &str) -> Result<f64> {
    let captures = INTERVAL_PATTERN
        .captures(text)
        .ok_or_else(|| TabularError::invalid(format!("'{}' does not contain an interval", text)))?;
    let lower = parse_locale_number(&captures[1])?;
    let upper = parse_locale_number(&captures[2])?;
    Ok((lower + upper) / 2.0)
}

/// Categorise free text by keywords.
///
/// Categories are tried in table order and the first one with a keyword
/// contained in the cell (case-insensitively) wins. Cells matching nothing
/// become `nomatch`; missing cells stay missing.
pub fn map_keyword(
    df: DataFrame,
    cols: &[&str],
    table: &[(&str, &[&str])],
    nomatch: Option<&str>,
) -> Result<DataFrame> {
    let lowered: Vec<(&str, Vec<String>)> = table
        .iter()
        .map(|(category, keywords)| {
            (*category, keywords.iter().map(|k| k.to_lowercase()).collect())
        })
        .collect();

    map_cols_str(
        df,
        cols,
        |cell| {
            let Some(cell) = cell else {
                return Ok(None);
            };
            let cell = cell.to_lowercase();
            let category = lowered
                .iter()
                .find(|(_, keywords)| keywords.iter().any(|k| cell.contains(k.as_str())))
                .map(|(category, _)| *category)
                .or(nomatch);
            Ok(category.map(str::to_string))
        },
        NaPolicy::Ignore,
    )
}

fn parse_timestamp(text: &str, format: &str) -> Result<i64> {
    let parsed = NaiveDateTime::parse_from_str(text, format).or_else(|_| {
        NaiveDate::parse_from_str(text, format).map(|date| date.and_time(chrono::NaiveTime::MIN))
    });
    parsed
        .map(|dt| dt.and_utc().timestamp_micros())
        .map_err(|e| {
            TabularError::invalid(format!(
                "cannot parse '{}' with format '{}': {}",
                text, format, e
            ))
        })
}

/// Parse text columns into `Datetime(Microseconds)` using one chrono format
/// per column. Date-only formats map to midnight.
pub fn to_datetime(mut df: DataFrame, formats: &[(&str, &str)]) -> Result<DataFrame> {
    for &(name, format) in formats {
        let values = string_values(require_column(&df, name)?.as_materialized_series())?;
        let micros = values
            .iter()
            .map(|v| v.as_deref().map(|s| parse_timestamp(s.trim(), format)).transpose())
            .collect::<Result<Vec<Option<i64>>>>()?;
        let parsed = Series::new(name.into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
        df.with_column(parsed)?;
    }
    Ok(df)
}

/// Replacement value for [`fill_na`]
#[derive(Debug, Clone, PartialEq)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

/// Fill missing cells of `cols` with `value`, restricted to the rows where
/// `rows` is true when a mask is given.
///
/// Numbers fill numeric columns (an integer column stays integer when the
/// value is integral), text fills string or categorical columns.
pub fn fill_na(mut df: DataFrame, cols: &[&str], value: &FillValue, rows: Option<&[bool]>) -> Result<DataFrame> {
    if let Some(mask) = rows {
        if mask.len() != df.height() {
            return Err(TabularError::invalid(format!(
                "row mask has {} entries for {} rows",
                mask.len(),
                df.height()
            )));
        }
    }
    let selected = |row: usize| rows.map_or(true, |mask| mask[row]);

    for &name in cols {
        let column = require_column(&df, name)?;
        let dtype = column.dtype().clone();
        let series = column.as_materialized_series();

        let filled = match (value, column_kind(&dtype)) {
            (FillValue::Number(number), ColumnKind::Numeric) => {
                let values: Vec<Option<f64>> = f64_values(series)?
                    .into_iter()
                    .enumerate()
                    .map(|(row, v)| match v {
                        None if selected(row) => Some(*number),
                        other => other,
                    })
                    .collect();
                let target = if dtype.is_integer() && number.fract() != 0.0 {
                    DataType::Float64
                } else {
                    dtype
                };
                Series::new(name.into(), values).cast(&target)?
            }
            (FillValue::Text(text), ColumnKind::Categorical) => {
                let values: Vec<Option<String>> = string_values(series)?
                    .into_iter()
                    .enumerate()
                    .map(|(row, v)| match v {
                        None if selected(row) => Some(text.clone()),
                        other => other,
                    })
                    .collect();
                restore_categorical(name, &dtype, values)?
            }
            _ => {
                return Err(TabularError::invalid(format!(
                    "cannot fill column '{}' of type {} with {:?}",
                    name, dtype, value
                )))
            }
        };
        df.with_column(filled)?;
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_number() {
        assert_eq!(parse_locale_number("1.234,5").unwrap(), 1234.5);
        assert_eq!(parse_locale_number("12").unwrap(), 12.0);
        assert_eq!(parse_locale_number("0,75").unwrap(), 0.75);
        assert!(matches!(
            parse_locale_number("abc"),
            Err(TabularError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_interval_midpoint() {
        assert_eq!(interval_quant_mapper("12 - 18").unwrap(), 15.0);
        assert_eq!(interval_quant_mapper("1.200 - 1.800").unwrap(), 1500.0);
        assert_eq!(interval_quant_mapper("từ 5–7 triệu").unwrap(), 6.0);
        assert!(interval_quant_mapper("no numbers here").is_err());
    }

    #[test]
    fn test_map_unit_scales_by_first_matching_unit() {
        let df = df! {
            "salary" => [Some("15 triệu"), Some("2,5 tỷ"), Some("300 USD"), None],
        }
        .unwrap();
        let units = [("triệu", 1e6), ("tỷ", 1e9)];
        let out = map_unit(df, &["salary"], &units, None, NaPolicy::Ignore).unwrap();
        let values: Vec<Option<f64>> = out.column("salary").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(15e6), Some(2.5e9), None, None]);
    }

    #[test]
    fn test_map_unit_requires_separator() {
        let df = df! { "size" => ["15kg"] }.unwrap();
        let err = map_unit(df, &["size"], &[("kg", 1.0)], None, NaPolicy::Ignore).unwrap_err();
        assert!(matches!(err, TabularError::InvalidArgument(_)));
    }

    #[test]
    fn test_map_keyword_first_category_wins() {
        let df = df! {
            "title" => [Some("Senior Rust Engineer"), Some("Data ANALYST"), Some("Chef"), None],
        }
        .unwrap();
        let table: [(&str, &[&str]); 2] = [("engineering", &["engineer", "developer"]), ("data", &["analyst", "data"])];
        let out = map_keyword(df, &["title"], &table, Some("other")).unwrap();
        let values: Vec<Option<&str>> = out.column("title").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("engineering"), Some("data"), Some("other"), None]);
    }

    #[test]
    fn test_to_datetime_date_only_format() {
        let df = df! { "posted" => [Some("02/01/2024"), None] }.unwrap();
        let out = to_datetime(df, &[("posted", "%d/%m/%Y")]).unwrap();
        let column = out.column("posted").unwrap();
        assert_eq!(column.dtype(), &DataType::Datetime(TimeUnit::Microseconds, None));
        assert_eq!(column.null_count(), 1);
    }

    #[test]
    fn test_fill_na_with_row_mask() {
        let df = df! { "x" => [None, Some(2i64), None] }.unwrap();
        let out = fill_na(df, &["x"], &FillValue::Number(0.0), Some(&[true, true, false][..])).unwrap();
        let values: Vec<Option<i64>> = out.column("x").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(0), Some(2), None]);
    }
}
