//! Tests for preprocessing transforms and exploratory helpers

#[path = "common/mod.rs"]
mod common;

use common::{assert_shape, create_dependency_dataframe};
use polars::prelude::*;
use tabsift::pipeline::{
    as_other, check_symmetry, fill_na, handle_low_freq, interval_quant_mapper, is_symmetric,
    map_cols_str, map_unit, parse_locale_number, remove_outliers, remove_outliers_with_report,
    to_categorical, FillValue, LowFreqAction, NaPolicy, OutlierMethod, TabularError,
    DEFAULT_SYMMETRY_TOLERANCE,
};

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    let column = df.column(name).unwrap().cast(&DataType::String).unwrap();
    column
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

#[test]
fn test_interval_averaging() {
    assert_eq!(interval_quant_mapper("12 - 18").unwrap(), 15.0);
    assert_eq!(interval_quant_mapper("1.200 - 1.800").unwrap(), 1500.0);
    assert_eq!(interval_quant_mapper("10-20").unwrap(), 15.0);
    assert!(matches!(
        interval_quant_mapper("negotiable"),
        Err(TabularError::InvalidArgument(_))
    ));
}

#[test]
fn test_parse_locale_number_formats() {
    assert_eq!(parse_locale_number("1.500.000").unwrap(), 1_500_000.0);
    assert_eq!(parse_locale_number("3,25").unwrap(), 3.25);
}

#[test]
fn test_map_unit_with_custom_parser_and_numeric_column() {
    let df = df! {
        "weight" => ["2 kg", "500 g", "1 tonne"],
        "already" => [1.0f64, 2.0, 3.0],
    }
    .unwrap();
    let units = [("kg", 1.0), ("g", 0.001)];
    let parser = |s: &str| -> tabsift::pipeline::Result<f64> {
        s.parse::<f64>()
            .map_err(|e| TabularError::InvalidArgument(e.to_string()))
    };
    let out = map_unit(df, &["weight", "already"], &units, Some(&parser), NaPolicy::Ignore).unwrap();

    let weight: Vec<Option<f64>> = out.column("weight").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(weight, vec![Some(2.0), Some(0.5), None]);
    let already: Vec<Option<f64>> = out.column("already").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(already, vec![Some(1.0), Some(2.0), Some(3.0)]);
}

#[test]
fn test_map_cols_na_policy() {
    let df = df! { "x" => [Some("a"), None] }.unwrap();

    let ignored = map_cols_str(
        df.clone(),
        &["x"],
        |v| Ok(Some(v.unwrap_or("missing").to_uppercase())),
        NaPolicy::Ignore,
    )
    .unwrap();
    assert_eq!(strings(&ignored, "x"), vec![Some("A".to_string()), None]);

    let applied = map_cols_str(
        df,
        &["x"],
        |v| Ok(Some(v.unwrap_or("missing").to_uppercase())),
        NaPolicy::Apply,
    )
    .unwrap();
    assert_eq!(
        strings(&applied, "x"),
        vec![Some("A".to_string()), Some("MISSING".to_string())]
    );
}

#[test]
fn test_unknown_column_is_schema_mismatch() {
    let df = create_dependency_dataframe();
    assert!(matches!(
        map_cols_str(df, &["nope"], |v| Ok(v.map(str::to_string)), NaPolicy::Ignore),
        Err(TabularError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_outliers_use_each_groups_own_bounds() {
    // 50 is normal for group b but an outlier for group a
    let df = df! {
        "group" => ["a", "a", "a", "a", "a", "b", "b", "b", "b", "b"],
        "value" => [1.0f64, 2.0, 2.0, 3.0, 50.0, 48.0, 50.0, 51.0, 52.0, 49.0],
    }
    .unwrap();

    let (out, report) =
        remove_outliers_with_report(df, "value", OutlierMethod::Iqr, Some("group"), None).unwrap();
    assert_shape(&out, 9, 2);
    assert_eq!(report.removed, 1);
    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[0].group.as_deref(), Some("a"));
    assert_eq!(report.groups[0].removed, 1);
    assert_eq!(report.groups[1].removed, 0);

    let values: Vec<Option<f64>> = out.column("value").unwrap().f64().unwrap().into_iter().collect();
    assert!(values.contains(&Some(50.0)));
    assert_eq!(values.iter().filter(|v| **v == Some(50.0)).count(), 1);
}

#[test]
fn test_global_outliers_keep_missing_values() {
    let df = df! {
        "value" => [Some(1.0f64), Some(2.0), None, Some(3.0), Some(2.0), Some(40.0)],
    }
    .unwrap();
    let out = remove_outliers(df, "value", OutlierMethod::ZScore, None, Some(1.5)).unwrap();
    assert_eq!(out.height(), 5);
    assert_eq!(out.column("value").unwrap().null_count(), 1);
}

#[test]
fn test_low_freq_within_separating_column() {
    let df = df! {
        "city" => ["x", "x", "y", "x", "y", "y"],
        "region" => ["n", "n", "n", "s", "s", "s"],
    }
    .unwrap();
    // ("x","s") and ("y","n") occur once
    let out = handle_low_freq(df, "city", 2, Some("region"), LowFreqAction::Remove).unwrap();
    assert_shape(&out, 4, 2);
}

#[test]
fn test_as_other_on_categorical_stays_categorical() {
    let df = df! { "brand" => ["acme", "zeta", "acme", "omni"] }.unwrap();
    let df = to_categorical(df, &[("brand", None)]).unwrap();
    let out = as_other(df, "brand", &["zeta", "omni"]).unwrap();

    assert!(matches!(
        out.column("brand").unwrap().dtype(),
        DataType::Categorical(_, _)
    ));
    assert_eq!(
        strings(&out, "brand"),
        vec![
            Some("acme".to_string()),
            Some("other".to_string()),
            Some("acme".to_string()),
            Some("other".to_string())
        ]
    );
}

#[test]
fn test_fill_na_text_on_categorical() {
    let df = df! { "brand" => [Some("acme"), None] }.unwrap();
    let df = to_categorical(df, &[("brand", None)]).unwrap();
    let out = fill_na(df, &["brand"], &FillValue::Text("unknown".to_string()), None).unwrap();
    assert_eq!(
        strings(&out, "brand"),
        vec![Some("acme".to_string()), Some("unknown".to_string())]
    );

    let numeric = df! { "n" => [Some(1.5f64), None] }.unwrap();
    assert!(matches!(
        fill_na(numeric, &["n"], &FillValue::Text("x".to_string()), None),
        Err(TabularError::InvalidArgument(_))
    ));
}

#[test]
fn test_symmetry_checks() {
    let symmetric = Series::new("s".into(), &[1.0f64, 2.0, 3.0, 4.0, 5.0]);
    assert!(is_symmetric(&symmetric, DEFAULT_SYMMETRY_TOLERANCE).unwrap());

    let skewed = Series::new("k".into(), &[1.0f64, 1.0, 1.0, 2.0, 10.0]);
    assert!(!is_symmetric(&skewed, 0.5).unwrap());

    let df = create_dependency_dataframe();
    let checks = check_symmetry(&df, DEFAULT_SYMMETRY_TOLERANCE).unwrap();
    let names: Vec<&str> = checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["price", "area", "rooms", "noise"]);
    assert!(checks.iter().all(|c| c.symmetric));
}
