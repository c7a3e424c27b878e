//! tabsift: Tabular Analysis and Feature Selection Library
//!
//! Statistical dependency tests, dependency-ranked feature selection and a
//! pluggable preprocessing pipeline over polars DataFrames.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
