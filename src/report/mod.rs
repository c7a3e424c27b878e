//! Report module - terminal summaries and JSON export

pub mod selection_report;
pub mod summary;

pub use selection_report::*;
pub use summary::*;
