//! Export module for handing linkage reports to external tools.
//!
//! Supported formats:
//! - **JSON**: dashboards, CI annotations and scripting

pub mod json;

pub use json::{export_jar_report_json, export_json};
