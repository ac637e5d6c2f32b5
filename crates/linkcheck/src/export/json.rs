//! JSON format export.
//!
//! Generates a `reports` array with one object per artifact, each holding
//! its class, method and field errors.

use crate::error::{CheckerError, Result};
use crate::linkage_error::LinkageErrorOnReference;
use crate::report::{ClasspathLinkageReport, JarLinkageReport};
use serde::Serialize;
use serde_json::{json, Value};

/// Export a classpath report to pretty-printed JSON
pub fn export_json(report: &ClasspathLinkageReport) -> Result<String> {
    let reports: Vec<Value> = report
        .jar_reports()
        .iter()
        .map(jar_report_to_json)
        .collect::<Result<_>>()?;

    let result = json!({
        "total_errors": report.total_error_count(),
        "reports": reports,
    });
    to_pretty(&result)
}

/// Export a single artifact's report to pretty-printed JSON
pub fn export_jar_report_json(report: &JarLinkageReport) -> Result<String> {
    to_pretty(&jar_report_to_json(report)?)
}

fn jar_report_to_json(report: &JarLinkageReport) -> Result<Value> {
    Ok(json!({
        "artifact": report.artifact_path().display().to_string(),
        "total_errors": report.total_error_count(),
        "class_errors": errors_to_json(report.missing_class_errors())?,
        "method_errors": errors_to_json(report.missing_method_errors())?,
        "field_errors": errors_to_json(report.missing_field_errors())?,
    }))
}

fn errors_to_json<T: Serialize>(errors: &[LinkageErrorOnReference<T>]) -> Result<Vec<Value>> {
    errors
        .iter()
        .map(|error| {
            Ok(json!({
                "reference": to_value(error.reference())?,
                "reason": error.reason(),
                "target_class_location": error.target_class_location().map(|l| l.location()),
            }))
        })
        .collect()
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| CheckerError::Serialization { source })
}

fn to_pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| CheckerError::Serialization { source })
}
