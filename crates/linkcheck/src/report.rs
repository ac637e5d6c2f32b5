//! Per-artifact and per-classpath linkage reports.

use crate::artifact::ArtifactPath;
use crate::linkage_error::LinkageErrorOnReference;
use crate::resolver::Resolution;
use crate::symbols::{ClassSymbolReference, FieldSymbolReference, MethodSymbolReference};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Linkage errors found in the classes of one artifact, by reference kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JarLinkageReport {
    artifact_path: PathBuf,
    missing_class_errors: Vec<LinkageErrorOnReference<ClassSymbolReference>>,
    missing_method_errors: Vec<LinkageErrorOnReference<MethodSymbolReference>>,
    missing_field_errors: Vec<LinkageErrorOnReference<FieldSymbolReference>>,
}

impl JarLinkageReport {
    pub fn new(
        artifact_path: impl Into<PathBuf>,
        missing_class_errors: Vec<LinkageErrorOnReference<ClassSymbolReference>>,
        missing_method_errors: Vec<LinkageErrorOnReference<MethodSymbolReference>>,
        missing_field_errors: Vec<LinkageErrorOnReference<FieldSymbolReference>>,
    ) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            missing_class_errors,
            missing_method_errors,
            missing_field_errors,
        }
    }

    /// Build a report from resolver outcomes, keeping only failures and
    /// preserving their order.
    pub fn from_resolutions(
        artifact_path: impl Into<PathBuf>,
        classes: impl IntoIterator<Item = (ClassSymbolReference, Resolution)>,
        methods: impl IntoIterator<Item = (MethodSymbolReference, Resolution)>,
        fields: impl IntoIterator<Item = (FieldSymbolReference, Resolution)>,
    ) -> Self {
        Self::new(
            artifact_path,
            failures(classes),
            failures(methods),
            failures(fields),
        )
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn missing_class_errors(&self) -> &[LinkageErrorOnReference<ClassSymbolReference>] {
        &self.missing_class_errors
    }

    pub fn missing_method_errors(&self) -> &[LinkageErrorOnReference<MethodSymbolReference>] {
        &self.missing_method_errors
    }

    pub fn missing_field_errors(&self) -> &[LinkageErrorOnReference<FieldSymbolReference>] {
        &self.missing_field_errors
    }

    pub fn total_error_count(&self) -> usize {
        self.missing_class_errors.len()
            + self.missing_method_errors.len()
            + self.missing_field_errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.total_error_count() == 0
    }
}

fn failures<T>(
    outcomes: impl IntoIterator<Item = (T, Resolution)>,
) -> Vec<LinkageErrorOnReference<T>> {
    outcomes
        .into_iter()
        .filter_map(|(reference, resolution)| {
            LinkageErrorOnReference::from_resolution(reference, resolution)
        })
        .collect()
}

impl fmt::Display for JarLinkageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} errors):",
            ArtifactPath::new(&self.artifact_path).file_name(),
            self.total_error_count()
        )?;
        for error in &self.missing_class_errors {
            writeln!(f, "  {error}")?;
        }
        for error in &self.missing_method_errors {
            writeln!(f, "  {error}")?;
        }
        for error in &self.missing_field_errors {
            writeln!(f, "  {error}")?;
        }
        Ok(())
    }
}

/// Reports for every checked artifact, in classpath order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClasspathLinkageReport {
    jar_reports: Vec<JarLinkageReport>,
}

impl ClasspathLinkageReport {
    pub fn new(jar_reports: Vec<JarLinkageReport>) -> Self {
        Self { jar_reports }
    }

    pub fn jar_reports(&self) -> &[JarLinkageReport] {
        &self.jar_reports
    }

    /// Report for one artifact, if it was checked
    pub fn report_for(&self, artifact: &Path) -> Option<&JarLinkageReport> {
        self.jar_reports
            .iter()
            .find(|report| report.artifact_path() == artifact)
    }

    pub fn total_error_count(&self) -> usize {
        self.jar_reports
            .iter()
            .map(JarLinkageReport::total_error_count)
            .sum()
    }
}

impl fmt::Display for ClasspathLinkageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.jar_reports {
            write!(f, "{report}")?;
        }
        Ok(())
    }
}
