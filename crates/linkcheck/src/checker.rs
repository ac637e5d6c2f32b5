//! Linkage checks over a whole classpath.

use crate::artifact::ArtifactPath;
use crate::classpath::ClasspathIndex;
use crate::config::CheckerConfig;
use crate::error::{CheckerError, Result};
use crate::extractor::references_of_classes;
use crate::metrics::CheckMetrics;
use crate::report::{ClasspathLinkageReport, JarLinkageReport};
use crate::resolver::LinkageResolver;
use linkcheck_classfile::{ClassFileParser, ClassStructureParser};
use log::info;
use rayon::prelude::*;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Checks artifacts against the classpath they were indexed with.
pub struct LinkageChecker {
    index: ClasspathIndex,
    config: CheckerConfig,
    metrics: Mutex<CheckMetrics>,
}

impl LinkageChecker {
    /// Index `artifacts` and prepare to check them.
    ///
    /// # Errors
    ///
    /// Returns [`CheckerError::InvalidClasspath`] if the classpath cannot be
    /// indexed.
    pub fn create<I, P>(artifacts: I, config: CheckerConfig) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<ArtifactPath>,
    {
        Self::with_parser(artifacts, config, Arc::new(ClassFileParser::new()))
    }

    /// Like [`LinkageChecker::create`], reading classes with `parser`.
    pub fn with_parser<I, P>(
        artifacts: I,
        config: CheckerConfig,
        parser: Arc<dyn ClassStructureParser>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<ArtifactPath>,
    {
        let index = ClasspathIndex::build_with_platform(
            artifacts,
            config.platform.clone(),
            parser,
            config.max_class_file_size,
        )?;
        Ok(Self {
            index,
            config,
            metrics: Mutex::new(CheckMetrics::default()),
        })
    }

    pub fn index(&self) -> &ClasspathIndex {
        &self.index
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Resolve every reference made by the classes of `artifact`.
    ///
    /// # Errors
    ///
    /// [`CheckerError::ArtifactNotOnClasspath`] if the artifact was not
    /// indexed, or any error hit while reading classes.
    pub fn check_artifact(&self, artifact: &Path) -> Result<JarLinkageReport> {
        let position = self
            .index
            .position(artifact)
            .ok_or_else(|| CheckerError::ArtifactNotOnClasspath {
                path: artifact.to_path_buf(),
            })?;
        let artifact = &self.index.artifacts()[position];
        let start = Instant::now();

        let classes = self.index.read_artifact_classes(position)?;
        let references = references_of_classes(&classes)?;

        let mut resolver = LinkageResolver::new(&self.index);
        let class_outcomes: Vec<_> = references
            .class_references()
            .iter()
            .map(|reference| (reference.clone(), resolver.resolve_class(reference)))
            .collect();
        let mut method_outcomes = Vec::with_capacity(references.method_references().len());
        for reference in references.method_references() {
            method_outcomes.push((reference.clone(), resolver.resolve_method(reference)?));
        }
        let mut field_outcomes = Vec::with_capacity(references.field_references().len());
        for reference in references.field_references() {
            field_outcomes.push((reference.clone(), resolver.resolve_field(reference)?));
        }

        let report = JarLinkageReport::from_resolutions(
            artifact.path(),
            class_outcomes,
            method_outcomes,
            field_outcomes,
        );

        let elapsed = start.elapsed();
        info!(
            "Checked {}: {} classes, {} references, {} errors in {:?}",
            artifact,
            classes.len(),
            references.len(),
            report.total_error_count(),
            elapsed
        );

        let mut metrics = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        metrics.merge(&CheckMetrics {
            artifacts_checked: 1,
            classes_scanned: classes.len(),
            references_resolved: references.len(),
            errors_found: report.total_error_count(),
            total_check_time: elapsed,
        });

        Ok(report)
    }

    /// Check every configured artifact, or the whole classpath if none are
    /// configured. Reports follow classpath order.
    pub fn check_classpath(&self) -> Result<ClasspathLinkageReport> {
        let targets = self.target_artifacts()?;

        let reports = if self.config.parallel {
            targets
                .par_iter()
                .map(|artifact| self.check_artifact(artifact.path()))
                .collect::<Result<Vec<_>>>()?
        } else {
            targets
                .iter()
                .map(|artifact| self.check_artifact(artifact.path()))
                .collect::<Result<Vec<_>>>()?
        };

        let report = ClasspathLinkageReport::new(reports);
        info!(
            "Checked {} artifacts: {} errors",
            report.jar_reports().len(),
            report.total_error_count()
        );
        Ok(report)
    }

    pub fn metrics(&self) -> CheckMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reset_metrics(&self) {
        *self.metrics.lock().unwrap_or_else(PoisonError::into_inner) = CheckMetrics::default();
    }

    fn target_artifacts(&self) -> Result<Vec<&ArtifactPath>> {
        let Some(entries) = &self.config.entry_artifacts else {
            return Ok(self.index.artifacts().iter().collect());
        };
        if let Some(missing) = entries.iter().find(|e| self.index.position(e).is_none()) {
            return Err(CheckerError::ArtifactNotOnClasspath {
                path: missing.clone(),
            });
        }
        Ok(self
            .index
            .artifacts()
            .iter()
            .filter(|artifact| entries.iter().any(|e| e.as_path() == artifact.path()))
            .collect())
    }
}
