use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metrics collected during linkage checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckMetrics {
    /// Artifacts checked
    pub artifacts_checked: usize,

    /// Classes whose references were extracted
    pub classes_scanned: usize,

    /// Distinct references resolved
    pub references_resolved: usize,

    /// References that failed to resolve
    pub errors_found: usize,

    /// Total time spent checking
    #[serde(with = "duration_serde")]
    pub total_check_time: Duration,
}

// Helper module for serializing Duration
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: u64 = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

impl CheckMetrics {
    /// Fraction of resolved references that failed (0.0 to 1.0)
    pub fn error_rate(&self) -> f64 {
        if self.references_resolved == 0 {
            0.0
        } else {
            self.errors_found as f64 / self.references_resolved as f64
        }
    }

    /// Average check time per artifact
    pub fn avg_check_time(&self) -> Duration {
        if self.artifacts_checked == 0 {
            Duration::ZERO
        } else {
            self.total_check_time / self.artifacts_checked as u32
        }
    }

    /// Merge another metrics object into this one
    pub fn merge(&mut self, other: &CheckMetrics) {
        self.artifacts_checked += other.artifacts_checked;
        self.classes_scanned += other.classes_scanned;
        self.references_resolved += other.references_resolved;
        self.errors_found += other.errors_found;
        self.total_check_time += other.total_check_time;
    }
}
