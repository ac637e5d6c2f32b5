use crate::error::{CheckerError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for linkage checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Check artifacts in parallel (for `check_classpath`)
    pub parallel: bool,

    /// Maximum class file size to read (in bytes)
    /// Larger entries fail with `CheckerError::ClassTooLarge`
    pub max_class_file_size: usize,

    /// Artifacts to check (None = every artifact on the classpath)
    pub entry_artifacts: Option<Vec<PathBuf>>,

    /// Classes provided by the JDK rather than the classpath
    pub platform: PlatformClasses,
}

/// Classes the bootstrap loader supplies ahead of the classpath.
///
/// `artifacts` are JDK class images (a jar such as `rt.jar`, or a directory
/// laid out by package such as one module of `jimage extract` output). They
/// are searched before the classpath and shadow it, but are never checked
/// themselves. A class no image defines still counts as present when its
/// binary name starts with one of `assumed_prefixes`; members looked up on
/// such a class, or inherited from one, are assumed to exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformClasses {
    pub artifacts: Vec<PathBuf>,
    pub assumed_prefixes: Vec<String>,
}

impl Default for PlatformClasses {
    fn default() -> Self {
        Self {
            artifacts: Vec::new(),
            assumed_prefixes: vec!["java.".to_string()],
        }
    }
}

impl PlatformClasses {
    /// No platform at all: every class must come from the classpath.
    pub fn none() -> Self {
        Self {
            artifacts: Vec::new(),
            assumed_prefixes: Vec::new(),
        }
    }

    /// True if `class_name` is assumed present without a definition.
    pub fn assumes(&self, class_name: &str) -> bool {
        self.assumed_prefixes
            .iter()
            .any(|prefix| class_name.starts_with(prefix.as_str()))
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            max_class_file_size: 10 * 1024 * 1024, // 10 MB
            entry_artifacts: None,
            platform: PlatformClasses::default(),
        }
    }
}

impl CheckerConfig {
    /// Parse a configuration from JSON; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CheckerError::Configuration {
            message: format!("invalid checker configuration: {e}"),
            source: Some(e),
        })
    }

    /// Enable parallel checking
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set maximum class file size
    pub fn with_max_class_file_size(mut self, size: usize) -> Self {
        self.max_class_file_size = size;
        self
    }

    /// Restrict checks to the given artifacts
    pub fn with_entry_artifacts<I, P>(mut self, artifacts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.entry_artifacts = Some(artifacts.into_iter().map(Into::into).collect());
        self
    }

    /// Set where JDK classes come from
    pub fn with_platform(mut self, platform: PlatformClasses) -> Self {
        self.platform = platform;
        self
    }

    /// Search the given JDK class images before the classpath
    pub fn with_platform_artifacts<I, P>(mut self, artifacts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.platform.artifacts = artifacts.into_iter().map(Into::into).collect();
        self
    }
}
