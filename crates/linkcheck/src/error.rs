//! Error types for linkcheck operations.
//!
//! Only structural failures to read or parse input are errors. Linkage
//! problems found on a classpath are ordinary output and live in
//! [`crate::report`].

use linkcheck_classfile::ClassFileError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for linkcheck operations.
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Error type for index construction, class loading and scanning.
#[derive(Error, Debug)]
pub enum CheckerError {
    /// Classpath cannot be indexed (empty, missing or unreadable entry)
    #[error("Invalid classpath: {message}")]
    InvalidClasspath {
        /// What was wrong with the input
        message: String,
    },

    /// Explicit class load for a name that no artifact defines
    #[error("Class not found: {class_name}")]
    ClassNotFound {
        /// Binary name that was requested
        class_name: String,
    },

    /// Type descriptor violates the descriptor grammar
    #[error("Malformed descriptor '{descriptor}': {message}")]
    MalformedDescriptor {
        /// Offending descriptor
        descriptor: String,
        /// Where parsing stopped
        message: String,
    },

    /// File system failure while reading an artifact
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// Artifact being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Archive is not a readable zip file
    #[error("Archive error reading {}: {source}", .path.display())]
    Archive {
        /// Archive being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: zip::result::ZipError,
    },

    /// Class entry could not be parsed
    #[error("Invalid class file {entry} in {}: {source}", .path.display())]
    ClassFormat {
        /// Artifact containing the entry
        path: PathBuf,
        /// Entry name inside the artifact
        entry: String,
        /// Parser error
        #[source]
        source: ClassFileError,
    },

    /// Class entry exceeds the configured size limit
    #[error("Class file {entry} in {} is {size} bytes (limit {limit})", .path.display())]
    ClassTooLarge {
        /// Artifact containing the entry
        path: PathBuf,
        /// Entry name inside the artifact
        entry: String,
        /// Entry size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Artifact to check is not part of the indexed classpath
    #[error("Artifact is not on the classpath: {}", .path.display())]
    ArtifactNotOnClasspath {
        /// Requested artifact
        path: PathBuf,
    },

    /// Configuration could not be read
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error details
        message: String,
        /// Optional source error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Report could not be serialized
    #[error("Serialization error: {source}")]
    Serialization {
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

impl CheckerError {
    /// Create an invalid-classpath error from a message.
    pub fn invalid_classpath(message: impl Into<String>) -> Self {
        Self::InvalidClasspath {
            message: message.into(),
        }
    }

    /// Create a malformed-descriptor error.
    pub fn malformed_descriptor(descriptor: &str, message: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            descriptor: descriptor.to_string(),
            message: message.into(),
        }
    }
}
