//! # linkcheck
//!
//! Static linkage checking for Java classpaths: finds references to classes,
//! methods and fields that a classloader would fail to link, without running
//! any code.
//!
//! ## Core Principles
//!
//! - **Classloader Order**: JDK class images first, then the first artifact defining a class wins
//! - **Linkage Problems Are Data**: Missing or inaccessible symbols end up in reports, not in `Err`
//! - **Deterministic**: Ordered reference sets give identical reports on every run
//! - **Parser Agnostic**: Class files are read through the `ClassStructureParser` trait
//!
//! ## Architecture
//!
//! ```text
//! LinkageChecker (per-artifact and whole-classpath checks)
//!     ↓
//! LinkageResolver (hierarchy walks, access rules)
//!     ↓
//! Extractor (class view → SymbolReferenceSet)
//!     ↓
//! ClasspathIndex (binary name → defining artifact)
//!     ↓
//! linkcheck-classfile (class file reader)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use linkcheck::{CheckerConfig, LinkageChecker};
//! use std::path::Path;
//!
//! let checker = LinkageChecker::create(
//!     ["libs/app.jar", "libs/guava.jar"],
//!     CheckerConfig::default(),
//! )
//! .unwrap();
//!
//! let report = checker.check_artifact(Path::new("libs/app.jar")).unwrap();
//! print!("{report}");
//! ```

#![deny(unsafe_code)]

pub mod artifact;
pub mod checker;
pub mod classpath;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod export;
pub mod extractor;
pub mod linkage_error;
pub mod metrics;
pub mod names;
pub mod report;
pub mod resolver;
pub mod symbols;

// Re-export main types
pub use artifact::{ArtifactKind, ArtifactPath, OpenArtifact};
pub use checker::LinkageChecker;
pub use classpath::{create_index, ClasspathIndex};
pub use config::{CheckerConfig, PlatformClasses};
pub use descriptor::{descriptor_to_parameter_types, JavaType, MethodDescriptor};
pub use error::{CheckerError, Result};
pub use extractor::{extract_references, list_inner_class_names, scan_symbol_references_in_artifact};
pub use linkage_error::{LinkageErrorOnReference, Reason};
pub use metrics::CheckMetrics;
pub use names::{classes_in_same_package, enclosing_class_name, top_level_class_name};
pub use report::{ClasspathLinkageReport, JarLinkageReport};
pub use resolver::{LinkageResolver, Resolution};
pub use symbols::{
    ClassSymbolReference, FieldSymbolReference, MethodSymbolReference, SymbolReference,
    SymbolReferenceInfo, SymbolReferenceSet,
};
