//! linkcheck class file adapter
//!
//! Turns the raw bytes of a compiled JVM class into a structural view that the
//! linkage checker can reason about.
//!
//! This crate provides:
//!
//! - **ParsedClass**: Binary name, supertypes, access flags, member tables,
//!   nested-class table and the outward references found in the constant pool
//! - **ClassStructureParser trait**: The seam through which the checker obtains
//!   class views, so alternative readers can be plugged in
//! - **ClassFileParser**: The default reader for the JVM class file format
//! - **ClassFileWriter**: Synthesizes minimal class files (fixtures, benchmarks)
//! - **Error handling**: [`ClassFileError`] for malformed input
//!
//! # Example
//!
//! ```rust
//! use linkcheck_classfile::{ClassFileParser, ClassFileWriter, ClassStructureParser};
//!
//! let bytes = ClassFileWriter::new("com.example.Greeter")
//!     .method("greet", "()Ljava/lang/String;", linkcheck_classfile::ACC_PUBLIC)
//!     .build();
//!
//! let class = ClassFileParser::new().parse(&bytes).unwrap();
//! assert_eq!(class.name, "com.example.Greeter");
//! assert_eq!(class.super_class.as_deref(), Some("java.lang.Object"));
//! ```

pub mod access;
pub mod class;
pub mod errors;
pub mod reader;
pub mod traits;
pub mod writer;


// Re-export commonly used types
pub use access::{
    AccessFlags, Visibility, ACC_ABSTRACT, ACC_FINAL, ACC_INTERFACE, ACC_PRIVATE, ACC_PROTECTED,
    ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC,
};
pub use class::{InnerClassEntry, MemberInfo, MemberRef, ParsedClass};
pub use errors::{ClassFileError, ClassFileResult};
pub use reader::parse_class;
pub use traits::{ClassFileParser, ClassStructureParser};
pub use writer::ClassFileWriter;
