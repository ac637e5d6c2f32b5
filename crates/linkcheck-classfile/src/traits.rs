use crate::class::ParsedClass;
use crate::errors::ClassFileError;
use crate::reader;

/// Capability that turns raw class bytes into a [`ParsedClass`].
///
/// The linkage checker only ever sees class files through this trait, so a
/// different binary reader can be swapped in without touching resolution.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one parser instance is shared by
/// every artifact check running in parallel.
///
/// # Example
/// ```rust
/// use linkcheck_classfile::{ClassFileError, ClassStructureParser, ParsedClass};
///
/// /// Parser that pretends every input is the same empty class.
/// struct FixedParser;
///
/// impl ClassStructureParser for FixedParser {
///     fn parse(&self, _bytes: &[u8]) -> Result<ParsedClass, ClassFileError> {
///         Ok(ParsedClass::new("Fixed"))
///     }
/// }
///
/// assert_eq!(FixedParser.parse(&[]).unwrap().name, "Fixed");
/// ```
pub trait ClassStructureParser: Send + Sync {
    /// Parse one class file.
    ///
    /// # Errors
    /// Returns [`ClassFileError`] if the bytes are not a well-formed class file.
    fn parse(&self, bytes: &[u8]) -> Result<ParsedClass, ClassFileError>;

    /// Returns true if an archive entry or file path names a class file this
    /// parser should index.
    ///
    /// Default implementation accepts `*.class` except `module-info.class`.
    fn accepts_entry(&self, entry_name: &str) -> bool {
        entry_name.ends_with(".class")
            && entry_name != "module-info.class"
            && !entry_name.ends_with("/module-info.class")
    }
}

/// Default parser for the JVM class file format
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassFileParser;

impl ClassFileParser {
    pub fn new() -> Self {
        Self
    }
}

impl ClassStructureParser for ClassFileParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedClass, ClassFileError> {
        reader::parse_class(bytes)
    }
}
