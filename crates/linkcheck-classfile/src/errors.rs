use thiserror::Error;

/// Errors that can occur while reading a class file
#[derive(Error, Debug)]
pub enum ClassFileError {
    /// Input ended in the middle of a structure
    #[error("unexpected end of class file")]
    UnexpectedEof,

    /// First four bytes are not `0xCAFEBABE`
    #[error("invalid class file magic header")]
    InvalidMagic,

    /// Constant pool tag this reader does not know
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },

    /// Index outside the constant pool or pointing at an unusable slot
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },

    /// Constant pool entry of the wrong kind
    #[error("constant pool index {index} is not a {expected} entry")]
    UnexpectedConstant { index: u16, expected: &'static str },
}

/// Result type for class file operations
pub type ClassFileResult<T> = Result<T, ClassFileError>;
