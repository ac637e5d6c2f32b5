//! JVM type descriptor grammar.
//!
//! ```text
//! MethodDescriptor = "(" { FieldType } ")" ( FieldType | "V" )
//! FieldType        = "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z"
//!                  | "L" ClassName ";" | "[" FieldType
//! ```

use crate::error::{CheckerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Most array dimensions a descriptor may declare (JVMS 4.3.2)
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// A Java field type as written in a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JavaType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    /// Class or interface type, by binary name
    Reference(String),
    /// One array dimension over the element type
    Array(Box<JavaType>),
}

impl JavaType {
    pub fn is_array(&self) -> bool {
        matches!(self, JavaType::Array(_))
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, JavaType::Reference(_) | JavaType::Array(_))
    }

    /// Class named by this type, looking through array dimensions.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            JavaType::Reference(name) => Some(name),
            JavaType::Array(element) => element.class_name(),
            _ => None,
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Byte => f.write_str("byte"),
            JavaType::Char => f.write_str("char"),
            JavaType::Double => f.write_str("double"),
            JavaType::Float => f.write_str("float"),
            JavaType::Int => f.write_str("int"),
            JavaType::Long => f.write_str("long"),
            JavaType::Short => f.write_str("short"),
            JavaType::Boolean => f.write_str("boolean"),
            JavaType::Reference(name) => f.write_str(name),
            JavaType::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// Parsed method descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub parameters: Vec<JavaType>,
    /// `None` for `void`
    pub return_type: Option<JavaType>,
}

/// Parameter types of a method descriptor, in declaration order.
///
/// `([B)Ljava/lang/String;` yields a single `byte[]` parameter.
pub fn descriptor_to_parameter_types(descriptor: &str) -> Result<Vec<JavaType>> {
    Ok(parse_method_descriptor(descriptor)?.parameters)
}

pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor> {
    let mut parser = DescriptorParser::new(descriptor);
    parser.expect(b'(')?;
    let mut parameters = Vec::new();
    while parser.peek()? != b')' {
        parameters.push(parser.field_type()?);
    }
    parser.expect(b')')?;
    let return_type = if parser.peek()? == b'V' {
        parser.pos += 1;
        None
    } else {
        Some(parser.field_type()?)
    };
    parser.finish()?;
    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

pub fn parse_field_descriptor(descriptor: &str) -> Result<JavaType> {
    let mut parser = DescriptorParser::new(descriptor);
    let field_type = parser.field_type()?;
    parser.finish()?;
    Ok(field_type)
}

struct DescriptorParser<'a> {
    descriptor: &'a str,
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    fn new(descriptor: &'a str) -> Self {
        Self { descriptor, pos: 0 }
    }

    fn error(&self, message: impl Into<String>) -> CheckerError {
        CheckerError::malformed_descriptor(self.descriptor, message)
    }

    fn peek(&self) -> Result<u8> {
        self.descriptor
            .as_bytes()
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error("unexpected end of descriptor"))
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        let found = self.peek()?;
        if found != expected {
            return Err(self.error(format!(
                "expected '{}' at offset {}, found '{}'",
                expected as char, self.pos, found as char
            )));
        }
        self.pos += 1;
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.descriptor.len() {
            return Err(self.error(format!("trailing characters at offset {}", self.pos)));
        }
        Ok(())
    }

    fn field_type(&mut self) -> Result<JavaType> {
        let start = self.pos;
        let mut dimensions = 0;
        while self.peek()? == b'[' {
            dimensions += 1;
            if dimensions > MAX_ARRAY_DIMENSIONS {
                return Err(self.error(format!(
                    "more than {MAX_ARRAY_DIMENSIONS} array dimensions at offset {start}"
                )));
            }
            self.pos += 1;
        }

        let mut field_type = self.element_type()?;
        for _ in 0..dimensions {
            field_type = JavaType::Array(Box::new(field_type));
        }
        Ok(field_type)
    }

    fn element_type(&mut self) -> Result<JavaType> {
        let tag = self.peek()?;
        self.pos += 1;
        let element_type = match tag {
            b'B' => JavaType::Byte,
            b'C' => JavaType::Char,
            b'D' => JavaType::Double,
            b'F' => JavaType::Float,
            b'I' => JavaType::Int,
            b'J' => JavaType::Long,
            b'S' => JavaType::Short,
            b'Z' => JavaType::Boolean,
            b'L' => {
                let descriptor = self.descriptor;
                let rest = &descriptor[self.pos..];
                let end = rest
                    .find(';')
                    .ok_or_else(|| self.error("unterminated class name"))?;
                if end == 0 {
                    return Err(self.error("empty class name"));
                }
                let name = rest[..end].replace('/', ".");
                self.pos += end + 1;
                JavaType::Reference(name)
            }
            other => {
                return Err(self.error(format!(
                    "unexpected tag '{}' at offset {}",
                    other as char,
                    self.pos - 1
                )))
            }
        };
        Ok(element_type)
    }
}
