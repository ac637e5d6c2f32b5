//! Symbol references: outward mentions of classes, methods and fields.
//!
//! A reference records only that `source` mentions `target`; call sites and
//! repetition counts are not tracked, so equal references collapse.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Fields shared by every kind of symbol reference.
pub trait SymbolReferenceInfo {
    /// Binary name of the class containing the reference
    fn source_class_name(&self) -> &str;

    /// Binary name of the class the symbol is looked up in
    fn target_class_name(&self) -> &str;
}

/// Reference to a class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassSymbolReference {
    pub source_class_name: String,
    pub target_class_name: String,
}

impl ClassSymbolReference {
    pub fn new(source_class_name: impl Into<String>, target_class_name: impl Into<String>) -> Self {
        Self {
            source_class_name: source_class_name.into(),
            target_class_name: target_class_name.into(),
        }
    }
}

/// Reference to a method, identified by name and exact descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodSymbolReference {
    pub source_class_name: String,
    pub target_class_name: String,
    pub method_name: String,
    pub descriptor: String,
}

impl MethodSymbolReference {
    pub fn new(
        source_class_name: impl Into<String>,
        target_class_name: impl Into<String>,
        method_name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            source_class_name: source_class_name.into(),
            target_class_name: target_class_name.into(),
            method_name: method_name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// Reference to a field, identified by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldSymbolReference {
    pub source_class_name: String,
    pub target_class_name: String,
    pub field_name: String,
}

impl FieldSymbolReference {
    pub fn new(
        source_class_name: impl Into<String>,
        target_class_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            source_class_name: source_class_name.into(),
            target_class_name: target_class_name.into(),
            field_name: field_name.into(),
        }
    }
}

/// Any symbol reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SymbolReference {
    Class(ClassSymbolReference),
    Method(MethodSymbolReference),
    Field(FieldSymbolReference),
}

macro_rules! impl_reference_info {
    ($($ty:ty),*) => {
        $(impl SymbolReferenceInfo for $ty {
            fn source_class_name(&self) -> &str {
                &self.source_class_name
            }

            fn target_class_name(&self) -> &str {
                &self.target_class_name
            }
        })*
    };
}

impl_reference_info!(ClassSymbolReference, MethodSymbolReference, FieldSymbolReference);

impl SymbolReferenceInfo for SymbolReference {
    fn source_class_name(&self) -> &str {
        match self {
            SymbolReference::Class(r) => r.source_class_name(),
            SymbolReference::Method(r) => r.source_class_name(),
            SymbolReference::Field(r) => r.source_class_name(),
        }
    }

    fn target_class_name(&self) -> &str {
        match self {
            SymbolReference::Class(r) => r.target_class_name(),
            SymbolReference::Method(r) => r.target_class_name(),
            SymbolReference::Field(r) => r.target_class_name(),
        }
    }
}

impl From<ClassSymbolReference> for SymbolReference {
    fn from(reference: ClassSymbolReference) -> Self {
        SymbolReference::Class(reference)
    }
}

impl From<MethodSymbolReference> for SymbolReference {
    fn from(reference: MethodSymbolReference) -> Self {
        SymbolReference::Method(reference)
    }
}

impl From<FieldSymbolReference> for SymbolReference {
    fn from(reference: FieldSymbolReference) -> Self {
        SymbolReference::Field(reference)
    }
}

impl fmt::Display for ClassSymbolReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClassSymbolReference{{sourceClassName={}, targetClassName={}}}",
            self.source_class_name, self.target_class_name
        )
    }
}

impl fmt::Display for MethodSymbolReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MethodSymbolReference{{sourceClassName={}, targetClassName={}, methodName={}, descriptor={}}}",
            self.source_class_name, self.target_class_name, self.method_name, self.descriptor
        )
    }
}

impl fmt::Display for FieldSymbolReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FieldSymbolReference{{sourceClassName={}, targetClassName={}, fieldName={}}}",
            self.source_class_name, self.target_class_name, self.field_name
        )
    }
}

impl fmt::Display for SymbolReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolReference::Class(r) => fmt::Display::fmt(r, f),
            SymbolReference::Method(r) => fmt::Display::fmt(r, f),
            SymbolReference::Field(r) => fmt::Display::fmt(r, f),
        }
    }
}

/// Class, method and field references found in one class or artifact.
///
/// Sets are ordered, so iterating them gives the same resolution order on
/// every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolReferenceSet {
    class_references: BTreeSet<ClassSymbolReference>,
    method_references: BTreeSet<MethodSymbolReference>,
    field_references: BTreeSet<FieldSymbolReference>,
}

impl SymbolReferenceSet {
    pub fn new(
        class_references: BTreeSet<ClassSymbolReference>,
        method_references: BTreeSet<MethodSymbolReference>,
        field_references: BTreeSet<FieldSymbolReference>,
    ) -> Self {
        Self {
            class_references,
            method_references,
            field_references,
        }
    }

    pub fn class_references(&self) -> &BTreeSet<ClassSymbolReference> {
        &self.class_references
    }

    pub fn method_references(&self) -> &BTreeSet<MethodSymbolReference> {
        &self.method_references
    }

    pub fn field_references(&self) -> &BTreeSet<FieldSymbolReference> {
        &self.field_references
    }

    /// Total number of references of all kinds
    pub fn len(&self) -> usize {
        self.class_references.len() + self.method_references.len() + self.field_references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All references: classes first, then methods, then fields.
    pub fn iter(&self) -> impl Iterator<Item = SymbolReference> + '_ {
        self.class_references
            .iter()
            .cloned()
            .map(SymbolReference::from)
            .chain(self.method_references.iter().cloned().map(SymbolReference::from))
            .chain(self.field_references.iter().cloned().map(SymbolReference::from))
    }

    /// Union of two sets
    pub(crate) fn merge(mut self, other: SymbolReferenceSet) -> Self {
        self.class_references.extend(other.class_references);
        self.method_references.extend(other.method_references);
        self.field_references.extend(other.field_references);
        self
    }
}
