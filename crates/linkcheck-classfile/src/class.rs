use crate::access::AccessFlags;
use serde::{Deserialize, Serialize};

/// A field or method declared by a class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Simple member name (`<init>` for constructors)
    pub name: String,

    /// Raw JVM descriptor, e.g. `(I)Ljava/lang/String;`
    pub descriptor: String,

    /// Member access flags
    pub access_flags: AccessFlags,
}

impl MemberInfo {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>, access: u16) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access_flags: AccessFlags::new(access),
        }
    }
}

/// A symbolic reference to a field or method of another class, as recorded
/// in the constant pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberRef {
    /// Binary name of the class the member is looked up in
    pub class_name: String,

    /// Member name
    pub name: String,

    /// Raw JVM descriptor
    pub descriptor: String,
}

impl MemberRef {
    pub fn new(
        class_name: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// One row of the `InnerClasses` attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InnerClassEntry {
    /// Binary name of the nested class
    pub name: String,

    /// Binary name of the declaring class; `None` for local and anonymous classes
    pub outer_name: Option<String>,
}

/// Structural view of one compiled class.
///
/// All class names use the binary form: dot-separated packages and
/// `$`-separated nesting (`com.example.Outer$Inner`). Array classes keep
/// their descriptor form (`[Ljava.lang.Object;`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedClass {
    /// Binary name of this class
    pub name: String,

    /// Superclass binary name; `None` only for the hierarchy root
    pub super_class: Option<String>,

    /// Directly implemented (or, for interfaces, extended) interfaces
    pub interfaces: Vec<String>,

    /// Class access flags
    pub access_flags: AccessFlags,

    /// Declared fields
    pub fields: Vec<MemberInfo>,

    /// Declared methods, including constructors and static initializers
    pub methods: Vec<MemberInfo>,

    /// Rows of the nested-class table
    pub inner_classes: Vec<InnerClassEntry>,

    /// Every class named by a `CONSTANT_Class` entry, in pool order
    pub class_references: Vec<String>,

    /// Every `CONSTANT_Methodref` and `CONSTANT_InterfaceMethodref` entry
    pub method_references: Vec<MemberRef>,

    /// Every `CONSTANT_Fieldref` entry
    pub field_references: Vec<MemberRef>,
}

impl ParsedClass {
    /// Create an empty class view with the given binary name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: None,
            interfaces: Vec::new(),
            access_flags: AccessFlags::default(),
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
            class_references: Vec::new(),
            method_references: Vec::new(),
            field_references: Vec::new(),
        }
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.is_interface()
    }

    pub fn is_public(&self) -> bool {
        self.access_flags.is_public()
    }

    /// Look up a declared field by name
    pub fn find_field(&self, name: &str) -> Option<&MemberInfo> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Look up a declared method by exact name and descriptor
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MemberInfo> {
        self.methods
            .iter()
            .find(|method| method.name == name && method.descriptor == descriptor)
    }
}
