//! Synthesizes minimal, well-formed class files.
//!
//! The output carries a constant pool, member tables without attributes, and
//! an optional `InnerClasses` attribute. There is no bytecode: outward
//! references are recorded directly as constant pool entries, which is where
//! the reader looks for them anyway.

use crate::access::ACC_PUBLIC;
use std::collections::HashMap;

const ACC_SUPER: u16 = 0x0020;
const MAJOR_VERSION_JAVA_8: u16 = 52;

/// Builder for a synthetic class file
#[derive(Debug, Clone)]
pub struct ClassFileWriter {
    name: String,
    super_class: Option<String>,
    access: u16,
    interfaces: Vec<String>,
    fields: Vec<(String, String, u16)>,
    methods: Vec<(String, String, u16)>,
    inner_classes: Vec<(String, Option<String>)>,
    class_refs: Vec<String>,
    method_refs: Vec<(String, String, String, bool)>,
    field_refs: Vec<(String, String, String)>,
}

impl ClassFileWriter {
    /// Start a public class extending `java.lang.Object`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: Some("java.lang.Object".to_string()),
            access: ACC_PUBLIC | ACC_SUPER,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
            class_refs: Vec::new(),
            method_refs: Vec::new(),
            field_refs: Vec::new(),
        }
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, name: impl Into<String>) -> Self {
        self.super_class = Some(name.into());
        self
    }

    /// Make this the hierarchy root (no superclass).
    pub fn no_super_class(mut self) -> Self {
        self.super_class = None;
        self
    }

    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, descriptor: impl Into<String>, access: u16) -> Self {
        self.fields.push((name.into(), descriptor.into(), access));
        self
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        access: u16,
    ) -> Self {
        self.methods.push((name.into(), descriptor.into(), access));
        self
    }

    /// Add an `InnerClasses` row; `outer` is `None` for anonymous classes.
    pub fn inner_class(mut self, name: impl Into<String>, outer: Option<&str>) -> Self {
        self.inner_classes
            .push((name.into(), outer.map(str::to_string)));
        self
    }

    pub fn class_ref(mut self, name: impl Into<String>) -> Self {
        self.class_refs.push(name.into());
        self
    }

    pub fn method_ref(
        mut self,
        class_name: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        self.method_refs
            .push((class_name.into(), name.into(), descriptor.into(), false));
        self
    }

    pub fn interface_method_ref(
        mut self,
        class_name: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        self.method_refs
            .push((class_name.into(), name.into(), descriptor.into(), true));
        self
    }

    pub fn field_ref(
        mut self,
        class_name: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        self.field_refs
            .push((class_name.into(), name.into(), descriptor.into()));
        self
    }

    /// The class file path inside an archive or directory, e.g. `com/example/Foo.class`.
    pub fn entry_name(&self) -> String {
        format!("{}.class", self.name.replace('.', "/"))
    }

    /// Serialize the class file.
    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolBuilder::default();

        let this_class = pool.class(&self.name);
        let super_class = self.super_class.as_deref().map_or(0, |name| pool.class(name));
        let interfaces: Vec<u16> = self.interfaces.iter().map(|name| pool.class(name)).collect();
        let fields: Vec<(u16, u16, u16)> = self
            .fields
            .iter()
            .map(|(name, descriptor, access)| (*access, pool.utf8(name), pool.utf8(descriptor)))
            .collect();
        let methods: Vec<(u16, u16, u16)> = self
            .methods
            .iter()
            .map(|(name, descriptor, access)| (*access, pool.utf8(name), pool.utf8(descriptor)))
            .collect();

        let inner_classes_attribute = if self.inner_classes.is_empty() {
            None
        } else {
            let attribute_name = pool.utf8("InnerClasses");
            let rows: Vec<(u16, u16, u16)> = self
                .inner_classes
                .iter()
                .map(|(name, outer)| {
                    let inner = pool.class(name);
                    let outer = outer.as_deref().map_or(0, |outer| pool.class(outer));
                    let simple_name = name.rsplit('$').next().unwrap_or(name.as_str());
                    (inner, outer, pool.utf8(simple_name))
                })
                .collect();
            Some((attribute_name, rows))
        };

        for name in &self.class_refs {
            pool.class(name);
        }
        for (class_name, name, descriptor, interface) in &self.method_refs {
            let tag = if *interface { 11 } else { 10 };
            pool.member_ref(tag, class_name, name, descriptor);
        }
        for (class_name, name, descriptor) in &self.field_refs {
            pool.member_ref(9, class_name, name, descriptor);
        }

        let mut out = Vec::new();
        put_u4(&mut out, 0xCAFE_BABE);
        put_u2(&mut out, 0);
        put_u2(&mut out, MAJOR_VERSION_JAVA_8);
        put_u2(&mut out, pool.next_index);
        out.extend_from_slice(&pool.bytes);

        put_u2(&mut out, self.access);
        put_u2(&mut out, this_class);
        put_u2(&mut out, super_class);
        put_u2(&mut out, interfaces.len() as u16);
        for index in interfaces {
            put_u2(&mut out, index);
        }
        for members in [fields, methods] {
            put_u2(&mut out, members.len() as u16);
            for (access, name, descriptor) in members {
                put_u2(&mut out, access);
                put_u2(&mut out, name);
                put_u2(&mut out, descriptor);
                put_u2(&mut out, 0);
            }
        }

        match inner_classes_attribute {
            Some((attribute_name, rows)) => {
                put_u2(&mut out, 1);
                put_u2(&mut out, attribute_name);
                put_u4(&mut out, 2 + 8 * rows.len() as u32);
                put_u2(&mut out, rows.len() as u16);
                for (inner, outer, simple_name) in rows {
                    put_u2(&mut out, inner);
                    put_u2(&mut out, outer);
                    put_u2(&mut out, simple_name);
                    put_u2(&mut out, ACC_PUBLIC);
                }
            }
            None => put_u2(&mut out, 0),
        }

        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PoolKey {
    Utf8(String),
    Class(String),
    NameAndType(String, String),
    MemberRef(u8, String, String, String),
}

struct PoolBuilder {
    bytes: Vec<u8>,
    next_index: u16,
    indexes: HashMap<PoolKey, u16>,
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            next_index: 1,
            indexes: HashMap::new(),
        }
    }
}

impl PoolBuilder {
    fn intern(&mut self, key: PoolKey, encoded: Vec<u8>) -> u16 {
        if let Some(index) = self.indexes.get(&key) {
            return *index;
        }
        let index = self.next_index;
        self.bytes.extend_from_slice(&encoded);
        self.next_index += 1;
        self.indexes.insert(key, index);
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut encoded = vec![1];
        put_u2(&mut encoded, value.len() as u16);
        encoded.extend_from_slice(value.as_bytes());
        self.intern(PoolKey::Utf8(value.to_string()), encoded)
    }

    fn class(&mut self, binary_name: &str) -> u16 {
        let internal = binary_name.replace('.', "/");
        let name_index = self.utf8(&internal);
        let mut encoded = vec![7];
        put_u2(&mut encoded, name_index);
        self.intern(PoolKey::Class(internal), encoded)
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut encoded = vec![12];
        put_u2(&mut encoded, name_index);
        put_u2(&mut encoded, descriptor_index);
        self.intern(
            PoolKey::NameAndType(name.to_string(), descriptor.to_string()),
            encoded,
        )
    }

    fn member_ref(&mut self, tag: u8, class_name: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class_name);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let mut encoded = vec![tag];
        put_u2(&mut encoded, class_index);
        put_u2(&mut encoded, name_and_type_index);
        self.intern(
            PoolKey::MemberRef(
                tag,
                class_name.to_string(),
                name.to_string(),
                descriptor.to_string(),
            ),
            encoded,
        )
    }
}

fn put_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u4(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
