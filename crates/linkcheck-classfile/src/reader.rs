//! Reader for the JVM class file format.
//!
//! Only the parts needed for linkage analysis are decoded: the constant pool,
//! the class header, member tables and the `InnerClasses` attribute. All other
//! attributes (including `Code`) are skipped; every symbol the bytecode can
//! touch is already named by a constant pool entry.

use crate::access::AccessFlags;
use crate::class::{InnerClassEntry, MemberInfo, MemberRef, ParsedClass};
use crate::errors::{ClassFileError, ClassFileResult};

const MAGIC: u32 = 0xCAFE_BABE;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// Parse a class file into its structural view.
pub fn parse_class(bytes: &[u8]) -> ClassFileResult<ParsedClass> {
    let mut reader = ByteReader::new(bytes);
    if reader.read_u4()? != MAGIC {
        return Err(ClassFileError::InvalidMagic);
    }
    let _minor_version = reader.read_u2()?;
    let _major_version = reader.read_u2()?;
    let pool = ConstantPool::parse(&mut reader)?;

    let access_flags = AccessFlags::new(reader.read_u2()?);
    let this_class = reader.read_u2()?;
    let super_class = reader.read_u2()?;

    let mut class = ParsedClass::new(pool.class_name(this_class)?);
    class.access_flags = access_flags;
    class.super_class = if super_class == 0 {
        None
    } else {
        Some(pool.class_name(super_class)?)
    };

    let interfaces_count = reader.read_u2()?;
    for _ in 0..interfaces_count {
        let index = reader.read_u2()?;
        class.interfaces.push(pool.class_name(index)?);
    }

    class.fields = read_members(&mut reader, &pool)?;
    class.methods = read_members(&mut reader, &pool)?;

    let attributes_count = reader.read_u2()?;
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        if pool.utf8(name_index)? == "InnerClasses" {
            let mut attribute = ByteReader::new(reader.read_slice(length)?);
            class.inner_classes = read_inner_classes(&mut attribute, &pool)?;
        } else {
            reader.skip(length)?;
        }
    }

    pool.collect_references(&mut class)?;
    Ok(class)
}

fn read_members(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> ClassFileResult<Vec<MemberInfo>> {
    let count = reader.read_u2()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access = reader.read_u2()?;
        let name = pool.utf8(reader.read_u2()?)?;
        let descriptor = pool.utf8(reader.read_u2()?)?;
        let attributes_count = reader.read_u2()?;
        for _ in 0..attributes_count {
            reader.read_u2()?; // attribute_name_index
            let length = reader.read_u4()? as usize;
            reader.skip(length)?;
        }
        members.push(MemberInfo::new(name, descriptor, access));
    }
    Ok(members)
}

fn read_inner_classes(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> ClassFileResult<Vec<InnerClassEntry>> {
    let count = reader.read_u2()?;
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let inner_index = reader.read_u2()?;
        let outer_index = reader.read_u2()?;
        reader.read_u2()?; // inner_name_index
        reader.read_u2()?; // inner_class_access_flags

        let outer_name = if outer_index == 0 {
            None
        } else {
            Some(pool.class_name(outer_index)?)
        };
        entries.push(InnerClassEntry {
            name: pool.class_name(inner_index)?,
            outer_name,
        });
    }
    Ok(entries)
}

/// Converts an internal name (`java/lang/String`) to a binary name.
fn to_binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class { name_index: u16 },
    Fieldref { class_index: u16, name_and_type_index: u16 },
    Methodref { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    Other,
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ByteReader<'_>) -> ClassFileResult<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        while entries.len() < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                TAG_UTF8 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    // Modified UTF-8 only differs for NUL and supplementary
                    // characters, neither of which appears in class names.
                    Constant::Utf8(String::from_utf8_lossy(bytes).into_owned())
                }
                TAG_INTEGER | TAG_FLOAT => {
                    reader.skip(4)?;
                    Constant::Other
                }
                TAG_LONG | TAG_DOUBLE => {
                    // 8-byte constants take two slots, both inside the pool
                    if entries.len() + 1 >= count {
                        return Err(ClassFileError::InvalidConstantIndex {
                            index: entries.len() as u16,
                        });
                    }
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    Constant::Unusable
                }
                TAG_CLASS => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => {
                    reader.skip(2)?;
                    Constant::Other
                }
                TAG_FIELDREF => Constant::Fieldref {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                TAG_METHODREF | TAG_INTERFACE_METHODREF => Constant::Methodref {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                TAG_NAME_AND_TYPE => Constant::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                TAG_METHOD_HANDLE => {
                    reader.skip(3)?;
                    Constant::Other
                }
                TAG_DYNAMIC | TAG_INVOKE_DYNAMIC => {
                    reader.skip(4)?;
                    Constant::Other
                }
                other => return Err(ClassFileError::UnsupportedConstant { tag: other }),
            };
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> ClassFileResult<&Constant> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(ClassFileError::InvalidConstantIndex { index }),
            Some(constant) => Ok(constant),
        }
    }

    fn utf8(&self, index: u16) -> ClassFileResult<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Utf8",
            }),
        }
    }

    fn class_name(&self, index: u16) -> ClassFileResult<String> {
        match self.get(index)? {
            Constant::Class { name_index } => Ok(to_binary_name(self.utf8(*name_index)?)),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Class",
            }),
        }
    }

    fn member_ref(&self, class_index: u16, name_and_type_index: u16) -> ClassFileResult<MemberRef> {
        let class_name = self.class_name(class_index)?;
        match self.get(name_and_type_index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok(MemberRef::new(
                class_name,
                self.utf8(*name_index)?,
                self.utf8(*descriptor_index)?,
            )),
            _ => Err(ClassFileError::UnexpectedConstant {
                index: name_and_type_index,
                expected: "NameAndType",
            }),
        }
    }

    fn collect_references(&self, class: &mut ParsedClass) -> ClassFileResult<()> {
        for (index, entry) in self.entries.iter().enumerate() {
            match entry {
                Constant::Class { .. } => {
                    class.class_references.push(self.class_name(index as u16)?);
                }
                Constant::Fieldref {
                    class_index,
                    name_and_type_index,
                } => {
                    class
                        .field_references
                        .push(self.member_ref(*class_index, *name_and_type_index)?);
                }
                Constant::Methodref {
                    class_index,
                    name_and_type_index,
                } => {
                    class
                        .method_references
                        .push(self.member_ref(*class_index, *name_and_type_index)?);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_slice(&mut self, len: usize) -> ClassFileResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassFileError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> ClassFileResult<()> {
        self.read_slice(len).map(|_| ())
    }

    fn read_u1(&mut self) -> ClassFileResult<u8> {
        Ok(self.read_slice(1)?[0])
    }

    fn read_u2(&mut self) -> ClassFileResult<u16> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u4(&mut self) -> ClassFileResult<u32> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
