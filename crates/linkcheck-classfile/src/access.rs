use serde::{Deserialize, Serialize};
use std::fmt;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;

/// Raw access flags of a class, field or method as stored in the class file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    pub fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    pub fn is_public(self) -> bool {
        self.contains(ACC_PUBLIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(ACC_PRIVATE)
    }

    pub fn is_protected(self) -> bool {
        self.contains(ACC_PROTECTED)
    }

    pub fn is_static(self) -> bool {
        self.contains(ACC_STATIC)
    }

    pub fn is_interface(self) -> bool {
        self.contains(ACC_INTERFACE)
    }

    /// The accessibility modifier encoded by these flags.
    ///
    /// Public wins over the other bits; a member with none of the three
    /// visibility bits is package-private.
    pub fn visibility(self) -> Visibility {
        if self.is_public() {
            Visibility::Public
        } else if self.is_protected() {
            Visibility::Protected
        } else if self.is_private() {
            Visibility::Private
        } else {
            Visibility::PackagePrivate
        }
    }
}

impl From<u16> for AccessFlags {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

/// Accessibility modifier governing cross-class visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::PackagePrivate => "package-private",
            Visibility::Private => "private",
        };
        f.write_str(text)
    }
}
