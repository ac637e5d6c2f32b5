//! Classified linkage failures.

use crate::artifact::ArtifactPath;
use crate::resolver::Resolution;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a reference failed to link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// The target class is not defined anywhere on the classpath
    ClassNotFound,
    /// The target class exists but the member does not
    SymbolNotFound,
    /// The class or member exists but the source may not access it
    Inaccessible,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reason::ClassNotFound => "CLASS_NOT_FOUND",
            Reason::SymbolNotFound => "SYMBOL_NOT_FOUND",
            Reason::Inaccessible => "INACCESSIBLE",
        };
        f.write_str(name)
    }
}

/// A reference that failed to link, with the reason and, when the target
/// class was found, the artifact it came from.
///
/// Only the three constructors below exist, so a `ClassNotFound` error never
/// carries a location and the other reasons always do. Deserialization goes
/// through the same constructors and rejects any other pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkageErrorOnReference<T> {
    reference: T,
    reason: Reason,
    target_class_location: Option<ArtifactPath>,
}

impl<T> LinkageErrorOnReference<T> {
    /// The target class is not on the classpath.
    pub fn missing_target_class(reference: T) -> Self {
        Self {
            reference,
            reason: Reason::ClassNotFound,
            target_class_location: None,
        }
    }

    /// The target class was found in `location` but lacks the member.
    pub fn missing_member(reference: T, location: ArtifactPath) -> Self {
        Self {
            reference,
            reason: Reason::SymbolNotFound,
            target_class_location: Some(location),
        }
    }

    /// The class or member in `location` is not accessible from the source.
    pub fn inaccessible(reference: T, location: ArtifactPath) -> Self {
        Self {
            reference,
            reason: Reason::Inaccessible,
            target_class_location: Some(location),
        }
    }

    /// Error for a resolver outcome; `None` if the reference resolved.
    pub fn from_resolution(reference: T, resolution: Resolution) -> Option<Self> {
        match resolution {
            Resolution::Resolved => None,
            Resolution::ClassNotFound => Some(Self::missing_target_class(reference)),
            Resolution::SymbolNotFound(location) => Some(Self::missing_member(reference, location)),
            Resolution::Inaccessible(location) => Some(Self::inaccessible(reference, location)),
        }
    }

    pub fn reference(&self) -> &T {
        &self.reference
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }

    pub fn target_class_location(&self) -> Option<&ArtifactPath> {
        self.target_class_location.as_ref()
    }
}

/// Serialized form, before the reason/location pairing is checked
#[derive(Deserialize)]
struct LinkageErrorRecord<T> {
    reference: T,
    reason: Reason,
    target_class_location: Option<ArtifactPath>,
}

impl<T> LinkageErrorRecord<T> {
    fn into_error(self) -> Result<LinkageErrorOnReference<T>, String> {
        match (self.reason, self.target_class_location) {
            (Reason::ClassNotFound, None) => {
                Ok(LinkageErrorOnReference::missing_target_class(self.reference))
            }
            (Reason::SymbolNotFound, Some(location)) => {
                Ok(LinkageErrorOnReference::missing_member(self.reference, location))
            }
            (Reason::Inaccessible, Some(location)) => {
                Ok(LinkageErrorOnReference::inaccessible(self.reference, location))
            }
            (Reason::ClassNotFound, Some(location)) => Err(format!(
                "{} error cannot carry a target class location ({})",
                Reason::ClassNotFound,
                location.location()
            )),
            (reason, None) => Err(format!("{reason} error requires a target class location")),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for LinkageErrorOnReference<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        LinkageErrorRecord::<T>::deserialize(deserializer)?
            .into_error()
            .map_err(de::Error::custom)
    }
}

impl<T: fmt::Display> fmt::Display for LinkageErrorOnReference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, reason: {}, ", self.reference, self.reason)?;
        match &self.target_class_location {
            Some(location) => write!(f, "target class from {}", location.location()),
            None => f.write_str("target class location not found"),
        }
    }
}
