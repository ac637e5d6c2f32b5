//! Reference resolution against a classpath index.
//!
//! Each reference ends in one [`Resolution`]. Members are looked up in the
//! target class, then up its superclass chain, then breadth-first through
//! the interfaces of every class visited on that chain.
//!
//! Classes the index assumes to come from the JDK resolve without a
//! definition. When such a class is `java.lang.Object`, its methods are
//! known and take part in member lookup; other assumed supertypes are
//! skipped.

use crate::artifact::ArtifactPath;
use crate::classpath::ClasspathIndex;
use crate::error::{CheckerError, Result};
use crate::names::{classes_in_same_package, top_level_class_name};
use crate::symbols::{
    ClassSymbolReference, FieldSymbolReference, MethodSymbolReference, SymbolReference,
};
use linkcheck_classfile::{
    MemberInfo, ParsedClass, Visibility, ACC_FINAL, ACC_PROTECTED, ACC_PUBLIC,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Outcome of resolving one reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Resolved,
    /// Target class is not on the classpath
    ClassNotFound,
    /// Member not found; carries the target class's artifact
    SymbolNotFound(ArtifactPath),
    /// Class or member not accessible; carries the target class's artifact
    Inaccessible(ArtifactPath),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved)
    }
}

enum MemberQuery<'q> {
    Method { name: &'q str, descriptor: &'q str },
    Field { name: &'q str },
}

impl MemberQuery<'_> {
    fn find_in<'c>(&self, class: &'c ParsedClass) -> Option<&'c MemberInfo> {
        match self {
            MemberQuery::Method { name, descriptor } => class.find_method(name, descriptor),
            MemberQuery::Field { name } => class.find_field(name),
        }
    }

    /// Lookup in a JDK class that no artifact defines.
    fn find_in_platform(&self, class_name: &str) -> Option<MemberInfo> {
        let MemberQuery::Method { name, descriptor } = self else {
            return None;
        };
        if class_name != OBJECT_CLASS {
            return None;
        }
        OBJECT_METHODS
            .iter()
            .find(|(n, d, _)| n == name && d == descriptor)
            .map(|(n, d, access)| MemberInfo::new(*n, *d, *access))
    }
}

const OBJECT_CLASS: &str = "java.lang.Object";

/// Inheritable methods of `java.lang.Object`
const OBJECT_METHODS: &[(&str, &str, u16)] = &[
    ("getClass", "()Ljava/lang/Class;", ACC_PUBLIC | ACC_FINAL),
    ("hashCode", "()I", ACC_PUBLIC),
    ("equals", "(Ljava/lang/Object;)Z", ACC_PUBLIC),
    ("clone", "()Ljava/lang/Object;", ACC_PROTECTED),
    ("toString", "()Ljava/lang/String;", ACC_PUBLIC),
    ("notify", "()V", ACC_PUBLIC | ACC_FINAL),
    ("notifyAll", "()V", ACC_PUBLIC | ACC_FINAL),
    ("wait", "()V", ACC_PUBLIC | ACC_FINAL),
    ("wait", "(J)V", ACC_PUBLIC | ACC_FINAL),
    ("wait", "(JI)V", ACC_PUBLIC | ACC_FINAL),
    ("finalize", "()V", ACC_PROTECTED),
];

/// Resolves references against a [`ClasspathIndex`].
///
/// Loaded classes are cached for the lifetime of the resolver, so one
/// resolver should be used per check rather than per reference.
pub struct LinkageResolver<'a> {
    index: &'a ClasspathIndex,
    cache: HashMap<String, Option<Arc<ParsedClass>>>,
}

impl<'a> LinkageResolver<'a> {
    pub fn new(index: &'a ClasspathIndex) -> Self {
        Self {
            index,
            cache: HashMap::new(),
        }
    }

    /// Resolve any kind of reference.
    pub fn resolve(&mut self, reference: &SymbolReference) -> Result<Resolution> {
        match reference {
            SymbolReference::Class(r) => Ok(self.resolve_class(r)),
            SymbolReference::Method(r) => self.resolve_method(r),
            SymbolReference::Field(r) => self.resolve_field(r),
        }
    }

    /// A class reference resolves whenever the target is defined or is
    /// assumed to come from the JDK.
    pub fn resolve_class(&self, reference: &ClassSymbolReference) -> Resolution {
        let target = &reference.target_class_name;
        let resolution = if self.index.contains(target) || self.index.assumes_platform_class(target)
        {
            Resolution::Resolved
        } else {
            Resolution::ClassNotFound
        };
        trace!("{} => {:?}", reference, resolution);
        resolution
    }

    pub fn resolve_method(&mut self, reference: &MethodSymbolReference) -> Result<Resolution> {
        let query = MemberQuery::Method {
            name: &reference.method_name,
            descriptor: &reference.descriptor,
        };
        let resolution = self.resolve_member(
            &reference.source_class_name,
            &reference.target_class_name,
            &query,
        )?;
        trace!("{} => {:?}", reference, resolution);
        Ok(resolution)
    }

    pub fn resolve_field(&mut self, reference: &FieldSymbolReference) -> Result<Resolution> {
        let query = MemberQuery::Field {
            name: &reference.field_name,
        };
        let resolution = self.resolve_member(
            &reference.source_class_name,
            &reference.target_class_name,
            &query,
        )?;
        trace!("{} => {:?}", reference, resolution);
        Ok(resolution)
    }

    fn resolve_member(
        &mut self,
        source: &str,
        target: &str,
        query: &MemberQuery<'_>,
    ) -> Result<Resolution> {
        let location = match self.index.find_defining_artifact(target) {
            Some(location) => location.clone(),
            None if self.index.assumes_platform_class(target) => {
                debug!("Assuming {} is provided by the JDK", target);
                return Ok(Resolution::Resolved);
            }
            None => return Ok(Resolution::ClassNotFound),
        };
        let Some(target_class) = self.class(target)? else {
            return Ok(Resolution::ClassNotFound);
        };

        if !target_class.is_public() && !classes_in_same_package(source, target) {
            return Ok(Resolution::Inaccessible(location));
        }

        let Some((declaring_class, member)) = self.find_member(target_class, query)? else {
            return Ok(Resolution::SymbolNotFound(location));
        };

        if self.is_accessible(source, &declaring_class, &member)? {
            Ok(Resolution::Resolved)
        } else {
            Ok(Resolution::Inaccessible(location))
        }
    }

    /// Search the target, its superclass chain, then interfaces breadth-first.
    fn find_member(
        &mut self,
        target: Arc<ParsedClass>,
        query: &MemberQuery<'_>,
    ) -> Result<Option<(String, MemberInfo)>> {
        let mut interfaces: VecDeque<String> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();

        let mut current = Some(target);
        while let Some(class) = current.take() {
            if !visited.insert(class.name.clone()) {
                break;
            }
            if let Some(member) = query.find_in(&class) {
                return Ok(Some((class.name.clone(), member.clone())));
            }
            interfaces.extend(class.interfaces.iter().cloned());
            if let Some(super_name) = &class.super_class {
                current = self.class(super_name)?;
                if current.is_none() && self.index.assumes_platform_class(super_name) {
                    if let Some(member) = query.find_in_platform(super_name) {
                        return Ok(Some((super_name.clone(), member)));
                    }
                }
            }
        }

        while let Some(name) = interfaces.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(interface) = self.class(&name)? else {
                continue;
            };
            if let Some(member) = query.find_in(&interface) {
                return Ok(Some((interface.name.clone(), member.clone())));
            }
            interfaces.extend(interface.interfaces.iter().cloned());
        }

        Ok(None)
    }

    fn is_accessible(
        &mut self,
        source: &str,
        declaring_class: &str,
        member: &MemberInfo,
    ) -> Result<bool> {
        let accessible = match member.access_flags.visibility() {
            Visibility::Public => true,
            Visibility::Protected => {
                classes_in_same_package(source, declaring_class)
                    || self.is_subclass_of(source, declaring_class)?
            }
            Visibility::PackagePrivate => classes_in_same_package(source, declaring_class),
            Visibility::Private => {
                top_level_class_name(source) == top_level_class_name(declaring_class)
            }
        };
        Ok(accessible)
    }

    /// Returns true if `class_name` extends `ancestor`, directly or not.
    pub fn is_subclass_of(&mut self, class_name: &str, ancestor: &str) -> Result<bool> {
        let mut visited = HashSet::new();
        let mut current = self.class(class_name)?;
        while let Some(class) = current.take() {
            if !visited.insert(class.name.clone()) {
                break;
            }
            match &class.super_class {
                Some(super_name) if super_name == ancestor => return Ok(true),
                Some(super_name) => current = self.class(super_name)?,
                None => {}
            }
        }
        Ok(false)
    }

    /// Cached class view; `None` if the name is not on the classpath.
    fn class(&mut self, class_name: &str) -> Result<Option<Arc<ParsedClass>>> {
        if let Some(cached) = self.cache.get(class_name) {
            return Ok(cached.clone());
        }
        let loaded = match self.index.load_class(class_name) {
            Ok(class) => Some(Arc::new(class)),
            Err(CheckerError::ClassNotFound { .. }) => {
                debug!("Skipping {} during hierarchy walk: not on classpath", class_name);
                None
            }
            Err(e) => return Err(e),
        };
        self.cache.insert(class_name.to_string(), loaded.clone());
        Ok(loaded)
    }
}
