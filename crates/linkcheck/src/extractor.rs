//! Symbol reference extraction from class views.

use crate::artifact::ArtifactPath;
use crate::config::CheckerConfig;
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
use crate::error::Result;
use crate::symbols::{
    ClassSymbolReference, FieldSymbolReference, MethodSymbolReference, SymbolReferenceSet,
};
use linkcheck_classfile::{ClassFileParser, ClassStructureParser, ParsedClass};
use log::debug;
use std::collections::BTreeSet;
use std::path::Path;

const PRIMITIVE_NAMES: [&str; 9] = [
    "byte", "char", "double", "float", "int", "long", "short", "boolean", "void",
];

/// Returns true for array class names such as `[Ljava.lang.Object;` or `[I`.
pub fn is_array_class_name(name: &str) -> bool {
    name.starts_with('[')
}

fn is_primitive_name(name: &str) -> bool {
    PRIMITIVE_NAMES.contains(&name)
}

/// Extract the outward class, method and field references of one class.
///
/// Class references come from the supertypes, the declared member
/// descriptors and the constant pool; the class itself, primitives and
/// array types are left out. Method and field references come from the
/// constant pool; those whose target is an array type are left out.
///
/// # Errors
///
/// Returns [`crate::CheckerError::MalformedDescriptor`] if a declared member
/// has an unparsable descriptor.
pub fn extract_references(class: &ParsedClass) -> Result<SymbolReferenceSet> {
    let source = class.name.as_str();
    let mut targets: BTreeSet<&str> = BTreeSet::new();

    targets.extend(class.super_class.as_deref());
    targets.extend(class.interfaces.iter().map(String::as_str));
    targets.extend(class.class_references.iter().map(String::as_str));

    let mut signature_types = Vec::new();
    for field in &class.fields {
        signature_types.push(parse_field_descriptor(&field.descriptor)?);
    }
    for method in &class.methods {
        let descriptor = parse_method_descriptor(&method.descriptor)?;
        signature_types.extend(descriptor.parameters);
        signature_types.extend(descriptor.return_type);
    }
    targets.extend(signature_types.iter().filter_map(|t| t.class_name()));

    let class_references = targets
        .into_iter()
        .filter(|target| *target != source)
        .filter(|target| !is_primitive_name(target) && !is_array_class_name(target))
        .map(|target| ClassSymbolReference::new(source, target))
        .collect();

    let method_references = class
        .method_references
        .iter()
        .filter(|r| !is_array_class_name(&r.class_name))
        .map(|r| MethodSymbolReference::new(source, &r.class_name, &r.name, &r.descriptor))
        .collect();

    let field_references = class
        .field_references
        .iter()
        .filter(|r| !is_array_class_name(&r.class_name))
        .map(|r| FieldSymbolReference::new(source, &r.class_name, &r.name))
        .collect();

    Ok(SymbolReferenceSet::new(
        class_references,
        method_references,
        field_references,
    ))
}

/// Binary names of the classes nested directly in `class`.
///
/// Rows of the nested-class table describing other classes' members (a
/// class lists every nested class it mentions) are skipped, as are rows for
/// `class` itself. Nested classes' own tables are not consulted.
pub fn list_inner_class_names(class: &ParsedClass) -> BTreeSet<String> {
    let nested_prefix = format!("{}$", class.name);
    class
        .inner_classes
        .iter()
        .filter(|entry| entry.name != class.name)
        .filter(|entry| match &entry.outer_name {
            Some(outer) => *outer == class.name,
            None => entry.name.starts_with(&nested_prefix),
        })
        .map(|entry| entry.name.clone())
        .collect()
}

/// Collect the references of every class in an artifact.
///
/// Uses the default class file parser and limits.
///
/// # Errors
///
/// Returns an I/O, archive or class format error if the artifact cannot be
/// read, or a descriptor error from [`extract_references`].
pub fn scan_symbol_references_in_artifact(path: &Path) -> Result<SymbolReferenceSet> {
    scan_artifact(
        &ArtifactPath::from(path),
        &ClassFileParser::new(),
        CheckerConfig::default().max_class_file_size,
    )
}

/// Collect the references of every class in an artifact using `parser`.
pub fn scan_artifact(
    artifact: &ArtifactPath,
    parser: &dyn ClassStructureParser,
    max_class_file_size: usize,
) -> Result<SymbolReferenceSet> {
    let classes = artifact.read_all_classes(parser, max_class_file_size)?;
    references_of_classes(&classes)
}

/// Union of the references of several classes.
pub fn references_of_classes(classes: &[ParsedClass]) -> Result<SymbolReferenceSet> {
    let mut references = SymbolReferenceSet::default();
    for class in classes {
        references = references.merge(extract_references(class)?);
    }
    debug!(
        "Extracted {} references from {} classes",
        references.len(),
        classes.len()
    );
    Ok(references)
}
