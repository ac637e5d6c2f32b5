//! Package and nesting relationships derived from binary class names.
//!
//! `$` is treated as a nesting delimiter wherever it appears. That is wrong
//! for top-level classes whose own name contains `$` (generated
//! `$AutoValue_Foo` classes, for instance); such names are approximated as if
//! they were nested. Exact-name lookups in the classpath index never go
//! through these helpers.

/// Name of the outermost class: the final segment truncated at its first `$`.
///
/// `com.google.Foo$Bar$Baz` → `com.google.Foo`
pub fn top_level_class_name(binary_name: &str) -> &str {
    let segment_start = binary_name.rfind('.').map_or(0, |dot| dot + 1);
    match binary_name[segment_start..].find('$') {
        Some(dollar) => &binary_name[..segment_start + dollar],
        None => binary_name,
    }
}

/// Package of a class; the empty string for the unnamed package.
pub fn package_name(binary_name: &str) -> &str {
    let top_level = top_level_class_name(binary_name);
    top_level.rfind('.').map_or("", |dot| &top_level[..dot])
}

/// Returns true if both classes are in the same package.
///
/// Nested-class qualifiers are ignored, and two names without a `.` are both
/// in the unnamed package.
pub fn classes_in_same_package(class_name_1: &str, class_name_2: &str) -> bool {
    package_name(class_name_1) == package_name(class_name_2)
}

/// Name of the immediately enclosing class, or `None` for a top-level class.
///
/// `com.google.Foo$Bar$Baz` → `com.google.Foo$Bar`
pub fn enclosing_class_name(binary_name: &str) -> Option<&str> {
    binary_name.rfind('$').map(|dollar| &binary_name[..dollar])
}
