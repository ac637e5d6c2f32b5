// Integration tests for classpath indexing and linkage checks

use linkcheck::{
    create_index, export, list_inner_class_names, scan_symbol_references_in_artifact,
    ArtifactPath, CheckerConfig, CheckerError, LinkageChecker, LinkageErrorOnReference,
    LinkageResolver, PlatformClasses, Reason, SymbolReferenceInfo,
};
use linkcheck_classfile::{ClassFileWriter, ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn write_jar(dir: &Path, name: &str, classes: Vec<ClassFileWriter>) -> PathBuf {
    let path = dir.join(name);
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("META-INF/MANIFEST.MF", options).unwrap();
    zip.write_all(b"Manifest-Version: 1.0\n").unwrap();
    for class in classes {
        zip.start_file(class.entry_name(), options).unwrap();
        zip.write_all(&class.build()).unwrap();
    }
    zip.finish().unwrap();
    path
}

fn write_class_dir(dir: &Path, name: &str, classes: Vec<ClassFileWriter>) -> PathBuf {
    let root = dir.join(name);
    for class in classes {
        let path = root.join(class.entry_name());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, class.build()).unwrap();
    }
    root
}

/// A library jar and an application jar that uses it, with one of each kind
/// of problem.
fn app_and_library(dir: &Path) -> (PathBuf, PathBuf) {
    let library = write_jar(
        dir,
        "library.jar",
        vec![
            ClassFileWriter::new("lib.Util")
                .method("run", "()V", ACC_PUBLIC | ACC_STATIC)
                .field("VERSION", "Ljava/lang/String;", ACC_PUBLIC | ACC_STATIC),
            ClassFileWriter::new("lib.Internal").access(0),
        ],
    );
    let app = write_jar(
        dir,
        "app.jar",
        vec![ClassFileWriter::new("app.Main")
            .method("main", "([Ljava/lang/String;)V", ACC_PUBLIC | ACC_STATIC)
            .method_ref("lib.Util", "run", "()V")
            .method_ref("lib.Util", "stop", "()V")
            .field_ref("lib.Util", "VERSION", "Ljava/lang/String;")
            .field_ref("lib.Internal", "state", "I")
            .class_ref("lib.Gone")],
    );
    (app, library)
}

#[test]
fn test_private_field_is_inaccessible() {
    let dir = TempDir::new().unwrap();
    let a = write_jar(
        dir.path(),
        "a.jar",
        vec![ClassFileWriter::new("Foo").field("bar", "I", ACC_PRIVATE)],
    );
    let b = write_jar(
        dir.path(),
        "b.jar",
        vec![ClassFileWriter::new("Baz").field_ref("Foo", "bar", "I")],
    );

    let checker = LinkageChecker::create([&a, &b], CheckerConfig::default()).unwrap();
    let report = checker.check_artifact(&b).unwrap();

    assert_eq!(report.missing_field_errors().len(), 1);
    let error = &report.missing_field_errors()[0];
    assert_eq!(error.reason(), Reason::Inaccessible);
    assert_eq!(error.target_class_location(), Some(&ArtifactPath::new(&a)));
    assert_eq!(error.reference().field_name, "bar");
}

#[test]
fn test_empty_classpath_is_invalid() {
    let result = LinkageChecker::create(Vec::<PathBuf>::new(), CheckerConfig::default());
    assert!(matches!(result, Err(CheckerError::InvalidClasspath { .. })));
}

#[test]
fn test_check_artifact_report() {
    let dir = TempDir::new().unwrap();
    let (app, library) = app_and_library(dir.path());

    let checker = LinkageChecker::create([&app, &library], CheckerConfig::default()).unwrap();
    let report = checker.check_artifact(&app).unwrap();

    let class_targets: Vec<&str> = report
        .missing_class_errors()
        .iter()
        .map(|e| e.reference().target_class_name())
        .collect();
    // java.* classes are assumed to come from the JDK
    assert_eq!(class_targets, vec!["lib.Gone"]);
    assert!(report
        .missing_class_errors()
        .iter()
        .all(|e| e.reason() == Reason::ClassNotFound && e.target_class_location().is_none()));

    assert_eq!(report.missing_method_errors().len(), 1);
    let method_error = &report.missing_method_errors()[0];
    assert_eq!(method_error.reference().method_name, "stop");
    assert_eq!(method_error.reason(), Reason::SymbolNotFound);
    assert_eq!(
        method_error.target_class_location(),
        Some(&ArtifactPath::new(&library))
    );

    assert_eq!(report.missing_field_errors().len(), 1);
    assert_eq!(report.missing_field_errors()[0].reason(), Reason::Inaccessible);

    assert_eq!(report.total_error_count(), 3);

    let text = report.to_string();
    assert!(text.starts_with("app.jar (3 errors):\n"));
    assert!(text.contains(&format!(
        "methodName=stop, descriptor=()V}}, reason: SYMBOL_NOT_FOUND, target class from file:{}\n",
        library.display()
    )));
}

#[test]
fn test_inherited_object_method_resolves() {
    let dir = TempDir::new().unwrap();
    let classes = write_class_dir(
        dir.path(),
        "classes",
        vec![
            ClassFileWriter::new("app.Foo"),
            ClassFileWriter::new("app.Main")
                .method_ref("app.Foo", "toString", "()Ljava/lang/String;")
                .method_ref("app.Foo", "describe", "()Ljava/lang/String;"),
        ],
    );

    let checker = LinkageChecker::create([&classes], CheckerConfig::default()).unwrap();
    let report = checker.check_artifact(&classes).unwrap();

    assert!(report.missing_class_errors().is_empty());
    assert_eq!(report.missing_method_errors().len(), 1);
    assert_eq!(
        report.missing_method_errors()[0].reference().method_name,
        "describe"
    );
}

#[test]
fn test_platform_image_from_config() {
    let dir = TempDir::new().unwrap();
    let jdk = write_jar(
        dir.path(),
        "rt.jar",
        vec![
            ClassFileWriter::new("java.lang.Object")
                .no_super_class()
                .method("toString", "()Ljava/lang/String;", ACC_PUBLIC),
            ClassFileWriter::new("java.lang.String"),
        ],
    );
    let (app, library) = app_and_library(dir.path());

    let config = CheckerConfig::default().with_platform(PlatformClasses {
        artifacts: vec![jdk.clone()],
        assumed_prefixes: Vec::new(),
    });
    let checker = LinkageChecker::create([&app, &library], config).unwrap();
    assert_eq!(checker.index().platform_artifacts(), &[ArtifactPath::new(&jdk)]);

    let report = checker.check_artifact(&app).unwrap();
    let class_targets: Vec<&str> = report
        .missing_class_errors()
        .iter()
        .map(|e| e.reference().target_class_name())
        .collect();
    assert_eq!(class_targets, vec!["lib.Gone"]);

    // platform images are never checked themselves
    let all = checker.check_classpath().unwrap();
    assert_eq!(all.jar_reports().len(), 2);
    assert!(matches!(
        checker.check_artifact(&jdk),
        Err(CheckerError::ArtifactNotOnClasspath { .. })
    ));
}

#[test]
fn test_without_platform_jdk_classes_are_missing() {
    let dir = TempDir::new().unwrap();
    let (app, library) = app_and_library(dir.path());

    let config = CheckerConfig::default().with_platform(PlatformClasses::none());
    let checker = LinkageChecker::create([&app, &library], config).unwrap();
    let report = checker.check_artifact(&app).unwrap();

    let class_targets: Vec<&str> = report
        .missing_class_errors()
        .iter()
        .map(|e| e.reference().target_class_name())
        .collect();
    assert_eq!(
        class_targets,
        vec!["java.lang.Object", "java.lang.String", "lib.Gone"]
    );
    assert_eq!(report.total_error_count(), 5);
}

#[test]
fn test_shadowed_class_is_invisible() {
    let dir = TempDir::new().unwrap();
    let first = write_jar(dir.path(), "first.jar", vec![ClassFileWriter::new("lib.Api")]);
    let second = write_jar(
        dir.path(),
        "second.jar",
        vec![ClassFileWriter::new("lib.Api").method("added", "()V", ACC_PUBLIC)],
    );
    let app = write_class_dir(
        dir.path(),
        "classes",
        vec![ClassFileWriter::new("app.Client").method_ref("lib.Api", "added", "()V")],
    );

    let checker =
        LinkageChecker::create([&app, &first, &second], CheckerConfig::default()).unwrap();
    let report = checker.check_artifact(&app).unwrap();

    assert_eq!(report.missing_method_errors().len(), 1);
    assert_eq!(
        report.missing_method_errors()[0].target_class_location(),
        Some(&ArtifactPath::new(&first))
    );
}

#[test]
fn test_dollar_in_top_level_class_name() {
    let dir = TempDir::new().unwrap();
    let jar = write_jar(
        dir.path(),
        "bigquery.jar",
        vec![
            ClassFileWriter::new("com.google.cloud.bigquery.$AutoValue_Labels")
                .method("labels", "()Ljava/util/Map;", ACC_PUBLIC),
            ClassFileWriter::new("com.google.cloud.bigquery.Labels")
                .super_class("com.google.cloud.bigquery.$AutoValue_Labels")
                .method_ref(
                    "com.google.cloud.bigquery.$AutoValue_Labels",
                    "labels",
                    "()Ljava/util/Map;",
                ),
        ],
    );

    let index = create_index([&jar]).unwrap();
    assert!(index
        .find_defining_artifact("com.google.cloud.bigquery.$AutoValue_Labels")
        .is_some());

    let checker = LinkageChecker::create([&jar], CheckerConfig::default()).unwrap();
    let report = checker.check_artifact(&jar).unwrap();
    assert!(report.missing_method_errors().is_empty());
    assert!(report
        .missing_class_errors()
        .iter()
        .all(|e| !e.reference().target_class_name.contains("AutoValue")));
}

#[test]
fn test_undefined_class_resolves_to_class_not_found() {
    let dir = TempDir::new().unwrap();
    let (app, library) = app_and_library(dir.path());
    let index = create_index([&app, &library]).unwrap();

    assert!(index.find_defining_artifact("lib.Gone").is_none());

    let mut resolver = LinkageResolver::new(&index);
    let references = scan_symbol_references_in_artifact(&app).unwrap();
    for reference in references
        .iter()
        .filter(|r| r.target_class_name() == "lib.Gone")
    {
        let resolution = resolver.resolve(&reference).unwrap();
        let error = LinkageErrorOnReference::from_resolution(reference, resolution).unwrap();
        assert_eq!(error.reason(), Reason::ClassNotFound);
        assert!(error.target_class_location().is_none());
    }
}

#[test]
fn test_scan_has_no_array_targets() {
    let dir = TempDir::new().unwrap();
    let jar = write_jar(
        dir.path(),
        "arrays.jar",
        vec![ClassFileWriter::new("app.Arrays")
            .field("names", "[Ljava/lang/String;", 0)
            .class_ref("[Ljava.lang.Object;")
            .method_ref("[Ljava.lang.Object;", "clone", "()Ljava/lang/Object;")
            .field_ref("[I", "length", "I")],
    );

    let references = scan_symbol_references_in_artifact(&jar).unwrap();
    assert!(!references.is_empty());
    for reference in references.iter() {
        assert!(!reference.target_class_name().starts_with('['));
    }
    assert!(references.method_references().is_empty());
    assert!(references.field_references().is_empty());
}

#[test]
fn test_deeply_nested_array_descriptor_is_an_error() {
    let dir = TempDir::new().unwrap();
    let descriptor = format!("{}I", "[".repeat(65_000));
    let classes = write_class_dir(
        dir.path(),
        "classes",
        vec![ClassFileWriter::new("p.Evil").field("f", descriptor, 0)],
    );

    assert!(matches!(
        scan_symbol_references_in_artifact(&classes),
        Err(CheckerError::MalformedDescriptor { .. })
    ));

    let checker = LinkageChecker::create([&classes], CheckerConfig::default()).unwrap();
    assert!(matches!(
        checker.check_artifact(&classes),
        Err(CheckerError::MalformedDescriptor { .. })
    ));
}

#[test]
fn test_inner_classes_from_archive() {
    let dir = TempDir::new().unwrap();
    let jar = write_jar(
        dir.path(),
        "nested.jar",
        vec![ClassFileWriter::new("app.Outer")
            .inner_class("app.Outer$Inner", Some("app.Outer"))
            .inner_class("app.Outer$1", None)
            .inner_class("java.util.Map$Entry", Some("java.util.Map"))],
    );

    let index = create_index([&jar]).unwrap();
    let outer = index.load_class("app.Outer").unwrap();
    let names: Vec<String> = list_inner_class_names(&outer).into_iter().collect();
    assert_eq!(names, vec!["app.Outer$1", "app.Outer$Inner"]);
}

#[test]
fn test_repeated_checks_are_identical() {
    let dir = TempDir::new().unwrap();
    let (app, library) = app_and_library(dir.path());

    let checker = LinkageChecker::create([&app, &library], CheckerConfig::default()).unwrap();
    let first = checker.check_artifact(&app).unwrap();
    let second = checker.check_artifact(&app).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());

    let other = LinkageChecker::create([&app, &library], CheckerConfig::default()).unwrap();
    assert_eq!(other.check_artifact(&app).unwrap(), first);
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = TempDir::new().unwrap();
    let (app, library) = app_and_library(dir.path());

    let sequential = LinkageChecker::create([&app, &library], CheckerConfig::default())
        .unwrap()
        .check_classpath()
        .unwrap();
    let parallel = LinkageChecker::create(
        [&app, &library],
        CheckerConfig::default().with_parallel(true),
    )
    .unwrap()
    .check_classpath()
    .unwrap();

    assert_eq!(sequential, parallel);
    let order: Vec<&Path> = parallel
        .jar_reports()
        .iter()
        .map(|r| r.artifact_path())
        .collect();
    assert_eq!(order, vec![app.as_path(), library.as_path()]);
}

#[test]
fn test_entry_artifacts_restrict_checks() {
    let dir = TempDir::new().unwrap();
    let (app, library) = app_and_library(dir.path());

    let config = CheckerConfig::default().with_entry_artifacts([&app]);
    let checker = LinkageChecker::create([&app, &library], config).unwrap();
    let report = checker.check_classpath().unwrap();

    assert_eq!(report.jar_reports().len(), 1);
    assert!(report.report_for(&app).is_some());

    let metrics = checker.metrics();
    assert_eq!(metrics.artifacts_checked, 1);
    assert_eq!(metrics.classes_scanned, 1);
    assert_eq!(metrics.errors_found, report.total_error_count());

    checker.reset_metrics();
    assert_eq!(checker.metrics().artifacts_checked, 0);
}

#[test]
fn test_unknown_artifact_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (app, library) = app_and_library(dir.path());
    let checker = LinkageChecker::create([&library], CheckerConfig::default()).unwrap();

    assert!(matches!(
        checker.check_artifact(&app),
        Err(CheckerError::ArtifactNotOnClasspath { .. })
    ));

    let config = CheckerConfig::default().with_entry_artifacts([&app]);
    let checker = LinkageChecker::create([&library], config).unwrap();
    assert!(matches!(
        checker.check_classpath(),
        Err(CheckerError::ArtifactNotOnClasspath { .. })
    ));
}

#[test]
fn test_oversized_class_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (app, library) = app_and_library(dir.path());

    let config = CheckerConfig::default().with_max_class_file_size(16);
    let checker = LinkageChecker::create([&app, &library], config).unwrap();
    assert!(matches!(
        checker.check_artifact(&app),
        Err(CheckerError::ClassTooLarge { .. })
    ));
}

#[test]
fn test_json_export() {
    let dir = TempDir::new().unwrap();
    let (app, library) = app_and_library(dir.path());

    let checker = LinkageChecker::create([&app, &library], CheckerConfig::default()).unwrap();
    let report = checker.check_classpath().unwrap();
    let json = export::export_json(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["total_errors"], report.total_error_count());
    assert_eq!(value["reports"].as_array().map(Vec::len), Some(2));
}
