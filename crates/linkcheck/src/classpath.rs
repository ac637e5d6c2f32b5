//! Class name to defining-artifact index over an ordered classpath.
//!
//! When several artifacts define the same binary name, the first one in
//! classpath order wins and the rest are shadowed, the same search order a
//! classloader uses. Platform class images, when configured, come before
//! every classpath artifact, as the bootstrap loader does.

use crate::artifact::{entry_to_class_name, ArtifactPath, OpenArtifact};
use crate::config::{CheckerConfig, PlatformClasses};
use crate::error::{CheckerError, Result};
use linkcheck_classfile::{ClassFileParser, ClassStructureParser, ParsedClass};
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct ClassLocation {
    artifact: usize,
    entry: String,
}

/// Immutable index of the classes defined on a classpath
///
/// Every artifact stays open for the lifetime of the index, so loading a
/// class never re-reads an archive's central directory.
pub struct ClasspathIndex {
    /// Platform images first, then the classpath
    paths: Vec<ArtifactPath>,
    opened: Vec<OpenArtifact>,
    platform_len: usize,
    classes: HashMap<String, ClassLocation>,
    artifact_classes: Vec<BTreeSet<String>>,
    platform: PlatformClasses,
    parser: Arc<dyn ClassStructureParser>,
    max_class_file_size: usize,
}

impl ClasspathIndex {
    /// Index `artifacts` with the default class file parser.
    pub fn build<I, P>(artifacts: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<ArtifactPath>,
    {
        Self::build_with(
            artifacts,
            Arc::new(ClassFileParser::new()),
            CheckerConfig::default().max_class_file_size,
        )
    }

    /// Index `artifacts`, reading classes with `parser`.
    ///
    /// No platform classes are known; see [`ClasspathIndex::build_with_platform`].
    ///
    /// # Errors
    ///
    /// Returns [`CheckerError::InvalidClasspath`] if no artifacts are given or
    /// any of them is missing or cannot be opened.
    pub fn build_with<I, P>(
        artifacts: I,
        parser: Arc<dyn ClassStructureParser>,
        max_class_file_size: usize,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<ArtifactPath>,
    {
        Self::build_with_platform(artifacts, PlatformClasses::none(), parser, max_class_file_size)
    }

    /// Index the platform images of `platform` followed by `artifacts`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckerError::InvalidClasspath`] if no classpath artifacts
    /// are given or any artifact, platform or not, cannot be opened.
    pub fn build_with_platform<I, P>(
        artifacts: I,
        platform: PlatformClasses,
        parser: Arc<dyn ClassStructureParser>,
        max_class_file_size: usize,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<ArtifactPath>,
    {
        let classpath: Vec<ArtifactPath> = artifacts.into_iter().map(Into::into).collect();
        if classpath.is_empty() {
            return Err(CheckerError::invalid_classpath("no artifacts given"));
        }

        let platform_len = platform.artifacts.len();
        let paths: Vec<ArtifactPath> = platform
            .artifacts
            .iter()
            .map(ArtifactPath::from)
            .chain(classpath)
            .collect();

        let mut opened = Vec::with_capacity(paths.len());
        let mut classes: HashMap<String, ClassLocation> = HashMap::new();
        let mut artifact_classes = Vec::with_capacity(paths.len());

        for (position, artifact) in paths.iter().enumerate() {
            let unreadable = |e: CheckerError| match e {
                err @ CheckerError::InvalidClasspath { .. } => err,
                other => CheckerError::invalid_classpath(format!("cannot read {artifact}: {other}")),
            };
            let open = OpenArtifact::open(artifact.clone()).map_err(unreadable)?;
            let entries = open.class_entries(parser.as_ref()).map_err(unreadable)?;

            let mut names = BTreeSet::new();
            for entry in entries {
                let class_name = entry_to_class_name(&entry);
                match classes.get(&class_name) {
                    Some(existing) => debug!(
                        "{} in {} is shadowed by {}",
                        class_name, artifact, paths[existing.artifact]
                    ),
                    None => {
                        classes.insert(
                            class_name.clone(),
                            ClassLocation {
                                artifact: position,
                                entry,
                            },
                        );
                    }
                }
                names.insert(class_name);
            }
            artifact_classes.push(names);
            opened.push(open);
        }

        info!(
            "Indexed {} classes from {} artifacts ({} platform)",
            classes.len(),
            paths.len(),
            platform_len
        );

        Ok(Self {
            paths,
            opened,
            platform_len,
            classes,
            artifact_classes,
            platform,
            parser,
            max_class_file_size,
        })
    }

    /// First artifact, platform images included, that defines `class_name`.
    pub fn find_defining_artifact(&self, class_name: &str) -> Option<&ArtifactPath> {
        self.classes
            .get(class_name)
            .map(|location| &self.paths[location.artifact])
    }

    /// Load the class view of `class_name` from its defining artifact.
    ///
    /// The name is matched exactly; `$` is part of the name.
    ///
    /// # Errors
    ///
    /// [`CheckerError::ClassNotFound`] if no artifact defines the name, or the
    /// I/O or format error hit while reading the entry.
    pub fn load_class(&self, class_name: &str) -> Result<ParsedClass> {
        let location = self
            .classes
            .get(class_name)
            .ok_or_else(|| CheckerError::ClassNotFound {
                class_name: class_name.to_string(),
            })?;
        self.opened[location.artifact].read_class(
            &location.entry,
            self.parser.as_ref(),
            self.max_class_file_size,
        )
    }

    /// True if `class_name` is undefined but assumed to come from the JDK.
    pub fn assumes_platform_class(&self, class_name: &str) -> bool {
        !self.classes.contains_key(class_name) && self.platform.assumes(class_name)
    }

    /// Artifacts in classpath order, platform images excluded
    pub fn artifacts(&self) -> &[ArtifactPath] {
        &self.paths[self.platform_len..]
    }

    /// Platform class images, in search order
    pub fn platform_artifacts(&self) -> &[ArtifactPath] {
        &self.paths[..self.platform_len]
    }

    /// Position of `artifact` on the classpath
    pub fn position(&self, artifact: &Path) -> Option<usize> {
        self.artifacts().iter().position(|a| a.path() == artifact)
    }

    /// Every class name a classpath artifact defines, shadowed or not, sorted.
    pub fn class_names_in(&self, artifact: &Path) -> Option<&BTreeSet<String>> {
        self.position(artifact)
            .map(|i| &self.artifact_classes[self.platform_len + i])
    }

    /// Read every class of the classpath artifact at `position`.
    pub(crate) fn read_artifact_classes(&self, position: usize) -> Result<Vec<ParsedClass>> {
        self.opened[self.platform_len + position]
            .read_all_classes(self.parser.as_ref(), self.max_class_file_size)
    }

    /// Number of distinct class names on the classpath and platform images
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }
}

/// Build a [`ClasspathIndex`] over `artifacts` in the given order.
pub fn create_index<I, P>(artifacts: I) -> Result<ClasspathIndex>
where
    I: IntoIterator<Item = P>,
    P: Into<ArtifactPath>,
{
    ClasspathIndex::build(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkcheck_classfile::ClassFileWriter;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_class(root: &Path, writer: ClassFileWriter) {
        let path = root.join(writer.entry_name());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, writer.build()).unwrap();
    }

    fn write_jar(path: &Path, writers: Vec<ClassFileWriter>) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for writer in writers {
            zip.start_file(writer.entry_name(), SimpleFileOptions::default())
                .unwrap();
            zip.write_all(&writer.build()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_empty_classpath() {
        let result = create_index(Vec::<PathBuf>::new());
        assert!(matches!(result, Err(CheckerError::InvalidClasspath { .. })));
    }

    #[test]
    fn test_missing_artifact() {
        let result = create_index([PathBuf::from("/no/such/dir/lib.jar")]);
        assert!(matches!(result, Err(CheckerError::InvalidClasspath { .. })));
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = TempDir::new().unwrap();
        let jar = dir.path().join("broken.jar");
        fs::write(&jar, b"not a zip file").unwrap();

        let result = create_index([jar]);
        assert!(matches!(result, Err(CheckerError::InvalidClasspath { .. })));
    }

    #[test]
    fn test_first_artifact_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_class(first.path(), ClassFileWriter::new("com.example.Shared"));
        write_class(
            second.path(),
            ClassFileWriter::new("com.example.Shared").field("extra", "I", 0),
        );
        write_class(second.path(), ClassFileWriter::new("com.example.Only"));

        let index = create_index([first.path(), second.path()]).unwrap();

        assert_eq!(
            index.find_defining_artifact("com.example.Shared").map(|a| a.path()),
            Some(first.path())
        );
        assert_eq!(
            index.find_defining_artifact("com.example.Only").map(|a| a.path()),
            Some(second.path())
        );
        assert!(index.load_class("com.example.Shared").unwrap().fields.is_empty());
        assert_eq!(index.len(), 2);
        assert_eq!(index.class_names_in(second.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_load_missing_class() {
        let dir = TempDir::new().unwrap();
        write_class(dir.path(), ClassFileWriter::new("a.B"));
        let index = create_index([dir.path()]).unwrap();

        assert!(index.find_defining_artifact("a.C").is_none());
        assert!(matches!(
            index.load_class("a.C"),
            Err(CheckerError::ClassNotFound { class_name }) if class_name == "a.C"
        ));
    }

    #[test]
    fn test_dollar_in_top_level_name() {
        let dir = TempDir::new().unwrap();
        write_class(
            dir.path(),
            ClassFileWriter::new("com.google.cloud.bigquery.$AutoValue_Labels"),
        );
        let index = create_index([dir.path()]).unwrap();

        let class = index
            .load_class("com.google.cloud.bigquery.$AutoValue_Labels")
            .unwrap();
        assert_eq!(class.name, "com.google.cloud.bigquery.$AutoValue_Labels");
        assert!(!index.contains("com.google.cloud.bigquery."));
    }

    #[test]
    fn test_meta_inf_not_indexed() {
        let dir = TempDir::new().unwrap();
        write_class(dir.path(), ClassFileWriter::new("a.B"));
        let versioned = dir.path().join("META-INF/versions/11/a");
        fs::create_dir_all(&versioned).unwrap();
        fs::write(versioned.join("C.class"), ClassFileWriter::new("a.C").build()).unwrap();

        let index = create_index([dir.path()]).unwrap();
        assert!(index.contains("a.B"));
        assert!(!index.contains("a.C"));
        assert!(!index.contains("META-INF.versions.11.a.C"));
    }

    #[test]
    fn test_archive_stays_open_after_build() {
        let dir = TempDir::new().unwrap();
        let jar = dir.path().join("lib.jar");
        write_jar(
            &jar,
            vec![
                ClassFileWriter::new("lib.A").field("x", "I", 0),
                ClassFileWriter::new("lib.B"),
            ],
        );

        let index = create_index([&jar]).unwrap();
        fs::remove_file(&jar).unwrap();

        assert_eq!(index.load_class("lib.A").unwrap().fields.len(), 1);
        assert_eq!(index.load_class("lib.B").unwrap().name, "lib.B");
        assert_eq!(index.read_artifact_classes(0).unwrap().len(), 2);
    }

    #[test]
    fn test_oversized_entry_is_class_too_large() {
        let dir = TempDir::new().unwrap();
        write_class(dir.path(), ClassFileWriter::new("a.Big").field("f", "I", 0));
        let index = ClasspathIndex::build_with(
            [dir.path()],
            Arc::new(ClassFileParser::new()),
            16,
        )
        .unwrap();

        assert!(matches!(
            index.load_class("a.Big"),
            Err(CheckerError::ClassTooLarge { limit: 16, .. })
        ));
    }

    #[test]
    fn test_platform_images_come_first() {
        let jdk = TempDir::new().unwrap();
        let app = TempDir::new().unwrap();
        write_class(jdk.path(), ClassFileWriter::new("java.lang.Object").no_super_class());
        write_class(app.path(), ClassFileWriter::new("java.lang.Object").field("x", "I", 0));
        write_class(app.path(), ClassFileWriter::new("app.Main"));

        let platform = PlatformClasses {
            artifacts: vec![jdk.path().to_path_buf()],
            assumed_prefixes: vec!["java.".to_string()],
        };
        let index = ClasspathIndex::build_with_platform(
            [app.path()],
            platform,
            Arc::new(ClassFileParser::new()),
            CheckerConfig::default().max_class_file_size,
        )
        .unwrap();

        assert_eq!(
            index.find_defining_artifact("java.lang.Object").map(|a| a.path()),
            Some(jdk.path())
        );
        assert!(index.load_class("java.lang.Object").unwrap().fields.is_empty());
        assert_eq!(index.artifacts(), &[ArtifactPath::from(app.path())]);
        assert_eq!(index.platform_artifacts(), &[ArtifactPath::from(jdk.path())]);
        assert_eq!(index.position(jdk.path()), None);
        assert_eq!(index.class_names_in(app.path()).unwrap().len(), 2);

        assert!(!index.assumes_platform_class("java.lang.Object"));
        assert!(index.assumes_platform_class("java.util.List"));
        assert!(!index.assumes_platform_class("app.Gone"));
    }

    #[test]
    fn test_platform_image_without_classpath() {
        let jdk = TempDir::new().unwrap();
        let platform = PlatformClasses {
            artifacts: vec![jdk.path().to_path_buf()],
            assumed_prefixes: Vec::new(),
        };
        let result = ClasspathIndex::build_with_platform(
            Vec::<PathBuf>::new(),
            platform,
            Arc::new(ClassFileParser::new()),
            1024,
        );
        assert!(matches!(result, Err(CheckerError::InvalidClasspath { .. })));
    }

    #[test]
    fn test_index_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClasspathIndex>();
    }
}
