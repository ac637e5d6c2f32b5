//! Classpath artifacts: jar/zip archives and class directories.

use crate::error::{CheckerError, Result};
use linkcheck_classfile::{ClassStructureParser, ParsedClass};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use walkdir::WalkDir;
use zip::ZipArchive;

/// How an artifact stores its classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Zip-format archive (`.jar`, `.zip`)
    Archive,
    /// Directory tree of `.class` files
    Directory,
}

/// Filesystem location contributing classes to a classpath.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactPath(PathBuf);

impl ArtifactPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Final path component, or the whole path when there is none.
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }

    /// Location string used in reports, e.g. `file:/libs/guava.jar`.
    pub fn location(&self) -> String {
        format!("file:{}", self.0.display())
    }

    /// Determine the artifact kind, failing if the path does not exist.
    pub fn kind(&self) -> Result<ArtifactKind> {
        let metadata = fs::metadata(&self.0).map_err(|source| {
            CheckerError::invalid_classpath(format!("{}: {}", self.0.display(), source))
        })?;
        if metadata.is_dir() {
            Ok(ArtifactKind::Directory)
        } else {
            Ok(ArtifactKind::Archive)
        }
    }

    /// List the class entries of this artifact (`com/example/Foo.class`).
    ///
    /// `META-INF/` is never listed; neither is anything the parser rejects.
    pub fn class_entries(&self, parser: &dyn ClassStructureParser) -> Result<Vec<String>> {
        OpenArtifact::open(self.clone())?.class_entries(parser)
    }

    /// Read and parse a single class entry.
    pub fn read_class(
        &self,
        entry: &str,
        parser: &dyn ClassStructureParser,
        max_size: usize,
    ) -> Result<ParsedClass> {
        OpenArtifact::open(self.clone())?.read_class(entry, parser, max_size)
    }

    /// Read and parse every class entry, in entry-name order.
    pub fn read_all_classes(
        &self,
        parser: &dyn ClassStructureParser,
        max_size: usize,
    ) -> Result<Vec<ParsedClass>> {
        OpenArtifact::open(self.clone())?.read_all_classes(parser, max_size)
    }

    fn open_archive(&self) -> Result<ZipArchive<BufReader<File>>> {
        let file = File::open(&self.0).map_err(|source| CheckerError::Io {
            path: self.0.clone(),
            source,
        })?;
        ZipArchive::new(BufReader::new(file)).map_err(|source| CheckerError::Archive {
            path: self.0.clone(),
            source,
        })
    }

    fn directory_entries(&self, parser: &dyn ClassStructureParser) -> Result<Vec<String>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.0).follow_links(false) {
            let entry = entry.map_err(|e| CheckerError::Io {
                path: self.0.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.0).unwrap_or(entry.path());
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if is_class_entry(&name, parser) {
                entries.push(name);
            }
        }
        Ok(entries)
    }

    fn read_directory_entry(&self, entry: &str, max_size: usize) -> Result<Vec<u8>> {
        let file_path = self.0.join(entry);
        let io_error = |source| CheckerError::Io {
            path: file_path.clone(),
            source,
        };
        let size = fs::metadata(&file_path).map_err(io_error)?.len();
        self.check_size(entry, size, max_size)?;
        fs::read(&file_path).map_err(io_error)
    }

    fn check_size(&self, entry: &str, size: u64, limit: usize) -> Result<()> {
        if size > limit as u64 {
            return Err(CheckerError::ClassTooLarge {
                path: self.0.clone(),
                entry: entry.to_string(),
                size,
                limit,
            });
        }
        Ok(())
    }

    fn parse_entry(
        &self,
        entry: &str,
        bytes: &[u8],
        parser: &dyn ClassStructureParser,
    ) -> Result<ParsedClass> {
        parser.parse(bytes).map_err(|source| CheckerError::ClassFormat {
            path: self.0.clone(),
            entry: entry.to_string(),
            source,
        })
    }
}

/// An artifact held open for repeated class reads.
///
/// Archives keep their parsed central directory for the lifetime of the
/// value; each read locks it for the duration of one entry.
pub struct OpenArtifact {
    path: ArtifactPath,
    archive: Option<Mutex<ZipArchive<BufReader<File>>>>,
}

impl OpenArtifact {
    /// Open `path`, reading an archive's central directory once.
    pub fn open(path: ArtifactPath) -> Result<Self> {
        let archive = match path.kind()? {
            ArtifactKind::Archive => Some(Mutex::new(path.open_archive()?)),
            ArtifactKind::Directory => None,
        };
        Ok(Self { path, archive })
    }

    pub fn path(&self) -> &ArtifactPath {
        &self.path
    }

    pub fn kind(&self) -> ArtifactKind {
        if self.archive.is_some() {
            ArtifactKind::Archive
        } else {
            ArtifactKind::Directory
        }
    }

    /// Sorted class entries, as for [`ArtifactPath::class_entries`].
    pub fn class_entries(&self, parser: &dyn ClassStructureParser) -> Result<Vec<String>> {
        let mut entries = match &self.archive {
            Some(archive) => archive
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .file_names()
                .filter(|name| is_class_entry(name, parser))
                .map(str::to_string)
                .collect(),
            None => self.path.directory_entries(parser)?,
        };
        entries.sort();
        Ok(entries)
    }

    pub fn read_class(
        &self,
        entry: &str,
        parser: &dyn ClassStructureParser,
        max_size: usize,
    ) -> Result<ParsedClass> {
        let bytes = match &self.archive {
            Some(archive) => self.read_archive_entry(archive, entry, max_size)?,
            None => self.path.read_directory_entry(entry, max_size)?,
        };
        self.path.parse_entry(entry, &bytes, parser)
    }

    pub fn read_all_classes(
        &self,
        parser: &dyn ClassStructureParser,
        max_size: usize,
    ) -> Result<Vec<ParsedClass>> {
        self.class_entries(parser)?
            .iter()
            .map(|entry| self.read_class(entry, parser, max_size))
            .collect()
    }

    fn read_archive_entry(
        &self,
        archive: &Mutex<ZipArchive<BufReader<File>>>,
        entry: &str,
        max_size: usize,
    ) -> Result<Vec<u8>> {
        let mut archive = archive.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = archive
            .by_name(entry)
            .map_err(|source| CheckerError::Archive {
                path: self.path.0.clone(),
                source,
            })?;
        self.path.check_size(entry, file.size(), max_size)?;
        let mut buffer = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buffer)
            .map_err(|source| CheckerError::Io {
                path: self.path.0.clone(),
                source,
            })?;
        Ok(buffer)
    }
}

impl fmt::Debug for OpenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenArtifact")
            .field("path", &self.path)
            .field("kind", &self.kind())
            .finish()
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for ArtifactPath {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for ArtifactPath {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<&PathBuf> for ArtifactPath {
    fn from(path: &PathBuf) -> Self {
        Self(path.clone())
    }
}

impl From<&str> for ArtifactPath {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

impl AsRef<Path> for ArtifactPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Binary class name for an entry path: `com/example/Foo$Bar.class` → `com.example.Foo$Bar`.
pub fn entry_to_class_name(entry: &str) -> String {
    entry
        .strip_suffix(".class")
        .unwrap_or(entry)
        .replace('/', ".")
}

fn is_class_entry(name: &str, parser: &dyn ClassStructureParser) -> bool {
    // Covers multi-release jars (META-INF/versions/N/...) as well.
    !name.starts_with("META-INF/") && parser.accepts_entry(name)
}
