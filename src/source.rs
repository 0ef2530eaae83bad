//! Read-only template trees.
//!
//! Paths handed to a [`TemplateSource`] are always `/`-separated and relative to the
//! source root, whatever the host platform is. The root itself is `""`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One child of a template directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub is_dir: bool,
}

/// A read-only hierarchical store of template files.
pub trait TemplateSource {
    /// Lists the children of a directory, in a stable order.
    fn read_dir(&self, path: &str) -> io::Result<Vec<SourceEntry>>;

    /// Reads the raw bytes of a file.
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Joins a child name onto a `/`-separated source path.
pub fn join_source_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Template tree stored in a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut resolved = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            resolved.push(segment);
        }
        resolved
    }
}

impl TemplateSource for DirSource {
    fn read_dir(&self, path: &str) -> io::Result<Vec<SourceEntry>> {
        let dir = self.resolve(path);
        if !fs::metadata(&dir)?.is_dir() {
            return Err(io::Error::other(format!("'{}' is not a directory", dir.display())));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry?;
            let name = entry.file_name().to_str().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("non UTF-8 file name under '{}'", dir.display()),
                )
            })?;
            entries.push(SourceEntry {
                name: name.to_string(),
                is_dir: entry.path().is_dir(),
            });
        }
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path))
    }
}

/// Template tree held in memory, for templates compiled into a binary and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, implicitly creating its parent directories.
    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(normalize(path).to_string(), contents.into());
        self
    }

    /// Adds a directory that may stay empty.
    pub fn with_dir(mut self, path: &str) -> Self {
        self.dirs.insert(normalize(path).to_string());
        self
    }

    fn is_known_dir(&self, path: &str) -> bool {
        let prefix = format!("{path}/");
        self.dirs.contains(path)
            || self.files.keys().any(|f| f.starts_with(&prefix))
            || self.dirs.iter().any(|d| d.starts_with(&prefix))
    }
}

impl TemplateSource for MemorySource {
    fn read_dir(&self, path: &str) -> io::Result<Vec<SourceEntry>> {
        let path = normalize(path);
        if !path.is_empty() && !self.is_known_dir(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory '{path}' not found"),
            ));
        }

        let prefix = if path.is_empty() { String::new() } else { format!("{path}/") };
        let mut children: BTreeMap<&str, bool> = BTreeMap::new();
        let candidates = self
            .files
            .keys()
            .map(|f| (f.as_str(), false))
            .chain(self.dirs.iter().map(|d| (d.as_str(), true)));
        for (full, explicit_dir) in candidates {
            let Some(rest) = full.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match rest.split_once('/') {
                Some((child, _)) => {
                    children.insert(child, true);
                }
                None => {
                    let is_dir = children.get(rest).copied().unwrap_or(false) || explicit_dir;
                    children.insert(rest, is_dir);
                }
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, is_dir)| SourceEntry {
                name: name.to_string(),
                is_dir,
            })
            .collect())
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.get(normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("file '{path}' not found"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn join_source_paths() {
        assert_eq!(join_source_path("", "a"), "a");
        assert_eq!(join_source_path("templates", "a"), "templates/a");
        assert_eq!(join_source_path("templates/", "a"), "templates/a");
    }

    #[test]
    fn memory_source_lists_children() {
        let source = MemorySource::new()
            .with_file("root/b.txt", "b")
            .with_file("root/a/inner.txt", "inner")
            .with_dir("root/empty");

        let entries = source.read_dir("root").unwrap();
        assert_eq!(
            entries,
            vec![
                SourceEntry {
                    name: "a".into(),
                    is_dir: true,
                },
                SourceEntry {
                    name: "b.txt".into(),
                    is_dir: false,
                },
                SourceEntry {
                    name: "empty".into(),
                    is_dir: true,
                },
            ]
        );
        assert_eq!(source.read_file("root/a/inner.txt").unwrap(), b"inner");
        assert!(source.read_dir("root/empty").unwrap().is_empty());
    }

    #[test]
    fn memory_source_missing_paths() {
        let source = MemorySource::new().with_file("a.txt", "a");
        assert_eq!(source.read_dir("nope").unwrap_err().kind(), io::ErrorKind::NotFound);
        assert_eq!(source.read_file("b.txt").unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn dir_source_sorted_entries() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("z.txt"), "z").unwrap();
        fs::write(temp_dir.path().join("sub/a.txt"), "a").unwrap();

        let source = DirSource::new(temp_dir.path());
        let entries = source.read_dir("").unwrap();
        assert_eq!(
            entries,
            vec![
                SourceEntry {
                    name: "sub".into(),
                    is_dir: true,
                },
                SourceEntry {
                    name: "z.txt".into(),
                    is_dir: false,
                },
            ]
        );
        assert_eq!(source.read_file("sub/a.txt").unwrap(), b"a");
        assert!(source.read_dir("z.txt").is_err());
    }
}
