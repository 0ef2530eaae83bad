//! Extraction of the module name declared by a project manifest.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::executor::resolve_project_path;

/// Reads the first line of a manifest and strips its declaration keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestReader {
    file_name: String,
    prefix: String,
}

impl Default for ManifestReader {
    /// Reader for Go's `go.mod`.
    fn default() -> Self {
        Self::new("go.mod", "module ")
    }
}

impl ManifestReader {
    pub fn new(file_name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            prefix: prefix.into(),
        }
    }

    /// Returns the module identifier declared in `project_path`'s manifest.
    /// An empty `project_path` means the current directory.
    pub fn module_name<P: AsRef<Path>>(&self, project_path: P) -> Result<String> {
        let manifest = resolve_project_path(project_path)?.join(&self.file_name);
        debug!("Reading module name from {}", manifest.display());
        let content = fs::read_to_string(&manifest)
            .map_err(|source| Error::ManifestRead {
                path: manifest.clone(),
                source,
            })?;

        let first_line = content.lines().next().unwrap_or_default();
        let name = first_line.replacen(&self.prefix, "", 1);
        let name = name.trim_end_matches('\r').trim();
        if name.is_empty() {
            return Err(Error::EmptyManifest { path: manifest });
        }
        Ok(name.to_string())
    }
}

/// Module name from the `go.mod` in `project_path`.
pub fn module_name<P: AsRef<Path>>(project_path: P) -> Result<String> {
    ManifestReader::default().module_name(project_path)
}
