//! File and directory ignore patterns for template trees.
//! Patterns come from the template configuration and from a `.scaffolderignore`
//! file, one glob per line, similar to .gitignore.

use crate::config::CONFIG_FILES;
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::{fs::read_to_string, path::Path};

/// Ignore file name looked up at the template root.
pub const IGNORE_FILE: &str = ".scaffolderignore";

/// Patterns that are always ignored.
pub const DEFAULT_IGNORE_PATTERNS: [&str; 3] = [".git", "**/.DS_Store", IGNORE_FILE];

/// Reads patterns from the ignore file of `template_dir`, skipping blank lines and
/// `#` comments. A missing file yields no patterns.
pub fn read_ignore_file<P: AsRef<Path>>(template_dir: P) -> Vec<String> {
    let path = template_dir.as_ref().join(IGNORE_FILE);
    match read_to_string(&path) {
        Ok(contents) => contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect(),
        Err(_) => {
            debug!("{IGNORE_FILE} does not exist");
            Vec::new()
        }
    }
}

/// Compiles the default patterns, the configuration file names and `patterns`
/// into one set.
pub fn build_ignore_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut all: Vec<&str> = DEFAULT_IGNORE_PATTERNS.to_vec();
    all.extend(CONFIG_FILES);
    all.extend(patterns.iter().map(|p| p.as_ref()));
    for pattern in all {
        let glob = Glob::new(pattern)
            .map_err(|e| Error::IgnorePattern(format!("invalid pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::IgnorePattern(e.to_string()))
}
