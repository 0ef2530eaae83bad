//! Reconciliation of rendered artifacts with files already at the destination.
//!
//! Merge functions are registered per path suffix. When several registered suffixes
//! match a destination path the longest one wins, so `.config.json` takes priority
//! over `.json` regardless of registration order.

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::{BoxError, Error, FileOperation, Result};
use crate::fs::Filesystem;
use crate::report::Action;

/// Combines `(destination, rendered, existing)` into the bytes to write.
pub type MergeFn =
    Box<dyn Fn(&Path, &[u8], &[u8]) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync>;

/// Suffix-keyed merge functions.
#[derive(Default)]
pub struct MergeRegistry {
    functions: IndexMap<String, MergeFn>,
}

impl MergeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `merge_fn` for paths ending with `suffix`, replacing any function
    /// already registered for the same suffix.
    pub fn register<F>(&mut self, suffix: impl Into<String>, merge_fn: F)
    where
        F: Fn(&Path, &[u8], &[u8]) -> std::result::Result<Vec<u8>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.functions.insert(suffix.into(), Box::new(merge_fn));
    }

    /// Finds the function with the longest suffix matching `path`.
    pub fn resolve(&self, path: &Path) -> Option<(&str, &MergeFn)> {
        let path = path.to_string_lossy();
        self.functions
            .iter()
            .filter(|(suffix, _)| path.ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(suffix, merge_fn)| (suffix.as_str(), merge_fn))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for MergeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeRegistry")
            .field("suffixes", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// Appends `artifact` to `existing` on its own lines, or returns `None` when
/// `existing` already contains it.
pub fn default_merge(existing: &[u8], artifact: &[u8]) -> Option<Vec<u8>> {
    if contains(existing, artifact) {
        return None;
    }
    let mut merged = Vec::with_capacity(existing.len() + artifact.len() + 2);
    merged.extend_from_slice(existing);
    merged.push(b'\n');
    merged.extend_from_slice(artifact);
    merged.push(b'\n');
    Some(merged)
}

/// Deep-merges two JSON objects: keys already present in the existing document keep
/// their values, new keys are added, nested objects are merged the same way.
pub fn json_merge(
    path: &Path,
    artifact: &[u8],
    existing: &[u8],
) -> std::result::Result<Vec<u8>, BoxError> {
    let mut base: serde_json::Value = serde_json::from_slice(existing)?;
    let incoming: serde_json::Value = serde_json::from_slice(artifact)?;
    if !base.is_object() || !incoming.is_object() {
        return Err(format!("'{}' is not a JSON object", path.display()).into());
    }
    merge_json_values(&mut base, incoming);
    let mut merged = serde_json::to_vec_pretty(&base)?;
    merged.push(b'\n');
    Ok(merged)
}

fn merge_json_values(base: &mut serde_json::Value, incoming: serde_json::Value) {
    if let (Some(base), serde_json::Value::Object(incoming)) = (base.as_object_mut(), incoming) {
        for (key, value) in incoming {
            match base.get_mut(&key) {
                Some(existing) if existing.is_object() => merge_json_values(existing, value),
                Some(_) => {}
                None => {
                    base.insert(key, value);
                }
            }
        }
    }
}

fn call_merge_fn(
    merge_fn: &MergeFn,
    path: &Path,
    artifact: &[u8],
    existing: &[u8],
) -> Result<Vec<u8>> {
    match panic::catch_unwind(AssertUnwindSafe(|| merge_fn(path, artifact, existing))) {
        Ok(Ok(merged)) => Ok(merged),
        Ok(Err(e)) => Err(Error::MergeFunction {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "merge function panicked".to_string());
            Err(Error::MergeFunction {
                path: path.to_path_buf(),
                message,
            })
        }
    }
}

fn write(fs: &dyn Filesystem, path: &Path, contents: &[u8]) -> Result<()> {
    fs.write_file(path, contents)
        .map_err(|e| Error::destination(FileOperation::Write, path, e))
}

/// Writes a rendered artifact to `path`, merging with existing content in merge mode.
pub fn write_artifact(
    fs: &dyn Filesystem,
    path: &Path,
    artifact: &[u8],
    merge_mode: bool,
    registry: &MergeRegistry,
) -> Result<Action> {
    if !merge_mode {
        let existed = fs.exists(path);
        write(fs, path, artifact)?;
        return Ok(if existed {
            Action::Overwritten
        } else {
            Action::Created
        });
    }

    let existing = match fs.read_file(path) {
        Ok(existing) => existing,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            write(fs, path, artifact)?;
            return Ok(Action::Created);
        }
        Err(e) => {
            warn!("Cannot read '{}' for merging, leaving it untouched: {}", path.display(), e);
            return Ok(Action::Unreadable);
        }
    };

    let merged = match registry.resolve(path) {
        Some((suffix, merge_fn)) => {
            debug!("Merging '{}' with function registered for '{}'", path.display(), suffix);
            let merged = call_merge_fn(merge_fn, path, artifact, &existing)?;
            (merged != existing).then_some(merged)
        }
        None => default_merge(&existing, artifact),
    };

    match merged {
        Some(merged) => {
            write(fs, path, &merged)?;
            Ok(Action::Merged)
        }
        None => {
            debug!("'{}' already up to date", path.display());
            Ok(Action::Unchanged)
        }
    }
}
