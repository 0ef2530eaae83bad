//! Outcome of a build, one entry per touched destination path.

use std::fmt;
use std::path::{Path, PathBuf};

/// What happened to a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Overwritten,
    Merged,
    /// Merge mode found nothing new to add.
    Unchanged,
    /// An existing file could not be read for merging and was left alone.
    Unreadable,
    /// The directory was empty after its subtree was processed and got removed.
    Pruned,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Action::Created => "Created",
            Action::Overwritten => "Overwritten",
            Action::Merged => "Merged",
            Action::Unchanged => "Unchanged",
            Action::Unreadable => "Unreadable",
            Action::Pruned => "Pruned",
        };
        f.write_str(action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub action: Action,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub entries: Vec<ReportEntry>,
}

impl BuildReport {
    pub(crate) fn record(&mut self, action: Action, path: &Path) {
        self.entries.push(ReportEntry {
            action,
            path: path.to_path_buf(),
        });
    }

    /// Action recorded for `path`, if any.
    pub fn action_for<P: AsRef<Path>>(&self, path: P) -> Option<Action> {
        self.entries
            .iter()
            .find(|entry| entry.path == path.as_ref())
            .map(|entry| entry.action)
    }

    pub fn count(&self, action: Action) -> usize {
        self.entries.iter().filter(|entry| entry.action == action).count()
    }
}
