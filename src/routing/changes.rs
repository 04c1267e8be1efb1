//! Pending file-change notifications.

use std::fmt;
use std::path::PathBuf;

/// Kind of filesystem event reported by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Change,
    Unlink,
    /// A directory appeared (created or renamed in).
    AddDir,
    /// A directory disappeared (removed or renamed out).
    UnlinkDir,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Change => "change",
            ChangeKind::Unlink => "unlink",
            ChangeKind::AddDir => "add_dir",
            ChangeKind::UnlinkDir => "unlink_dir",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued notification, applied on the next manifest lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub location: PathBuf,
    pub kind: ChangeKind,
}

impl PendingChange {
    pub fn new(location: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            location: location.into(),
            kind,
        }
    }
}
