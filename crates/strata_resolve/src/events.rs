//! File-system change events consumed by the invalidation engine.
//!
//! Events arrive from an external watcher with at-least-once delivery;
//! the engine tolerates duplicates. Paths are normalized on
//! construction so containment checks against recorded provenance are
//! purely lexical.

use std::path::{Path, PathBuf};

use strata_common::path::normalize;

/// A change to a single file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileChange {
    /// The file now exists where it previously did not.
    Created,
    /// The file's content changed.
    Modified,
    /// The file no longer exists.
    Deleted,
}

/// A change to a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirChange {
    /// The directory now exists (e.g. a package was installed).
    Created,
    /// The directory was removed, with everything beneath it.
    Deleted,
}

/// One file-system change event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FsEvent {
    /// A file was created, modified, or deleted.
    File {
        /// The kind of change.
        change: FileChange,
        /// Normalized path of the file.
        path: PathBuf,
    },
    /// A directory was created or deleted.
    Directory {
        /// The kind of change.
        change: DirChange,
        /// Normalized path of the directory.
        path: PathBuf,
    },
    /// Something changed somewhere under `root`, with no more specific
    /// information (an opaque bulk notification).
    Subtree {
        /// Normalized root of the changed subtree.
        root: PathBuf,
    },
}

impl FsEvent {
    /// A file-created event.
    pub fn file_created(path: &Path) -> Self {
        FsEvent::File {
            change: FileChange::Created,
            path: normalize(path),
        }
    }

    /// A file-modified event.
    pub fn file_modified(path: &Path) -> Self {
        FsEvent::File {
            change: FileChange::Modified,
            path: normalize(path),
        }
    }

    /// A file-deleted event.
    pub fn file_deleted(path: &Path) -> Self {
        FsEvent::File {
            change: FileChange::Deleted,
            path: normalize(path),
        }
    }

    /// A directory-created event.
    pub fn dir_created(path: &Path) -> Self {
        FsEvent::Directory {
            change: DirChange::Created,
            path: normalize(path),
        }
    }

    /// A directory-deleted event.
    pub fn dir_deleted(path: &Path) -> Self {
        FsEvent::Directory {
            change: DirChange::Deleted,
            path: normalize(path),
        }
    }

    /// An opaque subtree-changed event.
    pub fn subtree(root: &Path) -> Self {
        FsEvent::Subtree {
            root: normalize(root),
        }
    }

    /// The path the event refers to.
    pub fn path(&self) -> &Path {
        match self {
            FsEvent::File { path, .. } => path,
            FsEvent::Directory { path, .. } => path,
            FsEvent::Subtree { root } => root,
        }
    }
}

/// An ordered batch of events delivered as one unit of work.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FsEventBatch {
    events: Vec<FsEvent>,
}

impl FsEventBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to the batch.
    pub fn push(&mut self, event: FsEvent) {
        self.events.push(event);
    }

    /// Whether the batch contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Iterates the events in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = &FsEvent> {
        self.events.iter()
    }
}

impl FromIterator<FsEvent> for FsEventBatch {
    fn from_iter<I: IntoIterator<Item = FsEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_normalize_paths() {
        let event = FsEvent::file_created(Path::new("/proj/src/../src/./new.ts"));
        assert_eq!(event.path(), Path::new("/proj/src/new.ts"));
    }

    #[test]
    fn batch_preserves_order() {
        let batch: FsEventBatch = [
            FsEvent::file_created(Path::new("/p/a.ts")),
            FsEvent::file_deleted(Path::new("/p/b.ts")),
        ]
        .into_iter()
        .collect();
        let paths: Vec<_> = batch.iter().map(|e| e.path().to_path_buf()).collect();
        assert_eq!(paths, vec![PathBuf::from("/p/a.ts"), PathBuf::from("/p/b.ts")]);
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
    }
}
