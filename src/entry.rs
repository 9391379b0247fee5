//! Per-node traversal values and their classification.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use walkdir::DirEntry;

use crate::error::WalkError;

/// Permission bits carried over to the destination (rwx for all classes plus
/// setuid, setgid and sticky)
pub const PERMISSION_MASK: u32 = 0o7777;

/// Filesystem node type as seen without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Directory,
    Regular,
    Symlink,
    /// Device, socket, fifo and anything else
    Other,
}

/// One visited source node
#[derive(Debug, Clone)]
pub struct TraversalEntry {
    /// Path as produced by the walk (rooted at the configured source)
    pub source_path: PathBuf,
    /// Path relative to the source root; empty for the root itself
    pub relative_path: PathBuf,
    /// Distance from the source root, which is at depth 0
    pub depth: usize,
    pub node_type: NodeType,
    /// Raw `st_mode`, file type bits included
    pub mode: u32,
}

impl TraversalEntry {
    /// Build an entry from a walkdir item, reading its (non-followed) metadata
    pub fn from_dir_entry(root: &Path, entry: &DirEntry) -> Result<Self, WalkError> {
        let metadata = entry.metadata().map_err(|e| WalkError::Metadata {
            path: entry.path().to_path_buf(),
            source: e,
        })?;

        let file_type = metadata.file_type();
        let node_type = if file_type.is_dir() {
            NodeType::Directory
        } else if file_type.is_file() {
            NodeType::Regular
        } else if file_type.is_symlink() {
            NodeType::Symlink
        } else {
            NodeType::Other
        };

        let source_path = entry.path().to_path_buf();
        let relative_path = source_path
            .strip_prefix(root)
            .unwrap_or(&source_path)
            .to_path_buf();

        Ok(Self {
            source_path,
            relative_path,
            depth: entry.depth(),
            node_type,
            mode: metadata.mode(),
        })
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.node_type == NodeType::Directory
    }

    /// Permission bits without the file type
    #[inline]
    pub fn permissions(&self) -> u32 {
        self.mode & PERMISSION_MASK
    }

    /// Where this entry lands under `destination_root`
    pub fn destination(&self, destination_root: &Path) -> PathBuf {
        if self.relative_path.as_os_str().is_empty() {
            destination_root.to_path_buf()
        } else {
            destination_root.join(&self.relative_path)
        }
    }
}

/// What the dispatcher does with an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    /// Regular file rendered through the template engine; `output_name` is
    /// the file name with the suffix removed
    Template { output_name: OsString },
    /// Regular file copied byte for byte
    Plain,
    Symlink,
    Unsupported,
}

/// Classify an entry against the configured template suffix
pub fn classify(entry: &TraversalEntry, suffix: &str) -> EntryKind {
    match entry.node_type {
        NodeType::Directory => EntryKind::Directory,
        NodeType::Symlink => EntryKind::Symlink,
        NodeType::Other => EntryKind::Unsupported,
        NodeType::Regular => {
            let name = entry.source_path.file_name();
            match name.and_then(|n| strip_suffix(n, suffix)) {
                Some(output_name) => EntryKind::Template { output_name },
                None => EntryKind::Plain,
            }
        }
    }
}

/// Remove `suffix` from the end of `name`. Names that do not end with it, or
/// that would be left empty, are not templates.
fn strip_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    let stem = name.as_bytes().strip_suffix(suffix.as_bytes())?;
    if stem.is_empty() {
        return None;
    }
    Some(OsStr::from_bytes(stem).to_os_string())
}
