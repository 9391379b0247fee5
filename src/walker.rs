//! Tree walking and per-entry dispatch.
//!
//! A walk is one depth-first, pre-order pass over the source tree. Every node
//! is classified and written to the destination before the next one is read;
//! the first failure stops the walk and nothing already written is undone.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::entry::{classify, EntryKind, TraversalEntry};
use crate::error::WalkError;
use crate::render::{MiniJinjaRenderer, RenderContext, Renderer};
use crate::writer;

/// What callers of a walker depend on
pub trait TemplateWalker {
    /// Mirror the source tree into `destination`, rendering templates
    /// against `context`
    fn walk_templates(
        &self,
        destination: &Path,
        context: &RenderContext,
    ) -> Result<WalkStats, WalkError>;

    /// Add bare directory names to skip, together with everything below them.
    /// Affects walks started afterwards.
    fn ignore_dirs<I, S>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
        Self: Sized;
}

/// Fixed walk parameters
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub source_root: PathBuf,
    pub template_suffix: String,
    /// Matched against the final path component of directories only
    pub ignored_dir_names: HashSet<OsString>,
}

impl WalkerConfig {
    /// Validate the suffix and build a config with an empty ignore set
    pub fn new(
        source_root: impl Into<PathBuf>,
        template_suffix: impl Into<String>,
    ) -> Result<Self, WalkError> {
        let template_suffix = template_suffix.into();
        let reason = if template_suffix.is_empty() {
            Some("suffix must not be empty")
        } else if template_suffix.contains('/') {
            Some("suffix must not contain a path separator")
        } else if template_suffix.contains('\0') {
            Some("suffix must not contain a NUL byte")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(WalkError::InvalidSuffix {
                suffix: template_suffix,
                reason,
            });
        }

        Ok(Self {
            source_root: source_root.into(),
            template_suffix,
            ignored_dir_names: HashSet::new(),
        })
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir() && self.ignored_dir_names.contains(entry.file_name())
    }
}

/// Counters for one finished walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories: u64,
    pub templates_rendered: u64,
    pub files_copied: u64,
    pub symlinks: u64,
    pub bytes_written: u64,
}

impl WalkStats {
    /// Number of destination entries produced
    pub fn entries(&self) -> u64 {
        self.directories + self.templates_rendered + self.files_copied + self.symlinks
    }
}

/// Owner access a destination directory keeps while its contents are written
const OWNER_RWX: u32 = 0o700;

/// Directories still being filled, waiting for their exact source mode.
/// Pre-order means a directory is finished once an entry at its own depth or
/// shallower shows up.
#[derive(Debug, Default)]
struct PendingDirModes {
    stack: Vec<(usize, PathBuf, u32)>,
}

impl PendingDirModes {
    fn push(&mut self, depth: usize, target: PathBuf, mode: u32) {
        self.stack.push((depth, target, mode));
    }

    /// Seal every pending directory at `depth` or deeper, innermost first
    fn settle(&mut self, depth: usize) -> Result<(), WalkError> {
        while self.stack.last().is_some_and(|(d, _, _)| *d >= depth) {
            if let Some((_, target, mode)) = self.stack.pop() {
                writer::seal_dir(&target, mode)?;
            }
        }
        Ok(())
    }
}

/// Walker over one source tree
pub struct TplWalker<R = MiniJinjaRenderer> {
    config: WalkerConfig,
    renderer: R,
}

impl TplWalker<MiniJinjaRenderer> {
    /// Walker rendering templates with [`MiniJinjaRenderer`]
    pub fn new(source: impl Into<PathBuf>, suffix: impl Into<String>) -> Result<Self, WalkError> {
        Self::with_renderer(source, suffix, MiniJinjaRenderer::new())
    }
}

impl<R: Renderer> TplWalker<R> {
    pub fn with_renderer(
        source: impl Into<PathBuf>,
        suffix: impl Into<String>,
        renderer: R,
    ) -> Result<Self, WalkError> {
        Ok(Self {
            config: WalkerConfig::new(source, suffix)?,
            renderer,
        })
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Visit every node under the source root, root included, parents before
    /// their children. Ignored directories and their contents are never
    /// visited. Stops at the first metadata or visitor error.
    pub fn traverse<F>(&self, mut visit: F) -> Result<(), WalkError>
    where
        F: FnMut(&TraversalEntry) -> Result<(), WalkError>,
    {
        let root = &self.config.source_root;
        let entries = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.config.is_ignored(e));

        for item in entries {
            let dir_entry = item.map_err(|e| WalkError::Metadata {
                path: e.path().map_or_else(|| root.clone(), Path::to_path_buf),
                source: e,
            })?;
            let entry = TraversalEntry::from_dir_entry(root, &dir_entry)?;
            visit(&entry)?;
        }

        Ok(())
    }

    /// Write one entry to its place under `destination`
    fn dispatch(
        &self,
        entry: &TraversalEntry,
        destination: &Path,
        context: &RenderContext,
        stats: &mut WalkStats,
        pending: &mut PendingDirModes,
    ) -> Result<(), WalkError> {
        let target = entry.destination(destination);
        let kind = classify(entry, &self.config.template_suffix);
        debug!(path = %entry.relative_path.display(), kind = ?kind, "dispatching entry");

        match kind {
            EntryKind::Directory => {
                let mode = entry.permissions();
                let working = mode | OWNER_RWX;
                writer::create_dir(&target, working)?;
                if working != mode {
                    pending.push(entry.depth, target, mode);
                }
                stats.directories += 1;
            }
            EntryKind::Template { output_name } => {
                let target = target.with_file_name(output_name);
                stats.bytes_written += writer::write_template(
                    &self.renderer,
                    &entry.source_path,
                    &target,
                    entry.permissions(),
                    context,
                )?;
                stats.templates_rendered += 1;
            }
            EntryKind::Plain => {
                stats.bytes_written +=
                    writer::copy_plain(&entry.source_path, &target, entry.permissions())?;
                stats.files_copied += 1;
            }
            EntryKind::Symlink => {
                writer::recreate_symlink(&entry.source_path, &target)?;
                stats.symlinks += 1;
            }
            EntryKind::Unsupported => {
                return Err(WalkError::UnsupportedFileType {
                    path: entry.source_path.clone(),
                    mode: entry.mode,
                });
            }
        }

        Ok(())
    }
}

impl<R: Renderer> TemplateWalker for TplWalker<R> {
    fn walk_templates(
        &self,
        destination: &Path,
        context: &RenderContext,
    ) -> Result<WalkStats, WalkError> {
        let start = Instant::now();
        info!(
            source = %self.config.source_root.display(),
            destination = %destination.display(),
            "walking template tree"
        );

        let mut stats = WalkStats::default();
        let mut pending = PendingDirModes::default();
        let walked = self.traverse(|entry| {
            pending.settle(entry.depth)?;
            self.dispatch(entry, destination, context, &mut stats, &mut pending)
        });
        // Directories already created get their mode even when the walk failed
        walked.and(pending.settle(0))?;

        info!(
            entries = stats.entries(),
            templates = stats.templates_rendered,
            bytes = stats.bytes_written,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "walk finished"
        );
        Ok(stats)
    }

    fn ignore_dirs<I, S>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.config
            .ignored_dir_names
            .extend(dirs.into_iter().map(Into::into));
    }
}
