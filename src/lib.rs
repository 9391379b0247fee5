//! # tplwalker
//!
//! Mirror a source directory tree into a destination, rendering template
//! files on the way.
//!
//! Directories, regular files and symlinks are recreated with the source's
//! permission bits. Files whose name ends with the configured suffix are
//! rendered against a caller-supplied data value and written with the suffix
//! stripped; everything else is copied byte for byte. Directories whose bare
//! name is on the ignore list are skipped together with their contents.
//!
//! Each write is synced, closed and has its containing directory synced
//! before the walk moves on, and the first error ends the walk.
//!
//! ## Usage
//!
//! ```ignore
//! use tplwalker::walker::{TemplateWalker, TplWalker};
//!
//! let mut walker = TplWalker::new("templates", ".tpl")?;
//! walker.ignore_dirs([".git"]);
//! walker.walk_templates(Path::new("/etc/app"), &serde_json::json!({ "env": "prod" }))?;
//! ```

#[cfg(not(unix))]
compile_error!("tplwalker relies on Unix permission bits and symlinks");

/// CLI configuration and argument parsing
pub mod config;

/// Visited nodes and their classification
pub mod entry;

/// Error types for walk operations
pub mod error;

/// Template rendering seam and the default engine
pub mod render;

/// Tree traversal and per-entry dispatch
pub mod walker;

/// Durable destination writes
pub mod writer;
