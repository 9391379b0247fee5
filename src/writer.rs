//! Destination-side effects for each entry kind.
//!
//! Every write finishes with the durability sequence before returning: file
//! data is synced and the handle closed, then the containing directory is
//! synced so the new directory entry itself survives a crash. When several
//! steps fail, the earliest error is the one reported.

use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{symlink, OpenOptionsExt, PermissionsExt};
use std::path::Path;

use crate::error::WalkError;
use crate::render::{RenderContext, Renderer};

/// Create `target` (and missing ancestors) carrying `mode`. An existing
/// directory is kept and only has its mode updated.
pub fn create_dir(target: &Path, mode: u32) -> Result<(), WalkError> {
    fs::create_dir_all(target).map_err(|e| WalkError::io(target, e))?;
    fs::set_permissions(target, Permissions::from_mode(mode))
        .map_err(|e| WalkError::io(target, e))?;
    sync_dir(containing_dir(target)).map_err(|e| WalkError::io(target, e))
}

/// Give a finished directory its final `mode` and sync the change. Runs after
/// the directory's contents are written, so `mode` may drop owner write.
pub fn seal_dir(target: &Path, mode: u32) -> Result<(), WalkError> {
    let dir = File::open(target).map_err(|e| WalkError::io(target, e))?;
    let applied = dir.set_permissions(Permissions::from_mode(mode));
    sync_close(dir, applied).map_err(|e| WalkError::io(target, e))
}

/// Render `source` and write the output to `target`, returns bytes written
pub fn write_template<R: Renderer + ?Sized>(
    renderer: &R,
    source: &Path,
    target: &Path,
    mode: u32,
    context: &RenderContext,
) -> Result<u64, WalkError> {
    let template = fs::read_to_string(source).map_err(|e| WalkError::io(source, e))?;
    let rendered = renderer
        .render(&source.to_string_lossy(), &template, context)
        .map_err(|e| WalkError::Render {
            path: source.to_path_buf(),
            source: e,
        })?;

    let mut dst = create_file(target, mode)?;
    let written = dst.write_all(rendered.as_bytes());
    sync_close(dst, written).map_err(|e| WalkError::io(target, e))?;
    sync_dir(containing_dir(target)).map_err(|e| WalkError::io(target, e))?;

    Ok(rendered.len() as u64)
}

/// Stream `source` into `target` unchanged, returns bytes copied
pub fn copy_plain(source: &Path, target: &Path, mode: u32) -> Result<u64, WalkError> {
    let mut src = File::open(source).map_err(|e| WalkError::io(source, e))?;
    let mut dst = create_file(target, mode)?;

    let mut copied = 0u64;
    let written = io::copy(&mut src, &mut dst).map(|n| copied = n);
    drop(src);

    sync_close(dst, written).map_err(|e| WalkError::io(target, e))?;
    sync_dir(containing_dir(target)).map_err(|e| WalkError::io(target, e))?;

    Ok(copied)
}

/// Recreate the link at `source` as `target`, pointing at the same literal
/// target string. Any non-directory already at `target` is replaced.
pub fn recreate_symlink(source: &Path, target: &Path) -> Result<(), WalkError> {
    let link_target = fs::read_link(source).map_err(|e| WalkError::io(source, e))?;

    match fs::symlink_metadata(target) {
        Ok(existing) if !existing.is_dir() => {
            fs::remove_file(target).map_err(|e| WalkError::io(target, e))?;
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(WalkError::io(target, e)),
    }

    symlink(&link_target, target).map_err(|e| WalkError::io(target, e))?;
    sync_dir(containing_dir(target)).map_err(|e| WalkError::io(target, e))
}

/// Open `target` for truncate-create-write with exactly `mode`, whatever the
/// umask or the mode of a file already there
fn create_file(target: &Path, mode: u32) -> Result<File, WalkError> {
    let file = match open_truncated(target, mode) {
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => replace_file(target, mode),
        other => other,
    }
    .map_err(|e| WalkError::io(target, e))?;
    file.set_permissions(Permissions::from_mode(mode))
        .map_err(|e| WalkError::io(target, e))?;
    Ok(file)
}

fn open_truncated(target: &Path, mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(target)
}

/// Unlink a destination file we may not write to (a read-only copy left by an
/// earlier walk) and create it afresh. Only needs write access to the parent.
fn replace_file(target: &Path, mode: u32) -> io::Result<File> {
    let existing = fs::symlink_metadata(target)?;
    if existing.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "destination is a directory",
        ));
    }
    fs::remove_file(target)?;
    open_truncated(target, mode)
}

/// Sync `file` to stable storage and close it. `written` is the outcome of
/// the writes that preceded; an error there outranks a sync failure.
pub fn sync_close(file: File, written: io::Result<()>) -> io::Result<()> {
    let synced = file.sync_all();
    drop(file);
    written.and(synced)
}

/// Sync a directory so entries created in it are durable
pub fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = File::open(path)?;
    sync_close(dir, Ok(()))
}

/// Parent of `path`, with the current directory standing in for a bare name
fn containing_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
