use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Walk error types
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Invalid template suffix {suffix:?}: {reason}")]
    InvalidSuffix { suffix: String, reason: &'static str },

    #[error("Failed to read metadata while walking {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to render template {path}")]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    #[error("No space left on device for {path}")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported file type {path}: mode {mode:o}")]
    UnsupportedFileType { path: PathBuf, mode: u32 },
}

impl WalkError {
    /// Attach a path to an I/O failure, recognising a full disk
    pub fn io(path: &Path, source: io::Error) -> Self {
        // ENOSPC on Unix
        if source.raw_os_error() == Some(28) {
            return WalkError::DiskFull {
                path: path.to_path_buf(),
                source,
            };
        }
        WalkError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path of the entry that caused the failure, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            WalkError::InvalidSuffix { .. } => None,
            WalkError::Metadata { path, .. }
            | WalkError::Render { path, .. }
            | WalkError::DiskFull { path, .. }
            | WalkError::Io { path, .. }
            | WalkError::UnsupportedFileType { path, .. } => Some(path),
        }
    }
}

/// Failure reported by a template engine, either at parse or at render time
#[derive(Error, Debug)]
#[error("{message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_maps_enospc_to_disk_full() {
        let err = WalkError::io(Path::new("/out/a"), io::Error::from_raw_os_error(28));
        match err {
            WalkError::DiskFull { path, source } => {
                assert_eq!(path, PathBuf::from("/out/a"));
                assert_eq!(source.raw_os_error(), Some(28));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_io_keeps_other_errors() {
        let err = WalkError::io(
            Path::new("/out/a"),
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        match err {
            WalkError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("/out/a"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_file_type_display_is_octal() {
        let err = WalkError::UnsupportedFileType {
            path: PathBuf::from("/src/fifo"),
            mode: 0o10644,
        };
        assert_eq!(err.to_string(), "Unsupported file type /src/fifo: mode 10644");
        assert_eq!(err.path(), Some(Path::new("/src/fifo")));
    }

    #[test]
    fn test_invalid_suffix_has_no_path() {
        let err = WalkError::InvalidSuffix {
            suffix: String::new(),
            reason: "empty",
        };
        assert!(err.path().is_none());
    }
}
