// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::path::PathBuf;

/// Represents errors that can occur while building or querying an accessibility store.
#[derive(Debug)]
pub enum Error {
    /// Malformed CLI input: unparsable attribute list, percent out of `(0, 1]`, etc.
    BadArgument(String),

    /// Open/read/write/mmap/stat failure on a file.
    Io {
        /// The path the operation was performed against, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A required index file is absent or shorter than its declared record layout.
    MissingIndex {
        /// The index file that could not be opened or was too short.
        path: PathBuf,
    },

    /// An input or on-disk structure does not match its declared fixed-width layout.
    FormatMismatch {
        /// The offending path.
        path: PathBuf,
        /// Human-readable detail (e.g. "size 1234 not a multiple of row size 20004").
        reason: String,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadArgument(msg) => write!(f, "AccessibilityStoreError: bad argument: {msg}"),
            Self::Io { path, source } => match path {
                Some(path) => write!(
                    f,
                    "AccessibilityStoreError: I/O error at {}: {source}",
                    path.display()
                ),
                None => write!(f, "AccessibilityStoreError: I/O error: {source}"),
            },
            Self::MissingIndex { path } => write!(
                f,
                "AccessibilityStoreError: missing or truncated index file at {}",
                path.display()
            ),
            Self::FormatMismatch { path, reason } => write!(
                f,
                "AccessibilityStoreError: format mismatch at {}: {reason}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}

impl Error {
    /// Attaches a path to an I/O error produced without one.
    #[must_use]
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }
}

/// Accessibility store result.
pub type Result<T> = std::result::Result<T, Error>;
