// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Scoped, read-only memory mappings of block files.

use crate::Result;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// A read-only mapping of one block file.
///
/// The mapping is unmapped when this value is dropped (`memmap2::Mmap`
/// unmaps in its own `Drop` impl); callers should keep the guard alive only
/// for the duration of the load, per the Block Store contract.
enum Inner {
    Mapped(Mmap),
    Empty,
}

pub struct BlockMapping {
    inner: Inner,
}

impl BlockMapping {
    /// Maps `path` read-only.
    ///
    /// A zero-length block file (every attribute in a column null, or a
    /// destination run packed into an otherwise-empty block) is not mapped —
    /// `mmap(2)` rejects zero-length mappings with `EINVAL` — and instead
    /// yields an empty mapping directly.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be opened, `stat`'d, or
    /// mapped.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| crate::Error::io_at(path, e))?;

        let len = file.metadata().map_err(|e| crate::Error::io_at(path, e))?.len();
        if len == 0 {
            return Ok(Self { inner: Inner::Empty });
        }

        // SAFETY: the mapped file is part of an immutable, write-once Block
        // Store; nothing else in this process truncates or rewrites it while
        // mapped.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| crate::Error::io_at(path, e))?;

        Ok(Self { inner: Inner::Mapped(mmap) })
    }

    /// The mapped bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.inner {
            Inner::Mapped(mmap) => mmap,
            Inner::Empty => &[],
        }
    }

    /// Size of the mapped file, in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the mapped file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}
