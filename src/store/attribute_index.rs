// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::format::AttributeIndexEntry;
use crate::store::layout::{attribute_block_path, attribute_index_path, EntityKind};
use crate::store::mmap::BlockMapping;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Random-access handle over one entity's `index.bin`.
///
/// The whole index is read into memory up front: for `N_O = 5000` attributes
/// this is 80 KiB, trivial compared to the block files it addresses.
pub struct AttributeIndexReader {
    base: PathBuf,
    entity: EntityKind,
    bytes: Vec<u8>,
}

impl AttributeIndexReader {
    /// Opens the attribute index for `entity` rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingIndex`] if the index file does not exist.
    /// Returns [`Error::Io`] on any other I/O failure.
    pub fn open(base: &Path, entity: EntityKind) -> Result<Self> {
        let path = attribute_index_path(base, entity);

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingIndex { path });
            }
            Err(e) => return Err(Error::io_at(path, e)),
        };

        Ok(Self {
            base: base.to_path_buf(),
            entity,
            bytes,
        })
    }

    /// Number of index entries present (not necessarily the entity's full
    /// attribute count, if the index was truncated by an external process).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() / AttributeIndexEntry::SIZE
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads the index entry for attribute column `column` (0-based, matching
    /// the row-schema numbering `a ∈ [0, N_attrs)` used throughout the
    /// format: column `a` is the spec's `attr_number = a + 1`, stored at
    /// slot `(attr_number - 1) = a`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingIndex`] if the entry's slot lies beyond the
    /// end of the index file.
    pub fn get(&self, column: u32) -> Result<AttributeIndexEntry> {
        let slot = column as usize;
        let start = slot.saturating_mul(AttributeIndexEntry::SIZE);
        let end = start.saturating_add(AttributeIndexEntry::SIZE);

        let Some(buf) = self.bytes.get(start..end) else {
            return Err(Error::MissingIndex {
                path: attribute_index_path(&self.base, self.entity),
            });
        };

        Ok(AttributeIndexEntry::from_bytes(buf))
    }

    /// Maps the block file referenced by `entry`, verifying its byte range
    /// is within bounds (§4.3 failure semantics: `FormatMismatch`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the block file cannot be mapped, or
    /// [`Error::FormatMismatch`] if the entry's `(offset, count)` range
    /// overflows the block file.
    pub fn map_block(&self, entry: &AttributeIndexEntry) -> Result<BlockMapping> {
        let path = attribute_block_path(&self.base, self.entity, entry.block_id);
        let mapping = BlockMapping::open(&path)?;

        let needed = entry
            .offset
            .saturating_add(u64::from(entry.count) * crate::format::AttributeValue::SIZE as u64);

        if needed > mapping.len() as u64 {
            return Err(Error::FormatMismatch {
                path,
                reason: format!(
                    "index entry requires {needed} bytes but block file is only {} bytes",
                    mapping.len()
                ),
            });
        }

        Ok(mapping)
    }
}
