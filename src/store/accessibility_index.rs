// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::format::{AccessibilityBlockIndexEntry, AccessibilityRecord};
use crate::store::layout::{accessibility_block_path, accessibility_index_path};
use crate::store::mmap::BlockMapping;
use crate::{Error, HashMap, Result};
use std::path::{Path, PathBuf};

/// In-memory `destination_id → entry` lookup over the accessibility index.
///
/// Built once per query and shared read-only across worker threads, per the
/// concurrency model (§5): no locking is needed once construction completes.
pub struct AccessibilityIndexReader {
    base: PathBuf,
    by_destination: HashMap<u32, AccessibilityBlockIndexEntry>,
}

impl AccessibilityIndexReader {
    /// Loads the full accessibility index for the store rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingIndex`] if `accessibility/index.bin` is
    /// missing or its size is not a multiple of
    /// [`AccessibilityBlockIndexEntry::SIZE`].
    pub fn open(base: &Path) -> Result<Self> {
        let path = accessibility_index_path(base);

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingIndex { path });
            }
            Err(e) => return Err(Error::io_at(path, e)),
        };

        if bytes.len() % AccessibilityBlockIndexEntry::SIZE != 0 {
            return Err(Error::MissingIndex { path });
        }

        let mut by_destination =
            HashMap::with_capacity_and_hasher(bytes.len() / AccessibilityBlockIndexEntry::SIZE, Default::default());

        for chunk in bytes.chunks_exact(AccessibilityBlockIndexEntry::SIZE) {
            let entry = AccessibilityBlockIndexEntry::from_bytes(chunk);
            by_destination.insert(entry.destination_id, entry);
        }

        Ok(Self {
            base: base.to_path_buf(),
            by_destination,
        })
    }

    /// Number of destinations present in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_destination.len()
    }

    /// Whether the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_destination.is_empty()
    }

    /// Looks up the entry for `destination_id`, if any.
    ///
    /// A `destination_id` absent from the index is not an error: it is
    /// silently skipped by the query executor (vacuous truth for that
    /// destination, per §4.3 failure semantics).
    #[must_use]
    pub fn get(&self, destination_id: u32) -> Option<&AccessibilityBlockIndexEntry> {
        self.by_destination.get(&destination_id)
    }

    /// Iterates all entries.
    pub fn iter(&self) -> impl Iterator<Item = &AccessibilityBlockIndexEntry> {
        self.by_destination.values()
    }

    /// Maps the block file referenced by `entry` and materializes its run of
    /// [`AccessibilityRecord`]s.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the block file cannot be mapped, or
    /// [`Error::FormatMismatch`] if the entry's `(offset, count)` range
    /// overflows the block file.
    pub fn load_run(&self, entry: &AccessibilityBlockIndexEntry) -> Result<Vec<AccessibilityRecord>> {
        let path = accessibility_block_path(&self.base, entry.block_id);
        let mapping = BlockMapping::open(&path)?;

        let record_size = AccessibilityRecord::SIZE as u64;
        let needed = entry.offset.saturating_add(u64::from(entry.count) * record_size);

        if needed > mapping.len() as u64 {
            return Err(Error::FormatMismatch {
                path,
                reason: format!(
                    "index entry requires {needed} bytes but block file is only {} bytes",
                    mapping.len()
                ),
            });
        }

        let bytes = mapping.as_bytes();
        let start = entry.offset as usize;
        let mut records = Vec::with_capacity(entry.count as usize);

        for i in 0..entry.count as usize {
            let record_start = start + i * AccessibilityRecord::SIZE;
            let record_bytes = &bytes[record_start..record_start + AccessibilityRecord::SIZE];
            records.push(AccessibilityRecord::from_bytes(record_bytes));
        }

        Ok(records)
    }
}
