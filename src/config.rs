// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Number of origin attribute columns (`N_O`).
pub const DEFAULT_ORIGIN_ATTRS: u32 = 5_000;

/// Number of destination attribute columns (`N_D`).
pub const DEFAULT_DEST_ATTRS: u32 = 2_000;

const MIB: u64 = 1_024 * 1_024;

/// Target size, in bytes, below which the preprocessor keeps appending origin
/// attribute columns to the current block before starting a new one.
pub const DEFAULT_ORIGIN_ATTR_BLOCK_BYTES: u64 = 32 * MIB;

/// As [`DEFAULT_ORIGIN_ATTR_BLOCK_BYTES`], but for destination attribute columns.
pub const DEFAULT_DEST_ATTR_BLOCK_BYTES: u64 = 8 * MIB;

/// Target size, in bytes, for accessibility record blocks.
pub const DEFAULT_ACC_BLOCK_BYTES: u64 = 256 * MIB;

/// Schema and block-sizing knobs shared by the preprocessor and the query executor.
///
/// Mirrors the configuration table in the format specification (§6.4): every
/// field has a documented default and a chained setter, in the style of the
/// tree's own `Config`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    /// Number of origin attribute columns.
    pub origin_attrs: u32,

    /// Number of destination attribute columns.
    pub dest_attrs: u32,

    /// Target size, in bytes, of origin attribute block files.
    pub origin_attr_block_bytes: u64,

    /// Target size, in bytes, of destination attribute block files.
    pub dest_attr_block_bytes: u64,

    /// Target size, in bytes, of accessibility block files.
    pub acc_block_bytes: u64,

    /// Number of worker threads used by the preprocessor and query executor.
    ///
    /// A value of `0` is normalized to the hardware concurrency hint (floor 1)
    /// at the point of use.
    pub worker_threads: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            origin_attrs: DEFAULT_ORIGIN_ATTRS,
            dest_attrs: DEFAULT_DEST_ATTRS,
            origin_attr_block_bytes: DEFAULT_ORIGIN_ATTR_BLOCK_BYTES,
            dest_attr_block_bytes: DEFAULT_DEST_ATTR_BLOCK_BYTES,
            acc_block_bytes: DEFAULT_ACC_BLOCK_BYTES,
            worker_threads: 0,
        }
    }
}

impl StoreOptions {
    /// Creates options with the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the origin attribute count.
    #[must_use]
    pub fn origin_attrs(mut self, n: u32) -> Self {
        self.origin_attrs = n;
        self
    }

    /// Sets the destination attribute count.
    #[must_use]
    pub fn dest_attrs(mut self, n: u32) -> Self {
        self.dest_attrs = n;
        self
    }

    /// Sets the origin attribute block target size, in bytes.
    #[must_use]
    pub fn origin_attr_block_bytes(mut self, bytes: u64) -> Self {
        self.origin_attr_block_bytes = bytes;
        self
    }

    /// Sets the destination attribute block target size, in bytes.
    #[must_use]
    pub fn dest_attr_block_bytes(mut self, bytes: u64) -> Self {
        self.dest_attr_block_bytes = bytes;
        self
    }

    /// Sets the accessibility block target size, in bytes.
    #[must_use]
    pub fn acc_block_bytes(mut self, bytes: u64) -> Self {
        self.acc_block_bytes = bytes;
        self
    }

    /// Sets the worker thread count (`0` defers to hardware concurrency).
    #[must_use]
    pub fn worker_threads(mut self, n: usize) -> Self {
        self.worker_threads = n;
        self
    }

    /// Resolves [`StoreOptions::worker_threads`] against hardware concurrency.
    #[must_use]
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }

        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    }
}
