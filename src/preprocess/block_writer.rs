// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Shared first-fit block packer used by both the attribute pipeline and the
//! accessibility pipeline (§4.2.1 step 3, §4.2.2 step 2-3).
//!
//! Both pipelines pack a sequence of unsplittable items (an attribute
//! column's values, or one destination's accessibility run) into block
//! files sized to a target: keep appending to the current block unless it
//! is non-empty and the next item would push it over target, in which case
//! close the block and start a new one. An item larger than the target
//! still goes into its own (oversized) block.

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Packs items into block files, handing out `(block_id, offset)` for each.
pub struct BlockWriter<F>
where
    F: Fn(u32) -> PathBuf,
{
    path_for_block: F,
    target_bytes: u64,
    block_id: u32,
    bytes_in_block: u64,
    writer: BufWriter<File>,
}

impl<F> BlockWriter<F>
where
    F: Fn(u32) -> PathBuf,
{
    /// Creates a packer writing into files produced by `path_for_block`,
    /// starting with block 0. `blocks_dir` is created if missing.
    pub fn new(blocks_dir: &Path, path_for_block: F, target_bytes: u64) -> Result<Self> {
        std::fs::create_dir_all(blocks_dir).map_err(|e| Error::io_at(blocks_dir, e))?;

        let path = path_for_block(0);
        let writer = open_block_file(&path)?;

        Ok(Self {
            path_for_block,
            target_bytes,
            block_id: 0,
            bytes_in_block: 0,
            writer,
        })
    }

    /// Reserves space for an item of `payload_len` bytes, rolling over to a
    /// new block first if the current block is non-empty and would exceed
    /// `target_bytes`. Returns `(block_id, offset)` for the item.
    pub fn reserve(&mut self, payload_len: u64) -> Result<(u32, u64)> {
        if self.bytes_in_block > 0 && self.bytes_in_block + payload_len > self.target_bytes {
            self.roll_to_next_block()?;
        }

        Ok((self.block_id, self.bytes_in_block))
    }

    /// Appends `buf` to the current block, advancing its byte counter.
    ///
    /// Must be called immediately after [`Self::reserve`] with a matching
    /// `payload_len == buf.len()`.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        let path = (self.path_for_block)(self.block_id);
        self.writer.write_all(buf).map_err(|e| Error::io_at(path, e))?;
        self.bytes_in_block += buf.len() as u64;
        Ok(())
    }

    fn roll_to_next_block(&mut self) -> Result<()> {
        let prev_path = (self.path_for_block)(self.block_id);
        self.writer.flush().map_err(|e| Error::io_at(&prev_path, e))?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| Error::io_at(&prev_path, e))?;

        self.block_id += 1;
        self.bytes_in_block = 0;

        let path = (self.path_for_block)(self.block_id);
        self.writer = open_block_file(&path)?;

        Ok(())
    }

    /// Flushes and syncs the final block file.
    pub fn finish(mut self) -> Result<()> {
        let path = (self.path_for_block)(self.block_id);
        self.writer.flush().map_err(|e| Error::io_at(&path, e))?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| Error::io_at(&path, e))?;
        Ok(())
    }
}

fn open_block_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| Error::io_at(path, e))?;
    Ok(BufWriter::with_capacity(512 * 1024, file))
}
