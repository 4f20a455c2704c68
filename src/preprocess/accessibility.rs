// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Accessibility pipeline (§4.2.2): stable-sorts records by `destination_id`
//! and first-fit packs each destination's contiguous run into size-targeted
//! block files, so that a destination's run never crosses a block boundary
//! (§3 Invariants, §8 property 4: destination uniqueness).

use crate::format::{AccessibilityBlockIndexEntry, AccessibilityRecord};
use crate::preprocess::block_writer::BlockWriter;
use crate::store::layout::{accessibility_block_path, accessibility_blocks_dir, accessibility_index_path};
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Runs the accessibility pipeline.
///
/// # Errors
///
/// Returns [`Error::FormatMismatch`] if `input_path`'s size is not a
/// multiple of [`AccessibilityRecord::SIZE`]. Returns [`Error::Io`] on any
/// I/O failure.
pub fn process(input_path: &Path, output_dir: &Path, target_block_bytes: u64) -> Result<()> {
    let bytes = std::fs::read(input_path).map_err(|e| Error::io_at(input_path, e))?;
    let total_bytes = bytes.len() as u64;
    let record_size = AccessibilityRecord::SIZE as u64;

    if total_bytes % record_size != 0 {
        return Err(Error::FormatMismatch {
            path: input_path.to_path_buf(),
            reason: format!("file size {total_bytes} is not a multiple of record size {record_size}"),
        });
    }

    let n_records = (total_bytes / record_size) as usize;
    let mut records = Vec::with_capacity(n_records);
    for i in 0..n_records {
        let start = i * AccessibilityRecord::SIZE;
        records.push(AccessibilityRecord::from_bytes(&bytes[start..start + AccessibilityRecord::SIZE]));
    }
    drop(bytes);

    log::info!("accessibility pipeline: loaded {n_records} records");

    // Stable sort preserves each destination's original row order within its run.
    records.sort_by_key(|r| r.destination_id);

    let blocks_dir = accessibility_blocks_dir(output_dir);
    let output_dir_owned = output_dir.to_path_buf();

    let mut packer = BlockWriter::new(
        &blocks_dir,
        move |block_id| accessibility_block_path(&output_dir_owned, block_id),
        target_block_bytes,
    )?;

    let index_path = accessibility_index_path(output_dir);
    let index_file = File::create(&index_path).map_err(|e| Error::io_at(&index_path, e))?;
    let mut index_writer = BufWriter::new(index_file);

    let mut run_start = 0;
    while run_start < records.len() {
        let destination_id = records[run_start].destination_id;
        let mut run_end = run_start + 1;
        while run_end < records.len() && records[run_end].destination_id == destination_id {
            run_end += 1;
        }

        let run = &records[run_start..run_end];
        let payload_len = run.len() as u64 * record_size;
        let (block_id, offset) = packer.reserve(payload_len)?;

        let mut payload = Vec::with_capacity(run.len() * AccessibilityRecord::SIZE);
        for record in run {
            record.write_to(&mut payload).expect("write to Vec cannot fail");
        }
        packer.write_bytes(&payload)?;

        let entry = AccessibilityBlockIndexEntry {
            destination_id,
            block_id,
            offset,
            count: run.len() as u32,
        };
        entry
            .write_to(&mut index_writer)
            .map_err(|e| Error::io_at(&index_path, e))?;

        run_start = run_end;
    }

    index_writer.flush().map_err(|e| Error::io_at(&index_path, e))?;
    packer.finish()?;

    log::info!("accessibility pipeline: wrote index for store at {}", output_dir.display());

    Ok(())
}
