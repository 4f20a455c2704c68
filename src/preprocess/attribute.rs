// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Attribute pipeline (§4.2.1): reshapes one row-major attribute table into
//! sparse, NaN-elided columns packed into size-targeted block files.

use crate::format::{AttributeIndexEntry, AttributeValue};
use crate::preprocess::block_writer::BlockWriter;
use crate::store::layout::{attribute_block_path, attribute_blocks_dir, attribute_index_path, EntityKind};
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Runs the attribute pipeline for one entity.
///
/// Reads `input_path` fully into memory, extracts every column's non-null
/// `(id, value)` pairs in source row order, and first-fit packs the columns
/// into block files under `output_dir`, writing `index.bin` alongside.
///
/// # Errors
///
/// Returns [`Error::FormatMismatch`] if `input_path`'s size is not a
/// multiple of `4 + n_attrs * 4`. Returns [`Error::Io`] on any I/O failure.
pub fn process(
    input_path: &Path,
    output_dir: &Path,
    entity: EntityKind,
    n_attrs: u32,
    target_block_bytes: u64,
) -> Result<()> {
    let row_size = 4u64 + u64::from(n_attrs) * 4;

    let bytes = std::fs::read(input_path).map_err(|e| Error::io_at(input_path, e))?;
    let total_bytes = bytes.len() as u64;

    if total_bytes % row_size != 0 {
        return Err(Error::FormatMismatch {
            path: input_path.to_path_buf(),
            reason: format!(
                "file size {total_bytes} is not a multiple of row size {row_size} ({n_attrs} attrs)"
            ),
        });
    }

    let n_rows = total_bytes / row_size;

    log::info!(
        "attribute pipeline[{}]: {n_rows} rows, {n_attrs} attributes",
        entity.dir_name()
    );

    let mut columns: Vec<Vec<AttributeValue>> = (0..n_attrs).map(|_| Vec::new()).collect();

    for row in 0..n_rows {
        let row_offset = (row * row_size) as usize;
        let id = u32::from_ne_bytes(
            bytes[row_offset..row_offset + 4]
                .try_into()
                .expect("4 bytes"),
        );

        for a in 0..n_attrs as usize {
            let value_offset = row_offset + 4 + a * 4;
            let value = f32::from_ne_bytes(
                bytes[value_offset..value_offset + 4]
                    .try_into()
                    .expect("4 bytes"),
            );

            if !value.is_nan() {
                columns[a].push(AttributeValue { id, value });
            }
        }
    }

    log::debug!(
        "attribute pipeline[{}]: extracted {} columns from memory",
        entity.dir_name(),
        columns.len()
    );

    write_columns(output_dir, entity, &columns, target_block_bytes)
}

fn write_columns(
    output_dir: &Path,
    entity: EntityKind,
    columns: &[Vec<AttributeValue>],
    target_block_bytes: u64,
) -> Result<()> {
    let blocks_dir = attribute_blocks_dir(output_dir, entity);
    let output_dir_owned = output_dir.to_path_buf();

    let mut packer = BlockWriter::new(
        &blocks_dir,
        move |block_id| attribute_block_path(&output_dir_owned, entity, block_id),
        target_block_bytes,
    )?;

    let index_path = attribute_index_path(output_dir, entity);
    let index_file = File::create(&index_path).map_err(|e| Error::io_at(&index_path, e))?;
    let mut index_writer = BufWriter::new(index_file);

    for column in columns {
        let payload_len = column.len() as u64 * AttributeValue::SIZE as u64;
        let (block_id, offset) = packer.reserve(payload_len)?;

        let mut payload = Vec::with_capacity(column.len() * AttributeValue::SIZE);
        for value in column {
            value.write_to(&mut payload).expect("write to Vec cannot fail");
        }
        packer.write_bytes(&payload)?;

        let entry = AttributeIndexEntry {
            block_id,
            offset,
            count: column.len() as u32,
        };
        entry
            .write_to(&mut index_writer)
            .map_err(|e| Error::io_at(&index_path, e))?;
    }

    index_writer.flush().map_err(|e| Error::io_at(&index_path, e))?;
    packer.finish()?;

    log::info!(
        "attribute pipeline[{}]: wrote {} index entries",
        entity.dir_name(),
        columns.len()
    );

    Ok(())
}
