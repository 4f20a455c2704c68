// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The Query Executor (§4.3): a parallel filter over a prepared Block Store.

mod worker;

use crate::store::layout::EntityKind;
use crate::store::{AccessibilityIndexReader, AttributeIndexReader};
use crate::{Error, HashSet, Result, StoreOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A filter query: return every accessibility record whose origin has a
/// value for every attribute in `origin_attrs`, and whose destination has a
/// value for every attribute in `dest_attrs`.
#[derive(Clone, Debug)]
pub struct QueryRequest {
    /// Root of the Block Store to query.
    pub store_dir: PathBuf,
    /// Origin attribute columns (0-based, matching the row schema).
    pub origin_attrs: Vec<u32>,
    /// Destination attribute columns (0-based, matching the row schema).
    pub dest_attrs: Vec<u32>,
    /// Where the flat `AccessibilityRecord` sequence is written.
    pub result_path: PathBuf,
}

/// Runs `request` against the Block Store, writing the filtered result.
///
/// No partial results on failure: either the complete result file is
/// written, or an error is returned and the result path is left untouched
/// (any partial output from a failed attempt is written to a temporary file
/// first and only renamed into place on success).
///
/// # Errors
///
/// Returns [`Error::BadArgument`] if either attribute list is empty (an
/// empty list would be vacuously satisfied by everything, collapsing
/// selectivity — see §4.3 step 2). Returns [`Error::MissingIndex`] if a
/// required index file is absent, or [`Error::FormatMismatch`]/[`Error::Io`]
/// for malformed or unreadable block files.
pub fn run(request: &QueryRequest, options: &StoreOptions) -> Result<()> {
    if request.origin_attrs.is_empty() || request.dest_attrs.is_empty() {
        return Err(Error::BadArgument(
            "origin_attrs and dest_attrs must both contain at least one attribute".to_string(),
        ));
    }

    log::info!(
        "query: store={} origin_attrs={:?} dest_attrs={:?}",
        request.store_dir.display(),
        request.origin_attrs,
        request.dest_attrs
    );

    let origin_index = AttributeIndexReader::open(&request.store_dir, EntityKind::Origin)?;
    let dest_index = AttributeIndexReader::open(&request.store_dir, EntityKind::Destination)?;

    let origin_sets = request
        .origin_attrs
        .iter()
        .map(|&a| worker::load_id_set(&origin_index, a))
        .collect::<Result<Vec<_>>>()?;

    let dest_sets = request
        .dest_attrs
        .iter()
        .map(|&a| worker::load_id_set(&dest_index, a))
        .collect::<Result<Vec<_>>>()?;

    let selected_dests = intersect_sets(&dest_sets);

    log::debug!(
        "query: {} candidate destinations after attribute intersection",
        selected_dests.len()
    );

    let acc_index = AccessibilityIndexReader::open(&request.store_dir)?;

    let worker_count = options.resolved_worker_threads().max(1);
    let chunks = partition(&selected_dests, worker_count);

    let mut chunk_results: Vec<Option<Result<Vec<_>>>> = (0..chunks.len()).map(|_| None).collect();

    std::thread::scope(|scope| {
        let acc_index = &acc_index;
        let origin_sets = &origin_sets;
        let handles: Vec<_> = chunks
            .iter()
            .map(|chunk| scope.spawn(move || worker::process_chunk(acc_index, origin_sets, chunk)))
            .collect();

        for (slot, handle) in chunk_results.iter_mut().zip(handles) {
            *slot = Some(handle.join().unwrap_or_else(|_| {
                Err(Error::Io {
                    path: None,
                    source: std::io::Error::other("query worker panicked"),
                })
            }));
        }
    });

    let mut records = Vec::new();
    for result in chunk_results {
        records.extend(result.expect("scope joined")?);
    }

    log::info!("query: {} records matched", records.len());

    write_result_atomic(&request.result_path, &records)
}

fn intersect_sets(sets: &[HashSet<u32>]) -> Vec<u32> {
    let Some((first, rest)) = sets.split_first() else {
        return Vec::new();
    };

    first
        .iter()
        .copied()
        .filter(|id| rest.iter().all(|set| set.contains(id)))
        .collect()
}

fn partition(ids: &[u32], worker_count: usize) -> Vec<Vec<u32>> {
    if ids.is_empty() {
        return Vec::new();
    }

    let chunk_size = ids.len().div_ceil(worker_count).max(1);
    ids.chunks(chunk_size).map(<[u32]>::to_vec).collect()
}

fn write_result_atomic(path: &Path, records: &[crate::format::AccessibilityRecord]) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());

    if let Some(parent) = parent {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_at(parent, e))?;
    }

    let mut temp_file = match parent {
        Some(parent) => tempfile::NamedTempFile::new_in(parent),
        None => tempfile::NamedTempFile::new(),
    }
    .map_err(|e| Error::io_at(path, e))?;

    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        for record in records {
            record.write_to(&mut writer).map_err(|e| Error::io_at(path, e))?;
        }
        writer.flush().map_err(|e| Error::io_at(path, e))?;
    }

    temp_file.as_file_mut().sync_all().map_err(|e| Error::io_at(path, e))?;
    temp_file.persist(path).map_err(|e| Error::io_at(path, e.error))?;

    Ok(())
}
