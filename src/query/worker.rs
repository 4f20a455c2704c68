// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::format::{AttributeValue, AccessibilityRecord};
use crate::store::{AccessibilityIndexReader, AttributeIndexReader};
use crate::{HashSet, Result};

/// Materializes the set of ids present in attribute column `column`
/// (presence only; the floats themselves are discarded, per §4.3 step 1).
pub fn load_id_set(index: &AttributeIndexReader, column: u32) -> Result<HashSet<u32>> {
    let entry = index.get(column)?;
    let mapping = index.map_block(&entry)?;

    let bytes = mapping.as_bytes();
    let start = entry.offset as usize;
    let mut ids = HashSet::with_capacity_and_hasher(entry.count as usize, Default::default());

    for i in 0..entry.count as usize {
        let value_start = start + i * AttributeValue::SIZE;
        let value = AttributeValue::from_bytes(&bytes[value_start..value_start + AttributeValue::SIZE]);
        ids.insert(value.id);
    }

    Ok(ids)
}

/// Processes one worker's partition of `selected_dests`, keeping every
/// accessibility record whose `origin_id` is present in every set of
/// `origin_sets` (intersection semantics, short-circuit on first miss).
///
/// Records are appended in on-disk order within this worker's destinations
/// (§5: "across workers the merged order is unspecified").
pub fn process_chunk(
    acc_index: &AccessibilityIndexReader,
    origin_sets: &[HashSet<u32>],
    chunk: &[u32],
) -> Result<Vec<AccessibilityRecord>> {
    let mut kept = Vec::new();

    for &destination_id in chunk {
        let Some(entry) = acc_index.get(destination_id) else {
            // Present in the origin/dest-attribute intersection but absent
            // from the accessibility index: impossible by construction, but
            // the contract says to skip rather than fail (§4.3).
            continue;
        };

        let records = acc_index.load_run(entry)?;

        for record in records {
            if origin_sets.iter().all(|set| set.contains(&record.origin_id)) {
                kept.push(record);
            }
        }
    }

    Ok(kept)
}
