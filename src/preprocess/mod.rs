// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The Preprocessor (§4.2): a one-shot transformer from row-major input
//! binaries into a Block Store.

mod accessibility;
mod attribute;
mod block_writer;

use crate::store::layout::EntityKind;
use crate::{Error, Result, StoreOptions};
use std::path::{Path, PathBuf};

/// The three row-major input files consumed by one preprocessing run (§6.1).
#[derive(Clone, Debug)]
pub struct RowMajorInputs {
    /// `origin_<P>p.bin`
    pub origin_path: PathBuf,
    /// `destination_<P>p.bin`
    pub destination_path: PathBuf,
    /// `accessibility_<P>p.bin`
    pub accessibility_path: PathBuf,
}

/// Builds a Block Store at `output_dir` from `inputs`.
///
/// Runs the origin attribute pipeline, destination attribute pipeline, and
/// accessibility pipeline concurrently on independent threads (§4.2.3); no
/// shared mutable state is touched besides each worker's own output files.
/// The first error observed at the join point is returned; on failure, the
/// Block Store's on-disk state is unspecified (preprocessing is not
/// crash-consistent, per §4.2.3).
///
/// # Errors
///
/// Returns whatever the first failing worker returned: [`Error::FormatMismatch`]
/// for malformed input sizes, or [`Error::Io`] for filesystem failures.
pub fn run(inputs: &RowMajorInputs, output_dir: &Path, options: &StoreOptions) -> Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| Error::io_at(output_dir, e))?;

    log::info!("preprocessing into {}", output_dir.display());

    let mut origin_result = None;
    let mut dest_result = None;
    let mut acc_result = None;

    std::thread::scope(|scope| {
        let origin_handle = scope.spawn(|| {
            attribute::process(
                &inputs.origin_path,
                output_dir,
                EntityKind::Origin,
                options.origin_attrs,
                options.origin_attr_block_bytes,
            )
        });

        let dest_handle = scope.spawn(|| {
            attribute::process(
                &inputs.destination_path,
                output_dir,
                EntityKind::Destination,
                options.dest_attrs,
                options.dest_attr_block_bytes,
            )
        });

        let acc_handle = scope.spawn(|| {
            accessibility::process(&inputs.accessibility_path, output_dir, options.acc_block_bytes)
        });

        origin_result = Some(
            origin_handle
                .join()
                .unwrap_or_else(|_| Err(worker_panicked("origin attribute"))),
        );
        dest_result = Some(
            dest_handle
                .join()
                .unwrap_or_else(|_| Err(worker_panicked("destination attribute"))),
        );
        acc_result = Some(
            acc_handle
                .join()
                .unwrap_or_else(|_| Err(worker_panicked("accessibility"))),
        );
    });

    origin_result.expect("scope joined")?;
    dest_result.expect("scope joined")?;
    acc_result.expect("scope joined")?;

    log::info!("preprocessing complete: {}", output_dir.display());

    Ok(())
}

fn worker_panicked(name: &str) -> Error {
    Error::Io {
        path: None,
        source: std::io::Error::other(format!("{name} worker panicked")),
    }
}
