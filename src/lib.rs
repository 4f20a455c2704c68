// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A columnar block store and parallel filter engine for a two-entity
//! accessibility dataset: a set of *origins* and *destinations*, each with
//! many sparse numeric attributes, and a dense accessibility relation giving
//! a travel time and distance for every origin-destination pair.
//!
//! ##### NOTE
//!
//! > This crate is write-once: the [`preprocess`] pipeline builds a Block
//! > Store from row-major input binaries, and the [`query`] executor answers
//! > filter queries against it. There is no mutation after preprocessing.
//!
//! # Example usage
//!
//! ```no_run
//! use accessibility_store::config::StoreOptions;
//! use accessibility_store::preprocess::{self, RowMajorInputs};
//! use accessibility_store::query::{self, QueryRequest};
//!
//! # fn main() -> accessibility_store::Result<()> {
//! let options = StoreOptions::new();
//!
//! preprocess::run(
//!     &RowMajorInputs {
//!         origin_path: "origin_1p.bin".into(),
//!         destination_path: "destination_1p.bin".into(),
//!         accessibility_path: "accessibility_1p.bin".into(),
//!     },
//!     "out/1p".as_ref(),
//!     &options,
//! )?;
//!
//! query::run(
//!     &QueryRequest {
//!         store_dir: "out/1p".into(),
//!         origin_attrs: vec![1],
//!         dest_attrs: vec![1],
//!         result_path: "result.bin".into(),
//!     },
//!     &options,
//! )?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
mod error;
pub mod format;
pub mod preprocess;
pub mod query;
pub mod store;

pub use config::StoreOptions;
pub use error::{Error, Result};

/// Fast, non-cryptographic hash map used for id sets and lookups throughout
/// the query executor and preprocessor (rustc_hash's `FxHash` benchmarked
/// best for this kind of workload, same rationale the tree's own block and
/// descriptor-table caches use it for).
pub(crate) type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// As [`HashMap`], for sets.
pub(crate) type HashSet<T> = rustc_hash::FxHashSet<T>;
