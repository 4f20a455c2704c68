// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The Block Store: the on-disk layout and its index files (§4.1).
//!
//! A Block Store is immutable once produced by the [`crate::preprocess`]
//! pipeline; readers here never take locks and unmap every block file as
//! soon as they are done with it.

pub mod accessibility_index;
pub mod attribute_index;
pub mod layout;
pub mod mmap;

pub use accessibility_index::AccessibilityIndexReader;
pub use attribute_index::AttributeIndexReader;
pub use layout::EntityKind;
pub use mmap::BlockMapping;
