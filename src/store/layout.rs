// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Path layout of a Block Store directory tree (§6.2).

use std::path::{Path, PathBuf};

/// Which attribute-bearing entity a path refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The origin entity.
    Origin,
    /// The destination entity.
    Destination,
}

impl EntityKind {
    /// Directory name under `<base>/attributes/`.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
        }
    }
}

/// `<base>/attributes/<entity>`
#[must_use]
pub fn attribute_dir(base: &Path, entity: EntityKind) -> PathBuf {
    base.join("attributes").join(entity.dir_name())
}

/// `<base>/attributes/<entity>/index.bin`
#[must_use]
pub fn attribute_index_path(base: &Path, entity: EntityKind) -> PathBuf {
    attribute_dir(base, entity).join("index.bin")
}

/// `<base>/attributes/<entity>/blocks`
#[must_use]
pub fn attribute_blocks_dir(base: &Path, entity: EntityKind) -> PathBuf {
    attribute_dir(base, entity).join("blocks")
}

/// `<base>/attributes/<entity>/blocks/block_<id>.bin`
#[must_use]
pub fn attribute_block_path(base: &Path, entity: EntityKind, block_id: u32) -> PathBuf {
    attribute_blocks_dir(base, entity).join(format!("block_{block_id}.bin"))
}

/// `<base>/accessibility`
#[must_use]
pub fn accessibility_dir(base: &Path) -> PathBuf {
    base.join("accessibility")
}

/// `<base>/accessibility/index.bin`
#[must_use]
pub fn accessibility_index_path(base: &Path) -> PathBuf {
    accessibility_dir(base).join("index.bin")
}

/// `<base>/accessibility/blocks`
#[must_use]
pub fn accessibility_blocks_dir(base: &Path) -> PathBuf {
    accessibility_dir(base).join("blocks")
}

/// `<base>/accessibility/blocks/block_<id>.bin`
#[must_use]
pub fn accessibility_block_path(base: &Path, block_id: u32) -> PathBuf {
    accessibility_blocks_dir(base).join(format!("block_{block_id}.bin"))
}
