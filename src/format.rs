// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Fixed-width on-disk record layouts.
//!
//! Every type here has an exact, documented byte size and is encoded/decoded
//! field-by-field in the platform's native byte order (per the format
//! contract, records are native-endian, not portable across architectures).
//! We never reinterpret-cast raw memory to these structs: a field-by-field
//! decode keeps the format correct even on targets where a naive `repr(C)`
//! cast would insert padding (e.g. the `u64` field at byte offset 4).

use std::io::{self, Read, Write};

/// Locates one attribute column inside a block file.
///
/// On disk: `block_id:u32, offset:u64, count:u32`, 16 bytes, no padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttributeIndexEntry {
    /// Id of the block file the column's values live in.
    pub block_id: u32,
    /// Byte offset of the first [`AttributeValue`] within that block file.
    pub offset: u64,
    /// Number of non-null values in the column.
    pub count: u32,
}

impl AttributeIndexEntry {
    /// Encoded size in bytes.
    pub const SIZE: usize = 16;

    /// Writes the fixed-width encoding to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.block_id.to_ne_bytes())?;
        writer.write_all(&self.offset.to_ne_bytes())?;
        writer.write_all(&self.count.to_ne_bytes())?;
        Ok(())
    }

    /// Reads one fixed-width record from `reader`.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf)?;
        Ok(Self::from_bytes(&buf))
    }

    /// Decodes one record from an exact `SIZE`-byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is not exactly [`Self::SIZE`] bytes; callers that read
    /// from a block/index file are expected to have already bounds-checked.
    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Self {
        assert_eq!(buf.len(), Self::SIZE);
        Self {
            block_id: u32::from_ne_bytes(buf[0..4].try_into().expect("4 bytes")),
            offset: u64::from_ne_bytes(buf[4..12].try_into().expect("8 bytes")),
            count: u32::from_ne_bytes(buf[12..16].try_into().expect("4 bytes")),
        }
    }
}

/// One sparse attribute value: an id paired with its non-null float.
///
/// On disk: `id:u32, value:f32`, 8 bytes, no padding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeValue {
    /// Origin or destination id this value belongs to.
    pub id: u32,
    /// The non-null attribute value.
    pub value: f32,
}

impl AttributeValue {
    /// Encoded size in bytes.
    pub const SIZE: usize = 8;

    /// Writes the fixed-width encoding to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.id.to_ne_bytes())?;
        writer.write_all(&self.value.to_ne_bytes())?;
        Ok(())
    }

    /// Decodes one record from an exact `SIZE`-byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is not exactly [`Self::SIZE`] bytes.
    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Self {
        assert_eq!(buf.len(), Self::SIZE);
        Self {
            id: u32::from_ne_bytes(buf[0..4].try_into().expect("4 bytes")),
            value: f32::from_ne_bytes(buf[4..8].try_into().expect("4 bytes")),
        }
    }
}

/// Locates one destination's contiguous run of accessibility records.
///
/// On disk: `destination_id:u32, block_id:u32, offset:u64, count:u32`, 20 bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessibilityBlockIndexEntry {
    /// The destination id this run belongs to.
    pub destination_id: u32,
    /// Id of the block file the run lives in.
    pub block_id: u32,
    /// Byte offset of the first [`AccessibilityRecord`] within that block file.
    pub offset: u64,
    /// Number of records in the run.
    pub count: u32,
}

impl AccessibilityBlockIndexEntry {
    /// Encoded size in bytes.
    pub const SIZE: usize = 20;

    /// Writes the fixed-width encoding to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.destination_id.to_ne_bytes())?;
        writer.write_all(&self.block_id.to_ne_bytes())?;
        writer.write_all(&self.offset.to_ne_bytes())?;
        writer.write_all(&self.count.to_ne_bytes())?;
        Ok(())
    }

    /// Reads one fixed-width record from `reader`.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf)?;
        Ok(Self::from_bytes(&buf))
    }

    /// Decodes one record from an exact `SIZE`-byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is not exactly [`Self::SIZE`] bytes.
    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Self {
        assert_eq!(buf.len(), Self::SIZE);
        Self {
            destination_id: u32::from_ne_bytes(buf[0..4].try_into().expect("4 bytes")),
            block_id: u32::from_ne_bytes(buf[4..8].try_into().expect("4 bytes")),
            offset: u64::from_ne_bytes(buf[8..16].try_into().expect("8 bytes")),
            count: u32::from_ne_bytes(buf[16..20].try_into().expect("4 bytes")),
        }
    }
}

/// One origin-destination accessibility pair.
///
/// On disk: `origin_id:u32, destination_id:u32, time:f32, distance:f32`, 16 bytes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccessibilityRecord {
    /// The origin half of the pair.
    pub origin_id: u32,
    /// The destination half of the pair.
    pub destination_id: u32,
    /// Travel time between the pair.
    pub time: f32,
    /// Travel distance between the pair.
    pub distance: f32,
}

impl AccessibilityRecord {
    /// Encoded size in bytes.
    pub const SIZE: usize = 16;

    /// Writes the fixed-width encoding to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.origin_id.to_ne_bytes())?;
        writer.write_all(&self.destination_id.to_ne_bytes())?;
        writer.write_all(&self.time.to_ne_bytes())?;
        writer.write_all(&self.distance.to_ne_bytes())?;
        Ok(())
    }

    /// Reads one fixed-width record from `reader`.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf)?;
        Ok(Self::from_bytes(&buf))
    }

    /// Decodes one record from an exact `SIZE`-byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is not exactly [`Self::SIZE`] bytes.
    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Self {
        assert_eq!(buf.len(), Self::SIZE);
        Self {
            origin_id: u32::from_ne_bytes(buf[0..4].try_into().expect("4 bytes")),
            destination_id: u32::from_ne_bytes(buf[4..8].try_into().expect("4 bytes")),
            time: f32::from_ne_bytes(buf[8..12].try_into().expect("4 bytes")),
            distance: f32::from_ne_bytes(buf[12..16].try_into().expect("4 bytes")),
        }
    }
}
