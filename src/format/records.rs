//! Fixed-size records
//!
//! Directory entries and metadata entries, decoded from their offsets.

use crate::error::Result;

use super::{MetaBuffer, DATA_ENTRY_SIZE, DIR_ENTRY_SIZE, KEY_IS_LIST_MASK};

/// One 16-byte directory entry (a tree node)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntryRecord {
    /// Where this record was read from
    pub offset: u32,
    /// Offset of the NUL-terminated node name
    pub name: u32,
    /// Offset of the child array, 0 if none
    pub children: u32,
    /// Offset of the metadata array, 0 if none
    pub metadata: u32,
    /// Relative to the header's `time_t_base`
    pub last_changed: u32,
}

impl DirEntryRecord {
    pub fn read(buffer: &MetaBuffer, offset: usize) -> Result<Self> {
        // One check for the whole record keeps the error pointing at it
        buffer.slice(offset, DIR_ENTRY_SIZE)?;
        Ok(Self {
            offset: offset as u32,
            name: buffer.read_u32(offset)?,
            children: buffer.read_u32(offset + 4)?,
            metadata: buffer.read_u32(offset + 8)?,
            last_changed: buffer.read_u32(offset + 12)?,
        })
    }
}

/// One 8-byte metadata entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataEntryRecord {
    /// Attribute id in the low 31 bits, list flag in the top bit
    pub key: u32,
    /// Offset of the value
    pub value: u32,
}

impl DataEntryRecord {
    pub fn read(buffer: &MetaBuffer, offset: usize) -> Result<Self> {
        buffer.slice(offset, DATA_ENTRY_SIZE)?;
        Ok(Self {
            key: buffer.read_u32(offset)?,
            value: buffer.read_u32(offset + 4)?,
        })
    }

    /// Index into the attribute table
    pub fn key_id(&self) -> u32 {
        self.key & !KEY_IS_LIST_MASK
    }

    pub fn is_list(&self) -> bool {
        self.key & KEY_IS_LIST_MASK != 0
    }

    /// The value's kind as selected by the list flag
    pub fn value_kind(&self) -> MetaValue {
        if self.is_list() {
            MetaValue::List(self.value)
        } else {
            MetaValue::String(self.value)
        }
    }
}

/// Typed reference to a metadata value
///
/// The on-disk layout of list values is undocumented, so `List` is carried
/// through as an inert variant and never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaValue {
    /// Offset of a NUL-terminated string
    String(u32),

    /// Offset of a list value (`STRINGV`)
    List(u32),
}
