//! Attribute table reader
//!
//! Resolves the array of attribute names that metadata keys index into.

use crate::error::Result;

use super::{Header, MetaBuffer, ATTRIBUTE_ENTRY_SIZE};

/// Attribute names in table order; position is the attribute id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTable {
    names: Vec<Vec<u8>>,

    /// File offset of each name's string
    offsets: Vec<usize>,
}

impl AttributeTable {
    /// Name for an attribute id, `None` if the id is out of range
    pub fn get(&self, id: u32) -> Option<&[u8]> {
        self.names.get(id as usize).map(Vec::as_slice)
    }

    /// File offset of the name for an attribute id
    pub fn name_offset(&self, id: u32) -> Option<usize> {
        self.offsets.get(id as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.names.iter().map(Vec::as_slice)
    }
}

/// Read the attribute table referenced by `header`
///
/// Each array element is a 4-byte offset to a NUL-terminated name.
pub fn read_attribute_table(buffer: &MetaBuffer, header: &Header) -> Result<AttributeTable> {
    let elements = buffer.read_length_prefixed(header.attributes as usize, ATTRIBUTE_ENTRY_SIZE)?;

    let mut names = Vec::with_capacity(elements.len());
    let mut offsets = Vec::with_capacity(elements.len());
    for element in elements {
        let name_offset = buffer.read_u32(element)? as usize;
        names.push(buffer.read_cstring(name_offset)?.to_vec());
        offsets.push(name_offset);
    }

    tracing::trace!(count = names.len(), "attribute table resolved");
    Ok(AttributeTable { names, offsets })
}
