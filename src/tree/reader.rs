//! Tree reader
//!
//! Owns the file image, its header and attribute table, and resolves
//! directory entries by offset.

use std::fs::File;
use std::io;
use std::path::Path;

use bytes::Bytes;

use crate::config::{Config, LoadMode};
use crate::error::{MetaError, Result};
use crate::format::{
    parse_header, read_attribute_table, AttributeTable, DataEntryRecord, DirEntryRecord, Header,
    MetaBuffer, MetaValue, DATA_ENTRY_SIZE, DIR_ENTRY_SIZE,
};

use super::NodeView;

/// An opened, validated metadata tree
#[derive(Debug)]
pub struct MetaTree {
    buffer: MetaBuffer,
    header: Header,
    attributes: AttributeTable,
    root: DirEntryRecord,
    max_depth: usize,
}

impl MetaTree {
    /// Open the metadata file at `path`
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        tracing::debug!(path = %path.display(), len, "opening metadata tree");
        Self::from_file(file, len, config)
    }

    /// Load `len` bytes of an already opened file
    ///
    /// The file handle is consumed; with `LoadMode::Mmap` the mapping stays
    /// valid after the descriptor is closed and is released when the tree
    /// is dropped.
    pub fn from_file(mut file: File, len: u64, config: &Config) -> Result<Self> {
        config.validate()?;
        let len = usize::try_from(len).map_err(|_| {
            MetaError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("file of {} bytes cannot be addressed", len),
            ))
        })?;

        let buffer = match config.load_mode {
            LoadMode::Mmap => MetaBuffer::map(&file, len)?,
            LoadMode::Read => MetaBuffer::read_from(&mut file, len)?,
        };
        Self::from_buffer(buffer, config)
    }

    /// Use an in-memory image
    pub fn from_bytes(bytes: impl Into<Bytes>, config: &Config) -> Result<Self> {
        config.validate()?;
        Self::from_buffer(MetaBuffer::from_bytes(bytes), config)
    }

    /// Validate the image; on error the buffer is dropped here
    fn from_buffer(buffer: MetaBuffer, config: &Config) -> Result<Self> {
        let header = parse_header(&buffer)?;
        let root = DirEntryRecord::read(&buffer, header.root as usize)?;
        let attributes = read_attribute_table(&buffer, &header)?;

        tracing::debug!(
            size = buffer.len(),
            mapped = buffer.is_mapped(),
            attributes = attributes.len(),
            rotated = header.is_rotated(),
            "metadata tree opened"
        );

        Ok(Self {
            buffer,
            header,
            attributes,
            root,
            max_depth: config.max_depth,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    pub fn buffer(&self) -> &MetaBuffer {
        &self.buffer
    }

    /// Size of the file image in bytes
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The root node
    pub fn root(&self) -> NodeView<'_> {
        NodeView::root(self, self.root)
    }

    // =========================================================================
    // Offset Resolution
    // =========================================================================

    /// Read the directory entry at `offset`
    pub fn node_at(&self, offset: usize) -> Result<DirEntryRecord> {
        DirEntryRecord::read(&self.buffer, offset)
    }

    /// Directory entries of the child array at `offset` (0 means none)
    pub fn children_of(&self, offset: u32) -> Result<Vec<DirEntryRecord>> {
        self.buffer
            .read_length_prefixed(offset as usize, DIR_ENTRY_SIZE)?
            .map(|element| DirEntryRecord::read(&self.buffer, element))
            .collect()
    }

    /// Number of entries in the child array at `offset`
    pub fn child_count(&self, offset: u32) -> Result<usize> {
        Ok(self
            .buffer
            .read_length_prefixed(offset as usize, DIR_ENTRY_SIZE)?
            .len())
    }

    /// Metadata entries of the array at `offset` (0 means none)
    pub fn metadata_of(&self, offset: u32) -> Result<Vec<DataEntryRecord>> {
        self.buffer
            .read_length_prefixed(offset as usize, DATA_ENTRY_SIZE)?
            .map(|element| DataEntryRecord::read(&self.buffer, element))
            .collect()
    }

    /// Bytes of a string value; list values are not decoded
    pub fn read_value(&self, value: MetaValue) -> Result<&[u8]> {
        match value {
            MetaValue::String(offset) => self.buffer.read_cstring(offset as usize),
            MetaValue::List(_) => Err(MetaError::UnsupportedFeature("list-typed metadata values")),
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Visit every node depth-first, parents before children
    ///
    /// Stops at the first error, including the visitor's own. Pending nodes
    /// live on the heap, so the call stack stays flat at any depth.
    pub fn walk<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&NodeView<'_>) -> Result<()>,
    {
        let mut pending = vec![self.root()];
        while let Some(node) = pending.pop() {
            visitor(&node)?;
            // Reversed so the first child is popped next
            pending.extend(node.children()?.into_iter().rev());
        }
        Ok(())
    }
}
