//! Header reader
//!
//! Parses and validates the fixed header at offset 0.

use std::fmt;

use crate::error::{MetaError, Result};

use super::{MetaBuffer, MAGIC, MAJOR_VERSION, MINOR_VERSION};

/// Decoded file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub major: u8,
    pub minor: u8,
    /// Set by the writer once a newer tree has replaced this one
    pub rotated: u32,
    /// Pairs the tree with its journal file
    pub random_tag: u32,
    /// Offset of the root directory entry
    pub root: u32,
    /// Offset of the attribute-name array, 0 if absent
    pub attributes: u32,
    /// Absolute time all relative timestamps are added to
    pub time_t_base: u64,
}

impl Header {
    pub fn is_rotated(&self) -> bool {
        self.rotated != 0
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version {}.{} time_t_base={} root={} attributes={} rotated={} random_tag={:#010x}",
            self.major,
            self.minor,
            self.time_t_base,
            self.root,
            self.attributes,
            self.rotated,
            self.random_tag
        )
    }
}

/// Read and validate the header
///
/// Fails with `BadMagic` or `UnsupportedVersion` for files this decoder
/// cannot read, and `OutOfBounds` for files shorter than a header.
pub fn parse_header(buffer: &MetaBuffer) -> Result<Header> {
    let magic: [u8; 6] = buffer.read_fixed(0)?;
    if &magic != MAGIC {
        return Err(MetaError::BadMagic { found: magic });
    }

    let major = buffer.read_u8(6)?;
    let minor = buffer.read_u8(7)?;
    if (major, minor) != (MAJOR_VERSION, MINOR_VERSION) {
        return Err(MetaError::UnsupportedVersion { major, minor });
    }

    Ok(Header {
        major,
        minor,
        rotated: buffer.read_u32(8)?,
        random_tag: buffer.read_u32(12)?,
        root: buffer.read_u32(16)?,
        attributes: buffer.read_u32(20)?,
        time_t_base: buffer.read_u64(24)?,
    })
}
