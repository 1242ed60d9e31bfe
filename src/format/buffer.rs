//! Raw byte accessor
//!
//! Owns the file image and performs every bounds check in the crate.

use std::fs::File;
use std::io::{self, Read};

use bytes::{Buf, Bytes};
use memmap2::{Mmap, MmapOptions};

use crate::error::{MetaError, Result};

use super::ARRAY_COUNT_SIZE;

/// Where the bytes live
enum Backing {
    Owned(Bytes),
    Mapped(Mmap),
}

/// Immutable file image with bounds-checked big-endian reads
pub struct MetaBuffer {
    backing: Backing,
}

impl MetaBuffer {
    /// Wrap an in-memory image
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            backing: Backing::Owned(bytes.into()),
        }
    }

    /// Map the first `len` bytes of `file` read-only
    pub fn map(file: &File, len: usize) -> Result<Self> {
        // Zero-length mappings are rejected by the OS
        if len == 0 {
            return Ok(Self::from_bytes(Bytes::new()));
        }

        // Pages past the end of the file fault with SIGBUS when touched
        let actual = file.metadata()?.len();
        if actual < len as u64 {
            return Err(MetaError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("cannot map {} bytes of a {} byte file", len, actual),
            )));
        }

        // SAFETY: the mapping is private and read-only. GVfs replaces tree
        // files by rename, so the mapped inode is not rewritten in place.
        let mmap = unsafe { MmapOptions::new().len(len).map(file)? };
        Ok(Self {
            backing: Backing::Mapped(mmap),
        })
    }

    /// Read the first `len` bytes of `file` into memory
    pub fn read_from(file: &mut File, len: usize) -> Result<Self> {
        let mut data = vec![0u8; len];
        file.read_exact(&mut data)?;
        Ok(Self::from_bytes(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Owned(bytes) => bytes,
            Backing::Mapped(mmap) => mmap,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }

    // =========================================================================
    // Primitive Reads
    // =========================================================================

    /// Borrow `len` bytes at `offset`, failing if any of them lie past the end
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let data = self.as_bytes();
        match offset.checked_add(len) {
            Some(end) if end <= data.len() => Ok(&data[offset..end]),
            _ => Err(MetaError::OutOfBounds {
                offset,
                len,
                size: data.len(),
            }),
        }
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        let mut bytes = self.slice(offset, 1)?;
        Ok(bytes.get_u8())
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let mut bytes = self.slice(offset, 4)?;
        Ok(bytes.get_u32())
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64> {
        let mut bytes = self.slice(offset, 8)?;
        Ok(bytes.get_u64())
    }

    pub fn read_fixed<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let bytes = self.slice(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Bytes from `offset` up to (not including) the next NUL
    pub fn read_cstring(&self, offset: usize) -> Result<&[u8]> {
        let data = self.as_bytes();
        if offset >= data.len() {
            return Err(MetaError::OutOfBounds {
                offset,
                len: 1,
                size: data.len(),
            });
        }

        let tail = &data[offset..];
        match tail.iter().position(|&b| b == 0) {
            Some(nul) => Ok(&tail[..nul]),
            None => Err(MetaError::Unterminated { offset }),
        }
    }

    /// Start offsets of the elements of the length-prefixed array at `offset`
    ///
    /// Offset 0 is the empty array and is not dereferenced. Otherwise the
    /// whole array must fit in the buffer before any element is yielded.
    pub fn read_length_prefixed(&self, offset: usize, element_size: usize) -> Result<ElementOffsets> {
        if offset == 0 {
            return Ok(ElementOffsets::empty());
        }

        let count = self.read_u32(offset)?;
        let first = offset + ARRAY_COUNT_SIZE;
        let out_of_bounds = || MetaError::OutOfBounds {
            offset: first,
            len: (count as usize).saturating_mul(element_size),
            size: self.len(),
        };

        let span = (count as usize)
            .checked_mul(element_size)
            .ok_or_else(out_of_bounds)?;
        match first.checked_add(span) {
            Some(end) if end <= self.len() => {}
            _ => return Err(out_of_bounds()),
        }

        Ok(ElementOffsets {
            first,
            element_size,
            index: 0,
            count: count as usize,
        })
    }
}

impl std::fmt::Debug for MetaBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaBuffer")
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

/// Iterator over the element offsets of a validated array
#[derive(Debug, Clone)]
pub struct ElementOffsets {
    first: usize,
    element_size: usize,
    index: usize,
    count: usize,
}

impl ElementOffsets {
    fn empty() -> Self {
        Self {
            first: 0,
            element_size: 0,
            index: 0,
            count: 0,
        }
    }
}

impl Iterator for ElementOffsets {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let offset = self.first + self.index * self.element_size;
        self.index += 1;
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ElementOffsets {}
