//! Format Module
//!
//! On-disk layout of GVfs metadata tree files and the bounds-checked readers
//! over it.
//!
//! ## File Format
//! All integers are big-endian; every reference is a byte offset from the
//! start of the file.
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Header (32 bytes)                                            │
//! │   Magic "\xda\x1ameta" (6) | Major (1) | Minor (1)           │
//! │   Rotated (4) | RandomTag (4) | Root (4) | Attributes (4)    │
//! │   TimeTBase (8)                                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Length-prefixed array                                        │
//! │   [Count: u32][Element 0]...[Element Count-1]                │
//! │   (offset 0 means an empty array)                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Attribute table: array of u32 string offsets                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Directory entry (16 bytes)                                   │
//! │   Name (4) | Children (4) | Metadata (4) | LastChanged (4)   │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Metadata entry (8 bytes)                                     │
//! │   Key (4, top bit = list value) | Value (4)                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Strings: NUL-terminated, anywhere in the file                │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod attributes;
mod buffer;
mod header;
mod records;

pub use attributes::{read_attribute_table, AttributeTable};
pub use buffer::{ElementOffsets, MetaBuffer};
pub use header::{parse_header, Header};
pub use records::{DataEntryRecord, DirEntryRecord, MetaValue};

// =============================================================================
// Shared Constants
// =============================================================================

/// Magic bytes identifying a GVfs metadata tree
pub const MAGIC: &[u8; 6] = b"\xda\x1ameta";

/// Supported format version
pub const MAJOR_VERSION: u8 = 1;
pub const MINOR_VERSION: u8 = 0;

/// Header size: Magic (6) + Major (1) + Minor (1) + Rotated (4) + RandomTag (4)
/// + Root (4) + Attributes (4) + TimeTBase (8) = 32 bytes
pub const HEADER_SIZE: usize = 32;

/// Directory entry: Name + Children + Metadata + LastChanged
pub const DIR_ENTRY_SIZE: usize = 16;

/// Metadata entry: Key + Value
pub const DATA_ENTRY_SIZE: usize = 8;

/// Attribute table element: one string offset
pub const ATTRIBUTE_ENTRY_SIZE: usize = 4;

/// Width of the element count in front of every array
pub const ARRAY_COUNT_SIZE: usize = 4;

/// Top bit of a metadata key marks a list (`STRINGV`) value
pub const KEY_IS_LIST_MASK: u32 = 1 << 31;
