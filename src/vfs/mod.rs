//! VFS Module
//!
//! Presents a directory of metadata trees as a read-only filesystem.
//!
//! ## Layout
//! ```text
//! /                       the metadata directory
//! /home                   one directory per valid tree file (its root node)
//! /home/a/b               nodes resolved by child name from the root
//! ```
//! A node with children is a directory; any other node is a regular file
//! whose contents are its metadata rendered as sorted `key=value` lines.
//!
//! This layer does no offset arithmetic; everything goes through `MetaTree`
//! and `NodeView`. With the `fuse` feature the same layout can be mounted.

mod attr;
mod contents;
#[cfg(feature = "fuse")]
mod fuse;
mod inode;
mod registry;

pub use attr::{FileKind, NodeAttr, BLOCK_SIZE};
pub use contents::render_contents;
#[cfg(feature = "fuse")]
pub use fuse::{mount, mount_options, DirEntry, MetaFs, MountOptions};
pub use inode::{InodeTable, ROOT_INODE};
pub use registry::MetaRegistry;
