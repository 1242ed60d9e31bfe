//! Tree Module
//!
//! Lazily walked view of a metadata tree.
//!
//! ## Responsibilities
//! - Open a file image and validate header, root and attribute table once
//! - Resolve directory entries and metadata arrays on demand by offset
//! - Expose nodes through `NodeView` with a back-reference to their parent
//!
//! Nothing is cached: every traversal re-reads the immutable buffer, so one
//! `MetaTree` can be shared by any number of readers without locking.

mod node;
mod reader;

pub use node::{MetaEntry, NodeView};
pub use reader::MetaTree;
