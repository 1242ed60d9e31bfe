//! # gvfsmeta
//!
//! A read-only decoder for GVfs metadata tree files, the binary stores
//! desktop environments use to attach key/value attributes to paths:
//! - Bounds-checked big-endian reads over a mapped or loaded file image
//! - Header and attribute table validation on open
//! - Lazy, offset-driven walking of the directory-entry tree
//! - A filesystem-style view over a whole metadata directory
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  MetaRegistry (vfs)                          │
//! │        getattr / readdir / read over many tree files         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Arc<MetaTree>
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 MetaTree / NodeView (tree)                   │
//! │       name / children / metadata / last_changed              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Header    │          │  Attribute  │
//!   │             │          │    Table    │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └───────────┬────────────┘
//!                      ▼
//!              ┌──────────────┐
//!              │  MetaBuffer  │
//!              │ (mmap/bytes) │
//!              └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use gvfsmeta::{Config, MetaTree};
//!
//! let config = Config::default();
//! let tree = MetaTree::open(&config.metadata_dir.join("home"), &config)?;
//! tree.walk(|node| {
//!     println!("{} {:?}", node.path()?, node.metadata()?);
//!     Ok(())
//! })?;
//! # Ok::<(), gvfsmeta::MetaError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod format;
pub mod tree;
pub mod vfs;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MetaError, Result};
pub use config::{Config, LoadMode};
pub use tree::{MetaEntry, MetaTree, NodeView};
pub use vfs::{render_contents, MetaRegistry};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of gvfsmeta
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
