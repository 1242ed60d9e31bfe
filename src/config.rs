//! Configuration for gvfsmeta
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{MetaError, Result};

/// Default recursion cap for tree walks
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// Main configuration for opening and exploring metadata trees
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Location
    // -------------------------------------------------------------------------
    /// Directory holding the GVfs metadata files
    /// Typical contents:
    ///   {metadata_dir}/
    ///     ├── home           (tree for the home filesystem)
    ///     ├── home-1a2b3c4d.log  (journal, not a tree)
    ///     └── root
    pub metadata_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Decoding
    // -------------------------------------------------------------------------
    /// Maximum nesting depth accepted before a tree is treated as corrupt
    pub max_depth: usize,

    /// How file bytes are brought into memory
    pub load_mode: LoadMode,
}

/// Strategy for loading a metadata file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Map the file read-only (zero copy)
    Mmap,

    /// Read the whole file into an owned buffer
    Read,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata_dir: default_metadata_dir(),
            max_depth: DEFAULT_MAX_DEPTH,
            load_mode: LoadMode::Mmap,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings no tree could be opened with
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(MetaError::Config("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// `$HOME/.local/share/gvfs-metadata`, or a relative fallback without `HOME`
fn default_metadata_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local/share/gvfs-metadata"),
        None => PathBuf::from("./gvfs-metadata"),
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the metadata directory
    pub fn metadata_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.metadata_dir = path.into();
        self
    }

    /// Set the maximum tree depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the load mode
    pub fn load_mode(mut self, mode: LoadMode) -> Self {
        self.config.load_mode = mode;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
