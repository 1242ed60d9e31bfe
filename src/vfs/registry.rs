//! Metadata Registry
//!
//! Discovers tree files in the metadata directory and opens them on demand.
//!
//! ## Concurrency:
//! - `files`: Protected by a Mutex, held across probing and lazy opens so
//!   each file is opened at most once
//! - Opened trees are handed out as `Arc<MetaTree>` and read without locking

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{MetaError, Result};
use crate::tree::{MetaTree, NodeView};

use super::{render_contents, NodeAttr};

/// File name → tree, `None` until first opened
type FileTable = BTreeMap<String, Option<Arc<MetaTree>>>;

/// Registry of the metadata trees in one directory
pub struct MetaRegistry {
    config: Config,

    /// `None` until the directory has been probed
    files: Mutex<Option<FileTable>>,
}

impl MetaRegistry {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            files: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names of the files in the metadata directory that are valid trees
    ///
    /// Probed once; later calls return the cached result.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut files = self.files.lock();
        let table = Self::probed(&self.config, &mut files)?;
        Ok(table.keys().cloned().collect())
    }

    /// The tree for `name`, opened on first use
    pub fn tree(&self, name: &str) -> Result<Arc<MetaTree>> {
        let mut files = self.files.lock();
        let table = Self::probed(&self.config, &mut files)?;

        let slot = table
            .get_mut(name)
            .ok_or_else(|| MetaError::NotFound(format!("/{}", name)))?;
        if let Some(tree) = slot {
            return Ok(Arc::clone(tree));
        }

        let tree = Arc::new(MetaTree::open(
            &self.config.metadata_dir.join(name),
            &self.config,
        )?);
        tracing::info!(file = name, "opened metadata tree");
        *slot = Some(Arc::clone(&tree));
        Ok(tree)
    }

    // =========================================================================
    // Filesystem Operations
    // =========================================================================

    /// Attributes of `path`
    pub fn getattr(&self, path: &str) -> Result<NodeAttr> {
        let parts = split_path(path);
        match parts.as_slice() {
            [] => {
                let metadata = fs::metadata(&self.config.metadata_dir)?;
                Ok(NodeAttr::for_host_path(&metadata, false))
            }
            [file] => {
                // Fails with NotFound for anything that is not a valid tree
                self.tree(file)?;
                let metadata = fs::metadata(self.config.metadata_dir.join(file))?;
                Ok(NodeAttr::for_host_path(&metadata, true))
            }
            [file, rest @ ..] => {
                let tree = self.tree(file)?;
                with_node(tree.root(), rest, path, |node| {
                    let contents = render_contents(&node.metadata_lossy()?);
                    Ok(NodeAttr::for_node(
                        node.is_directory()?,
                        contents.len() as u64,
                        node.last_changed(),
                    ))
                })
            }
        }
    }

    /// Entries of the directory at `path`, starting with `.` and `..`
    pub fn readdir(&self, path: &str) -> Result<Vec<String>> {
        let parts = split_path(path);
        let mut entries = vec![".".to_string(), "..".to_string()];

        match parts.split_first() {
            None => entries.extend(self.list_files()?),
            Some((file, rest)) => {
                let tree = self.tree(file)?;
                let names = with_node(tree.root(), rest, path, |node| {
                    node.children()?
                        .iter()
                        .map(|child| child.name_lossy().map(|name| name.into_owned()))
                        .collect::<Result<Vec<_>>>()
                })?;
                entries.extend(names);
            }
        }
        Ok(entries)
    }

    /// Rendered metadata of the node at `path`
    pub fn contents(&self, path: &str) -> Result<String> {
        let parts = split_path(path);
        let (file, rest) = match parts.split_first() {
            Some((file, rest)) if !rest.is_empty() => (file, rest),
            _ => return Err(MetaError::NotFound(path.to_string())),
        };

        let tree = self.tree(file)?;
        with_node(tree.root(), rest, path, |node| {
            Ok(render_contents(&node.metadata_lossy()?))
        })
    }

    /// Up to `len` bytes of the contents of `path` starting at `offset`
    pub fn read(&self, path: &str, offset: usize, len: usize) -> Result<Vec<u8>> {
        let contents = self.contents(path)?;
        let bytes = contents.as_bytes();
        let start = offset.min(bytes.len());
        let end = start.saturating_add(len).min(bytes.len());
        Ok(bytes[start..end].to_vec())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Probe the directory if that has not happened yet
    fn probed<'t>(config: &Config, files: &'t mut Option<FileTable>) -> Result<&'t mut FileTable> {
        let table = match files.take() {
            Some(table) => table,
            None => Self::probe(config)?,
        };
        Ok(files.insert(table))
    }

    /// Open every regular file once and keep the ones that are trees
    fn probe(config: &Config) -> Result<FileTable> {
        let mut table = FileTable::new();

        for entry in fs::read_dir(&config.metadata_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping file with non UTF-8 name");
                continue;
            };

            // The probe tree is dropped (and unmapped) right away
            match MetaTree::open(&path, config) {
                Ok(_) => {
                    table.insert(name.to_string(), None);
                }
                Err(e) if e.is_format_error() => {
                    tracing::debug!(file = name, error = %e, "not a metadata tree");
                }
                Err(e) if e.is_corruption() => {
                    tracing::warn!(file = name, error = %e, "skipping corrupt metadata tree");
                }
                Err(e) => {
                    tracing::warn!(file = name, error = %e, "failed to probe metadata file");
                }
            }
        }

        tracing::info!(
            dir = %config.metadata_dir.display(),
            count = table.len(),
            "probed metadata directory"
        );
        Ok(table)
    }
}

/// Non-empty components of a `/`-separated path
fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Resolve `parts` below `node` by child name and hand the result to `f`
fn with_node<R, F>(mut node: NodeView<'_>, parts: &[&str], path: &str, f: F) -> Result<R>
where
    F: FnOnce(&NodeView<'_>) -> Result<R>,
{
    for name in parts {
        node = node
            .child(name)?
            .ok_or_else(|| MetaError::NotFound(path.to_string()))?;
    }
    f(&node)
}
