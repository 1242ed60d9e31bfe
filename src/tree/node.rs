//! Node view
//!
//! Public facade over one directory entry.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{MetaError, Result};
use crate::format::{DataEntryRecord, DirEntryRecord, MetaValue};

use super::MetaTree;

/// One node of a tree, borrowed from the tree that owns the bytes
///
/// Ancestors are shared between siblings, so a view owns its whole path
/// to the root and can outlive the view it was produced from.
#[derive(Clone)]
pub struct NodeView<'a> {
    tree: &'a MetaTree,
    record: DirEntryRecord,
    parent: Option<Arc<NodeView<'a>>>,
    depth: usize,
}

/// A decoded metadata entry, including the ones `metadata()` drops
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaEntry<'a> {
    /// A string value
    Value {
        name: &'a [u8],
        /// File offset of the attribute name
        name_offset: usize,
        value: &'a [u8],
        /// File offset of the value
        offset: usize,
    },

    /// A string value that decoded to nothing
    Empty { name: &'a [u8] },

    /// A list value; its layout is not decoded
    Unsupported { name: &'a [u8], value: MetaValue },

    /// Key id outside the attribute table (or naming an empty attribute)
    UnknownAttribute { key_id: u32 },
}

impl<'a> NodeView<'a> {
    pub(super) fn root(tree: &'a MetaTree, record: DirEntryRecord) -> Self {
        Self {
            tree,
            record,
            parent: None,
            depth: 0,
        }
    }

    pub fn record(&self) -> &DirEntryRecord {
        &self.record
    }

    pub fn parent(&self) -> Option<&NodeView<'a>> {
        self.parent.as_deref()
    }

    /// Levels below the root (the root is 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    // =========================================================================
    // Name
    // =========================================================================

    pub fn name_bytes(&self) -> Result<&'a [u8]> {
        self.tree.buffer().read_cstring(self.record.name as usize)
    }

    pub fn name(&self) -> Result<&'a str> {
        let bytes = self.name_bytes()?;
        std::str::from_utf8(bytes).map_err(|source| MetaError::InvalidUtf8 {
            offset: self.record.name as usize,
            source,
        })
    }

    /// Name with invalid UTF-8 replaced
    pub fn name_lossy(&self) -> Result<Cow<'a, str>> {
        Ok(String::from_utf8_lossy(self.name_bytes()?))
    }

    /// Names from the root down to this node, joined with `/`
    pub fn path(&self) -> Result<String> {
        let mut names = Vec::with_capacity(self.depth + 1);
        let mut node = Some(self);
        while let Some(current) = node {
            names.push(current.name_lossy()?);
            node = current.parent.as_deref();
        }

        let mut path = String::new();
        for name in names.iter().rev() {
            if !path.is_empty() && !path.ends_with('/') {
                path.push('/');
            }
            path.push_str(name);
        }
        Ok(path)
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Child nodes in file order, each pointing back at `self`
    pub fn children(&self) -> Result<Vec<NodeView<'a>>> {
        let records = self.tree.children_of(self.record.children)?;
        let depth = self.depth + 1;
        if !records.is_empty() && depth > self.tree.max_depth() {
            return Err(MetaError::TooDeep {
                limit: self.tree.max_depth(),
            });
        }

        let parent = Arc::new(self.clone());
        Ok(records
            .into_iter()
            .map(|record| NodeView {
                tree: self.tree,
                record,
                parent: Some(Arc::clone(&parent)),
                depth,
            })
            .collect())
    }

    pub fn child_count(&self) -> Result<usize> {
        self.tree.child_count(self.record.children)
    }

    /// First child whose name is exactly `name`
    pub fn child(&self, name: &str) -> Result<Option<NodeView<'a>>> {
        for child in self.children()? {
            if child.name_bytes()? == name.as_bytes() {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Nodes with children are directories; there is no explicit type tag
    pub fn is_directory(&self) -> Result<bool> {
        Ok(self.child_count()? > 0)
    }

    /// Absolute time of the last change
    pub fn last_changed(&self) -> u64 {
        self.tree
            .header()
            .time_t_base
            .saturating_add(u64::from(self.record.last_changed))
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Every metadata entry of this node, classified
    pub fn metadata_entries(&self) -> Result<Vec<MetaEntry<'a>>> {
        let tree = self.tree;
        let records = tree.metadata_of(self.record.metadata)?;

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            entries.push(self.classify(tree, &record)?);
        }
        Ok(entries)
    }

    fn classify(&self, tree: &'a MetaTree, record: &DataEntryRecord) -> Result<MetaEntry<'a>> {
        let key_id = record.key_id();
        let attributes = tree.attributes();
        let (name, name_offset) = match (attributes.get(key_id), attributes.name_offset(key_id)) {
            (Some(name), Some(offset)) if !name.is_empty() => (name, offset),
            _ => return Ok(MetaEntry::UnknownAttribute { key_id }),
        };

        let kind = record.value_kind();
        match tree.read_value(kind) {
            Ok([]) => Ok(MetaEntry::Empty { name }),
            Ok(value) => Ok(MetaEntry::Value {
                name,
                name_offset,
                value,
                offset: record.value as usize,
            }),
            Err(MetaError::UnsupportedFeature(_)) => Ok(MetaEntry::Unsupported { name, value: kind }),
            Err(e) => Err(e),
        }
    }

    /// Attribute name to string value, sorted by name
    ///
    /// Unknown attributes, list values and empty values are left out.
    /// Invalid UTF-8 in a kept entry is reported as `InvalidUtf8`.
    pub fn metadata(&self) -> Result<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        for entry in self.metadata_entries()? {
            if let MetaEntry::Value {
                name,
                name_offset,
                value,
                offset,
            } = entry
            {
                let utf8 = |bytes: &[u8], offset: usize| {
                    std::str::from_utf8(bytes)
                        .map(str::to_owned)
                        .map_err(|source| MetaError::InvalidUtf8 { offset, source })
                };
                map.insert(
                    utf8(name, name_offset)?,
                    utf8(value, offset)?,
                );
            } else {
                self.log_skipped(&entry);
            }
        }
        Ok(map)
    }

    /// Like `metadata()`, with invalid UTF-8 replaced instead of reported
    pub fn metadata_lossy(&self) -> Result<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        for entry in self.metadata_entries()? {
            if let MetaEntry::Value { name, value, .. } = entry {
                map.insert(
                    String::from_utf8_lossy(name).into_owned(),
                    String::from_utf8_lossy(value).into_owned(),
                );
            } else {
                self.log_skipped(&entry);
            }
        }
        Ok(map)
    }

    fn log_skipped(&self, entry: &MetaEntry<'_>) {
        match entry {
            MetaEntry::Unsupported { name, .. } => tracing::warn!(
                node = self.record.offset,
                attribute = %String::from_utf8_lossy(name),
                "skipping list-typed metadata value"
            ),
            MetaEntry::UnknownAttribute { key_id } => tracing::warn!(
                node = self.record.offset,
                key_id,
                "skipping metadata entry with unknown attribute"
            ),
            MetaEntry::Empty { name } => tracing::trace!(
                node = self.record.offset,
                attribute = %String::from_utf8_lossy(name),
                "skipping empty metadata value"
            ),
            MetaEntry::Value { .. } => {}
        }
    }
}

// Unlink ancestors one at a time; dropping a deep chain through the
// default glue would recurse once per level.
impl Drop for NodeView<'_> {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            parent = match Arc::try_unwrap(node) {
                Ok(mut node) => node.parent.take(),
                Err(_) => None,
            };
        }
    }
}

impl fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("record", &self.record)
            .field("depth", &self.depth)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
