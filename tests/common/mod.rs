//! Shared fixtures: an encoder for metadata tree images
//!
//! Lays files out the way GVfs does: header first, every referenced string
//! and array before the record that points at it, root entry last.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use gvfsmeta::{Config, MetaTree};

pub const MAGIC: &[u8; 6] = b"\xda\x1ameta";
pub const HEADER_SIZE: usize = 32;
pub const LIST_FLAG: u32 = 1 << 31;

// =============================================================================
// Fixture Description
// =============================================================================

/// Value of one fixture metadata entry
#[derive(Debug, Clone)]
pub enum FixtureValue {
    /// Written as a NUL-terminated string
    Str(Vec<u8>),
    /// Stored verbatim as the value offset
    RawOffset(u32),
}

/// One node to encode
#[derive(Debug, Clone)]
pub struct FixtureNode {
    pub name: Vec<u8>,
    pub last_changed: u32,
    pub metadata: Vec<(u32, FixtureValue)>,
    pub children: Vec<FixtureNode>,
    /// Replaces the encoded metadata offset
    pub metadata_offset: Option<u32>,
}

impl FixtureNode {
    pub fn new(name: &str) -> Self {
        Self::with_name_bytes(name.as_bytes())
    }

    pub fn with_name_bytes(name: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            last_changed: 0,
            metadata: Vec::new(),
            children: Vec::new(),
            metadata_offset: None,
        }
    }

    pub fn changed(mut self, last_changed: u32) -> Self {
        self.last_changed = last_changed;
        self
    }

    /// Metadata entry with a raw key (attribute id, optionally `LIST_FLAG`)
    pub fn meta(self, key: u32, value: &str) -> Self {
        self.meta_bytes(key, value.as_bytes())
    }

    pub fn meta_bytes(mut self, key: u32, value: &[u8]) -> Self {
        self.metadata.push((key, FixtureValue::Str(value.to_vec())));
        self
    }

    pub fn meta_raw(mut self, key: u32, value_offset: u32) -> Self {
        self.metadata.push((key, FixtureValue::RawOffset(value_offset)));
        self
    }

    pub fn metadata_at(mut self, offset: u32) -> Self {
        self.metadata_offset = Some(offset);
        self
    }

    pub fn child(mut self, child: FixtureNode) -> Self {
        self.children.push(child);
        self
    }
}

// =============================================================================
// Image Encoder
// =============================================================================

pub struct ImageBuilder {
    root: FixtureNode,
    attributes: Vec<Vec<u8>>,
    time_t_base: u64,
    major: u8,
    minor: u8,
    rotated: u32,
    random_tag: u32,
}

impl ImageBuilder {
    pub fn new(root: FixtureNode) -> Self {
        Self {
            root,
            attributes: Vec::new(),
            time_t_base: 0,
            major: 1,
            minor: 0,
            rotated: 0,
            random_tag: 0x1234_5678,
        }
    }

    pub fn attributes(mut self, names: &[&str]) -> Self {
        self.attributes = names.iter().map(|n| n.as_bytes().to_vec()).collect();
        self
    }

    /// Attribute names that need not be valid UTF-8
    pub fn attribute_bytes(mut self, names: &[&[u8]]) -> Self {
        self.attributes = names.iter().map(|n| n.to_vec()).collect();
        self
    }

    pub fn time_t_base(mut self, base: u64) -> Self {
        self.time_t_base = base;
        self
    }

    pub fn version(mut self, major: u8, minor: u8) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn rotated(mut self, rotated: u32) -> Self {
        self.rotated = rotated;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE];

        let attributes_offset = if self.attributes.is_empty() {
            0
        } else {
            let name_offsets: Vec<u32> = self
                .attributes
                .iter()
                .map(|name| push_cstring(&mut buf, name))
                .collect();
            let offset = buf.len() as u32;
            push_u32(&mut buf, name_offsets.len() as u32);
            for name_offset in name_offsets {
                push_u32(&mut buf, name_offset);
            }
            offset
        };

        let root_record = write_node(&mut buf, &self.root);
        let root_offset = buf.len() as u32;
        buf.extend_from_slice(&root_record);

        buf[0..6].copy_from_slice(MAGIC);
        buf[6] = self.major;
        buf[7] = self.minor;
        buf[8..12].copy_from_slice(&self.rotated.to_be_bytes());
        buf[12..16].copy_from_slice(&self.random_tag.to_be_bytes());
        buf[16..20].copy_from_slice(&root_offset.to_be_bytes());
        buf[20..24].copy_from_slice(&attributes_offset.to_be_bytes());
        buf[24..32].copy_from_slice(&self.time_t_base.to_be_bytes());
        buf
    }
}

pub fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

pub fn push_cstring(buf: &mut Vec<u8>, bytes: &[u8]) -> u32 {
    let offset = buf.len() as u32;
    buf.extend_from_slice(bytes);
    buf.push(0);
    offset
}

/// Write everything `node` references and return its 16-byte record
fn write_node(buf: &mut Vec<u8>, node: &FixtureNode) -> [u8; 16] {
    let name = push_cstring(buf, &node.name);

    let child_records: Vec<[u8; 16]> = node.children.iter().map(|c| write_node(buf, c)).collect();
    let children = if child_records.is_empty() {
        0
    } else {
        let offset = buf.len() as u32;
        push_u32(buf, child_records.len() as u32);
        for record in &child_records {
            buf.extend_from_slice(record);
        }
        offset
    };

    let entries: Vec<(u32, u32)> = node
        .metadata
        .iter()
        .map(|(key, value)| match value {
            FixtureValue::Str(bytes) => (*key, push_cstring(buf, bytes)),
            FixtureValue::RawOffset(offset) => (*key, *offset),
        })
        .collect();
    let metadata = if let Some(offset) = node.metadata_offset {
        offset
    } else if entries.is_empty() {
        0
    } else {
        let offset = buf.len() as u32;
        push_u32(buf, entries.len() as u32);
        for (key, value) in entries {
            push_u32(buf, key);
            push_u32(buf, value);
        }
        offset
    };

    let mut record = [0u8; 16];
    record[0..4].copy_from_slice(&name.to_be_bytes());
    record[4..8].copy_from_slice(&children.to_be_bytes());
    record[8..12].copy_from_slice(&metadata.to_be_bytes());
    record[12..16].copy_from_slice(&node.last_changed.to_be_bytes());
    record
}

/// Root plus `depth` nested nodes, encoded leaf first without recursion
pub fn flat_chain_image(depth: usize) -> Vec<u8> {
    let mut bytes = raw_header(0, 0, 0);
    let name = push_cstring(&mut bytes, b"n");

    let mut children = 0;
    for _ in 0..depth {
        let array = bytes.len() as u32;
        push_u32(&mut bytes, 1);
        for field in [name, children, 0, 0] {
            push_u32(&mut bytes, field);
        }
        children = array;
    }

    let root = bytes.len() as u32;
    for field in [name, children, 0, 0] {
        push_u32(&mut bytes, field);
    }
    bytes[16..20].copy_from_slice(&root.to_be_bytes());
    bytes
}

/// Header with valid magic and version and the given offsets
pub fn raw_header(root: u32, attributes: u32, time_t_base: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    buf.extend_from_slice(MAGIC);
    buf.push(1);
    buf.push(0);
    push_u32(&mut buf, 0);
    push_u32(&mut buf, 0);
    push_u32(&mut buf, root);
    push_u32(&mut buf, attributes);
    buf.extend_from_slice(&time_t_base.to_be_bytes());
    buf
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Root "/" with a leaf "a" ({"k": "v"}) and a directory "b" holding "c"
pub fn sample_image() -> Vec<u8> {
    let root = FixtureNode::new("/")
        .changed(5)
        .child(FixtureNode::new("a").changed(10).meta(0, "v"))
        .child(FixtureNode::new("b").changed(20).child(FixtureNode::new("c").meta(1, "x")));
    ImageBuilder::new(root)
        .attributes(&["k", "metadata::custom-icon"])
        .time_t_base(1_600_000_000)
        .build()
}

/// Linear chain of `depth` nodes below the root
pub fn chain_image(depth: usize) -> Vec<u8> {
    let mut node = FixtureNode::new("leaf");
    for level in (0..depth).rev() {
        node = FixtureNode::new(&format!("level{}", level)).child(node);
    }
    ImageBuilder::new(FixtureNode::new("/").child(node)).build()
}

pub fn test_config() -> Config {
    Config::builder().metadata_dir("/nonexistent").build()
}

pub fn open_bytes(bytes: Vec<u8>) -> MetaTree {
    MetaTree::from_bytes(bytes, &test_config()).unwrap()
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}
