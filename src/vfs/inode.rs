//! Inode table
//!
//! Assigns stable inode numbers to VFS paths for kernel-facing adapters.
//! Numbers are handed out on first sight and never reused; the trees are
//! read-only, so a path keeps its meaning for the life of a mount.

use std::collections::HashMap;

/// Inode number of `/`
pub const ROOT_INODE: u64 = 1;

/// Bidirectional inode ↔ path map
#[derive(Debug)]
pub struct InodeTable {
    /// Index `i` holds the path of inode `i + 1`
    paths: Vec<String>,
    inodes: HashMap<String, u64>,
}

impl InodeTable {
    pub fn new() -> Self {
        let mut inodes = HashMap::new();
        inodes.insert("/".to_string(), ROOT_INODE);
        Self {
            paths: vec!["/".to_string()],
            inodes,
        }
    }

    /// Path of `ino`, if it has been handed out
    pub fn path(&self, ino: u64) -> Option<&str> {
        let index = usize::try_from(ino.checked_sub(1)?).ok()?;
        self.paths.get(index).map(String::as_str)
    }

    /// Inode of `path`, allocating one on first use
    pub fn intern(&mut self, path: &str) -> u64 {
        if let Some(&ino) = self.inodes.get(path) {
            return ino;
        }
        self.paths.push(path.to_string());
        let ino = self.paths.len() as u64;
        self.inodes.insert(path.to_string(), ino);
        ino
    }

    /// Inode of the directory containing `ino` (the root is its own parent)
    pub fn parent(&mut self, ino: u64) -> Option<u64> {
        let path = self.path(ino)?;
        let parent = match path.rfind('/') {
            Some(0) | None => "/".to_string(),
            Some(index) => path[..index].to_string(),
        };
        Some(self.intern(&parent))
    }

    /// Path of `name` inside the directory `ino`
    pub fn child_path(&self, ino: u64, name: &str) -> Option<String> {
        let parent = self.path(ino)?;
        Some(join(parent, name))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// `parent/name` with a single separator
pub fn join(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}
