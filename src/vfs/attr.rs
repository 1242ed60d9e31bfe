//! File attributes
//!
//! What a `stat` of a VFS path reports.

use std::fmt;
use std::fs::Metadata;
use std::time::UNIX_EPOCH;

/// Unit for `blocks`
pub const BLOCK_SIZE: u64 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    RegularFile,
}

/// Attributes of one VFS path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttr {
    pub kind: FileKind,
    /// Permission bits only (no file type bits)
    pub perm: u16,
    pub size: u64,
    pub blocks: u64,
    pub atime: u64,
    pub mtime: u64,
    pub ctime: u64,
    /// Owner of the backing host path; `None` for tree nodes
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl NodeAttr {
    /// Attributes of a tree node: rendered content size, one timestamp
    pub(super) fn for_node(is_directory: bool, size: u64, last_changed: u64) -> Self {
        let (kind, perm) = if is_directory {
            (FileKind::Directory, 0o755)
        } else {
            (FileKind::RegularFile, 0o644)
        };
        Self {
            kind,
            perm,
            size,
            blocks: size.div_ceil(BLOCK_SIZE),
            atime: last_changed,
            mtime: last_changed,
            ctime: last_changed,
            uid: None,
            gid: None,
        }
    }

    /// Attributes of a real file or directory presented as a directory
    ///
    /// Tree files are shown as directories readable by everyone.
    pub(super) fn for_host_path(metadata: &Metadata, force_readable: bool) -> Self {
        let secs = |time: std::io::Result<std::time::SystemTime>| {
            time.ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0)
        };
        let mtime = secs(metadata.modified());
        let mut perm = host_perm(metadata);
        if force_readable {
            perm |= 0o555;
        }
        let (uid, gid) = host_owner(metadata);

        Self {
            kind: FileKind::Directory,
            perm,
            size: metadata.len(),
            blocks: metadata.len().div_ceil(BLOCK_SIZE),
            atime: secs(metadata.accessed()),
            mtime,
            ctime: mtime,
            uid,
            gid,
        }
    }
}

#[cfg(unix)]
fn host_perm(metadata: &Metadata) -> u16 {
    use std::os::unix::fs::PermissionsExt;
    (metadata.permissions().mode() & 0o777) as u16
}

#[cfg(not(unix))]
fn host_perm(metadata: &Metadata) -> u16 {
    if metadata.permissions().readonly() {
        0o555
    } else {
        0o755
    }
}

#[cfg(unix)]
fn host_owner(metadata: &Metadata) -> (Option<u32>, Option<u32>) {
    use std::os::unix::fs::MetadataExt;
    (Some(metadata.uid()), Some(metadata.gid()))
}

#[cfg(not(unix))]
fn host_owner(_metadata: &Metadata) -> (Option<u32>, Option<u32>) {
    (None, None)
}

impl fmt::Display for NodeAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            FileKind::Directory => "directory",
            FileKind::RegularFile => "regular file",
        };
        write!(
            f,
            "type={} mode={:04o} size={} blocks={} mtime={}",
            kind, self.perm, self.size, self.blocks, self.mtime
        )
    }
}
