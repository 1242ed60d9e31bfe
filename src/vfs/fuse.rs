//! FUSE adapter
//!
//! Serves a `MetaRegistry` through the kernel with `fuser`. Requests are
//! translated from inode numbers to VFS paths and answered by the registry;
//! errors are mapped through `MetaError::to_errno()`.
//!
//! The mount is always read-only.

use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fuser::{
    FileAttr, FileType, Filesystem, MountOption, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEntry, Request,
};

use crate::error::{MetaError, Result};

use super::inode::{join, InodeTable, ROOT_INODE};
use super::{FileKind, MetaRegistry, NodeAttr};

/// Trees never change under a mount
const ATTR_TTL: Duration = Duration::from_secs(60);

/// Options for `mount`
#[derive(Debug, Clone, Default)]
pub struct MountOptions {
    /// Let other users see the mount
    pub allow_other: bool,

    /// Unmount when the process exits
    pub auto_unmount: bool,
}

/// One entry returned by `MetaFs::dir_entries`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub ino: u64,
    pub kind: FileType,
    pub name: String,
}

/// `fuser::Filesystem` over a metadata registry
pub struct MetaFs {
    registry: MetaRegistry,
    inodes: InodeTable,

    /// Owner reported for tree nodes
    uid: u32,
    gid: u32,
}

impl MetaFs {
    pub fn new(registry: MetaRegistry) -> Self {
        // SAFETY: getuid/getgid always succeed and touch no memory
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        Self {
            registry,
            inodes: InodeTable::new(),
            uid,
            gid,
        }
    }

    pub fn inodes(&self) -> &InodeTable {
        &self.inodes
    }

    /// Attributes of `path`, giving it an inode on success
    pub fn lookup_path(&mut self, path: &str) -> Result<FileAttr> {
        let attr = self.registry.getattr(path)?;
        let ino = self.inodes.intern(path);
        Ok(self.file_attr(ino, &attr))
    }

    /// Attributes of an inode handed out earlier
    pub fn attr(&mut self, ino: u64) -> Result<FileAttr> {
        let path = self.path_of(ino)?;
        let attr = self.registry.getattr(&path)?;
        Ok(self.file_attr(ino, &attr))
    }

    /// `.`, `..` and the children of directory `ino`
    pub fn dir_entries(&mut self, ino: u64) -> Result<Vec<DirEntry>> {
        let path = self.path_of(ino)?;
        let names = self.registry.readdir(&path)?;

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let (child, kind) = match name.as_str() {
                "." => (ino, FileType::Directory),
                ".." => (self.inodes.parent(ino).unwrap_or(ROOT_INODE), FileType::Directory),
                _ => {
                    let child_path = join(&path, &name);
                    let kind = match self.registry.getattr(&child_path) {
                        Ok(attr) => file_type(attr.kind),
                        Err(e) => {
                            tracing::debug!(path = %child_path, error = %e, "no attributes for entry");
                            FileType::RegularFile
                        }
                    };
                    (self.inodes.intern(&child_path), kind)
                }
            };
            entries.push(DirEntry {
                ino: child,
                kind,
                name,
            });
        }
        Ok(entries)
    }

    /// Up to `len` bytes of the contents of `ino` starting at `offset`
    pub fn read_inode(&mut self, ino: u64, offset: usize, len: usize) -> Result<Vec<u8>> {
        let path = self.path_of(ino)?;
        self.registry.read(&path, offset, len)
    }

    fn path_of(&self, ino: u64) -> Result<String> {
        self.inodes
            .path(ino)
            .map(str::to_owned)
            .ok_or_else(|| MetaError::NotFound(format!("inode {}", ino)))
    }

    fn file_attr(&self, ino: u64, attr: &NodeAttr) -> FileAttr {
        FileAttr {
            ino,
            size: attr.size,
            blocks: attr.blocks,
            atime: system_time(attr.atime),
            mtime: system_time(attr.mtime),
            ctime: system_time(attr.ctime),
            crtime: system_time(attr.ctime),
            kind: file_type(attr.kind),
            perm: attr.perm,
            nlink: 1,
            uid: attr.uid.unwrap_or(self.uid),
            gid: attr.gid.unwrap_or(self.gid),
            rdev: 0,
            blksize: super::BLOCK_SIZE as u32,
            flags: 0,
        }
    }
}

impl Filesystem for MetaFs {
    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let path = name
            .to_str()
            .and_then(|name| self.inodes.child_path(parent, name));
        let result = match path {
            Some(path) => self.lookup_path(&path),
            None => Err(MetaError::NotFound(format!("{:?} in inode {}", name, parent))),
        };

        match result {
            Ok(attr) => reply.entry(&ATTR_TTL, &attr, 0),
            Err(e) => reply.error(log_errno("lookup", parent, &e)),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        match self.attr(ino) {
            Ok(attr) => reply.attr(&ATTR_TTL, &attr),
            Err(e) => reply.error(log_errno("getattr", ino, &e)),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let offset = usize::try_from(offset).unwrap_or(0);
        match self.read_inode(ino, offset, size as usize) {
            Ok(data) => reply.data(&data),
            Err(e) => reply.error(log_errno("read", ino, &e)),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let entries = match self.dir_entries(ino) {
            Ok(entries) => entries,
            Err(e) => return reply.error(log_errno("readdir", ino, &e)),
        };

        // Each entry carries the offset of the one after it
        let skip = usize::try_from(offset).unwrap_or(0);
        for (index, entry) in entries.iter().enumerate().skip(skip) {
            let next = i64::try_from(index + 1).unwrap_or(i64::MAX);
            if reply.add(entry.ino, next, entry.kind, &entry.name) {
                break;
            }
        }
        reply.ok();
    }
}

/// Mount `registry` at `mountpoint` and serve it until unmounted
pub fn mount(registry: MetaRegistry, mountpoint: &Path, options: &MountOptions) -> Result<()> {
    if mountpoint.as_os_str().is_empty() {
        return Err(MetaError::Config("mountpoint cannot be empty".to_string()));
    }

    // Surface an unreadable metadata directory before the mount exists
    let files = registry.list_files()?;
    tracing::info!(
        mountpoint = %mountpoint.display(),
        dir = %registry.config().metadata_dir.display(),
        files = files.len(),
        "mounting metadata trees"
    );

    fuser::mount2(MetaFs::new(registry), mountpoint, &mount_options(options))?;
    tracing::info!(mountpoint = %mountpoint.display(), "unmounted");
    Ok(())
}

/// `fuser` options for a read-only mount
pub fn mount_options(options: &MountOptions) -> Vec<MountOption> {
    let mut opts = vec![
        MountOption::FSName("gvfs-metadata".to_string()),
        MountOption::Subtype("gvfsmeta".to_string()),
        MountOption::RO,
        MountOption::NoAtime,
    ];
    if options.allow_other {
        opts.push(MountOption::AllowOther);
    }
    if options.auto_unmount {
        opts.push(MountOption::AutoUnmount);
    }
    opts
}

fn file_type(kind: FileKind) -> FileType {
    match kind {
        FileKind::Directory => FileType::Directory,
        FileKind::RegularFile => FileType::RegularFile,
    }
}

/// Seconds since the epoch, clamped to what `SystemTime` can hold
fn system_time(secs: u64) -> SystemTime {
    UNIX_EPOCH
        .checked_add(Duration::from_secs(secs))
        .unwrap_or(UNIX_EPOCH)
}

/// Log a failed request and return its errno; misses are routine
fn log_errno(op: &'static str, ino: u64, err: &MetaError) -> libc::c_int {
    let errno = err.to_errno();
    if errno == libc::ENOENT {
        tracing::trace!(op, ino, errno, error = %err, "FUSE op returned ENOENT");
    } else {
        tracing::warn!(op, ino, errno, error = %err, "FUSE op failed");
    }
    errno
}
