//! Tests for the FUSE adapter
//!
//! These tests verify:
//! - Inode-based lookup, getattr, readdir and read over a registry
//! - Owner reporting for host paths and tree nodes
//! - Errno mapping and mount options
//!
//! Nothing is mounted; the adapter is driven through its own methods.

#![cfg(feature = "fuse")]

#[path = "../common/mod.rs"]
mod common;

use common::{sample_image, write_file};
use fuser::{FileType, MountOption};
use gvfsmeta::vfs::{mount, mount_options, MetaFs, MountOptions, ROOT_INODE};
use gvfsmeta::{Config, MetaError, MetaRegistry};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_fs() -> (TempDir, MetaFs) {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "home", &sample_image());
    let registry = MetaRegistry::new(Config::builder().metadata_dir(temp.path()).build());
    (temp, MetaFs::new(registry))
}

// =============================================================================
// Attributes
// =============================================================================

#[test]
fn test_root_attr() {
    let (_temp, mut fs) = setup_fs();

    let attr = fs.attr(ROOT_INODE).unwrap();
    assert_eq!(attr.ino, ROOT_INODE);
    assert_eq!(attr.kind, FileType::Directory);
}

#[test]
fn test_lookup_leaf_node() {
    let (_temp, mut fs) = setup_fs();

    let attr = fs.lookup_path("/home/a").unwrap();

    assert_eq!(attr.kind, FileType::RegularFile);
    assert_eq!(attr.perm, 0o644);
    assert_eq!(attr.size, 3);
    assert_eq!(attr.blocks, 1);
    assert_eq!(attr.nlink, 1);
    assert_eq!(fs.inodes().path(attr.ino), Some("/home/a"));
    assert_eq!(fs.attr(attr.ino).unwrap().ino, attr.ino);
}

#[test]
fn test_owner_of_nodes_and_files() {
    use std::os::unix::fs::MetadataExt;

    let (temp, mut fs) = setup_fs();
    let host = std::fs::metadata(temp.path().join("home")).unwrap();

    let file = fs.lookup_path("/home").unwrap();
    assert_eq!((file.uid, file.gid), (host.uid(), host.gid()));

    // Tree nodes belong to the process, which created the temp dir
    let node = fs.lookup_path("/home/b/c").unwrap();
    assert_eq!((node.uid, node.gid), (host.uid(), host.gid()));
}

#[test]
fn test_unknown_inode_is_enoent() {
    let (_temp, mut fs) = setup_fs();

    let err = fs.attr(42).unwrap_err();
    assert!(matches!(err, MetaError::NotFound(_)));
    assert_eq!(err.to_errno(), libc::ENOENT);
}

// =============================================================================
// Directories and Reads
// =============================================================================

#[test]
fn test_dir_entries() {
    let (_temp, mut fs) = setup_fs();
    let home = fs.lookup_path("/home").unwrap().ino;

    let entries = fs.dir_entries(home).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec![".", "..", "a", "b"]);

    assert_eq!(entries[0].ino, home);
    assert_eq!(entries[1].ino, ROOT_INODE);
    assert_eq!(entries[2].kind, FileType::RegularFile);
    assert_eq!(entries[3].kind, FileType::Directory);
    assert_eq!(fs.inodes().path(entries[3].ino), Some("/home/b"));
}

#[test]
fn test_read_inode() {
    let (_temp, mut fs) = setup_fs();
    let c = fs.lookup_path("/home/b/c").unwrap().ino;

    assert_eq!(fs.read_inode(c, 0, 4096).unwrap(), b"metadata::custom-icon=x");
    assert_eq!(fs.read_inode(c, 10, 6).unwrap(), b"custom");
}

// =============================================================================
// Errors and Mounting
// =============================================================================

#[test]
fn test_errno_mapping() {
    assert_eq!(MetaError::NotFound("x".into()).to_errno(), libc::ENOENT);
    assert_eq!(MetaError::TooDeep { limit: 1 }.to_errno(), libc::EIO);
    assert_eq!(MetaError::UnsupportedFeature("lists").to_errno(), libc::EOPNOTSUPP);

    let io = std::io::Error::from_raw_os_error(libc::EACCES);
    assert_eq!(MetaError::Io(io).to_errno(), libc::EACCES);
}

#[test]
fn test_mount_options_are_read_only() {
    let opts = mount_options(&MountOptions::default());
    assert!(opts.contains(&MountOption::RO));
    assert!(!opts.contains(&MountOption::AllowOther));

    let opts = mount_options(&MountOptions {
        allow_other: true,
        auto_unmount: true,
    });
    assert!(opts.contains(&MountOption::AllowOther));
    assert!(opts.contains(&MountOption::AutoUnmount));
}

#[test]
fn test_mount_rejects_empty_mountpoint() {
    let registry = MetaRegistry::new(Config::builder().metadata_dir("/nonexistent").build());

    let err = mount(registry, std::path::Path::new(""), &MountOptions::default()).unwrap_err();
    assert!(matches!(err, MetaError::Config(_)));
}
