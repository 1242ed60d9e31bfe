//! Tests for the inode table
//!
//! These tests verify:
//! - The root is inode 1 and maps to `/`
//! - Paths keep their inode; new paths get fresh numbers
//! - Parent and child path resolution

use gvfsmeta::vfs::{InodeTable, ROOT_INODE};

// =============================================================================
// Allocation
// =============================================================================

#[test]
fn test_root_inode() {
    let table = InodeTable::new();

    assert_eq!(ROOT_INODE, 1);
    assert_eq!(table.path(ROOT_INODE), Some("/"));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_intern_is_stable() {
    let mut table = InodeTable::new();

    let home = table.intern("/home");
    let a = table.intern("/home/a");

    assert_eq!(table.intern("/home"), home);
    assert_ne!(home, a);
    assert_eq!(table.intern("/"), ROOT_INODE);
    assert_eq!(table.path(a), Some("/home/a"));
    assert_eq!(table.len(), 3);
}

#[test]
fn test_unknown_inodes() {
    let table = InodeTable::new();

    assert_eq!(table.path(0), None);
    assert_eq!(table.path(2), None);
    assert_eq!(table.path(u64::MAX), None);
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn test_child_path() {
    let mut table = InodeTable::new();
    let home = table.intern("/home");

    assert_eq!(table.child_path(ROOT_INODE, "home").unwrap(), "/home");
    assert_eq!(table.child_path(home, "a").unwrap(), "/home/a");
    assert!(table.child_path(99, "a").is_none());
}

#[test]
fn test_parent() {
    let mut table = InodeTable::new();
    let home = table.intern("/home");
    let c = table.intern("/home/b/c");

    assert_eq!(table.parent(ROOT_INODE), Some(ROOT_INODE));
    assert_eq!(table.parent(home), Some(ROOT_INODE));

    let b = table.parent(c).unwrap();
    assert_eq!(table.path(b), Some("/home/b"));
    assert!(table.parent(99).is_none());
}
