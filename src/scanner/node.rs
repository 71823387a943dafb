//! src/scanner/node.rs
//! ============================================================================
//! # Node: In-Memory Tree Entity
//!
//! Represents one file or directory in the scanned tree. Optimized for memory
//! so that million-node trees stay affordable: names are `CompactString`
//! path components (the root alone stores the absolute scan path), and the
//! full path is reconstructed on demand by walking the parent chain.
//!
//! The size counter is atomic with release/acquire ordering: a reader that
//! observes a directory's aggregated size also observes the child mutations
//! that preceded the aggregation.

use compact_str::CompactString;
use parking_lot::RwLock;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI8, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// `sort_mode` tag: children ordered by size, descending.
pub const SORT_BY_SIZE: i8 = 0;
/// `sort_mode` tag: children ordered by name, ascending.
pub const SORT_BY_NAME: i8 = 1;
/// `sort_mode` tag: children never sorted since the scan appended them.
pub const NEVER_SORTED: i8 = -1;

/// A file or directory in the scanned tree.
pub struct Node {
    /// Path component (e.g. "photo.jpg"). The root node stores the full
    /// absolute scan path.
    pub name: CompactString,

    /// Whether this node can have children. Symlinks are always `false`.
    pub is_dir: bool,

    /// Recursive byte total. Atomic to support concurrent aggregation
    /// during the scan and subtractive maintenance after a trash.
    size: AtomicI64,

    /// Sub-nodes, in whatever order the last sorter produced (encounter
    /// order until first sorted). Written by the owning scan task during
    /// the scan and by the navigation layer afterwards.
    pub children: RwLock<Vec<Arc<Node>>>,

    /// First error encountered while reading this node, if any. Does not
    /// abort the scan; the subtree is treated as empty.
    err: OnceLock<io::Error>,

    /// Back reference for path reconstruction. Lookup only, never owning.
    parent: Weak<Node>,

    /// Generation at which `children` were last sorted (O(1) staleness check).
    sort_gen: AtomicU64,

    /// Sort mode used at that generation.
    sort_mode: AtomicI8,
}

impl Node {
    /// Construct the root node. `name` is the absolute scan path.
    pub fn root(name: impl Into<CompactString>, is_dir: bool) -> Arc<Self> {
        Arc::new(Self::bare(name.into(), is_dir, Weak::new()))
    }

    /// Construct a child of `parent`. The caller appends it to
    /// `parent.children` — construction and linkage are separate so the
    /// scanner controls encounter order.
    pub fn child(parent: &Arc<Node>, name: impl Into<CompactString>, is_dir: bool) -> Arc<Self> {
        Arc::new(Self::bare(name.into(), is_dir, Arc::downgrade(parent)))
    }

    fn bare(name: CompactString, is_dir: bool, parent: Weak<Node>) -> Self {
        Self {
            name,
            is_dir,
            size: AtomicI64::new(0),
            children: RwLock::new(Vec::new()),
            err: OnceLock::new(),
            parent,
            sort_gen: AtomicU64::new(0),
            sort_mode: AtomicI8::new(NEVER_SORTED),
        }
    }

    /// Total size in bytes (recursive for directories). Acquire ordering.
    pub fn size(&self) -> i64 {
        self.size.load(Ordering::Acquire)
    }

    /// Atomically add `delta` bytes (negative during trash maintenance).
    /// Release ordering pairs with the acquire in [`Node::size`].
    pub fn add_size(&self, delta: i64) {
        self.size.fetch_add(delta, Ordering::Release);
    }

    /// Set the size directly. Used for leaf entries whose size comes
    /// straight from metadata.
    pub fn set_size(&self, bytes: i64) {
        self.size.store(bytes, Ordering::Release);
    }

    /// Record a read failure for this node. The first error wins; later
    /// ones (e.g. a close failure after a read failure) are dropped.
    pub fn record_err(&self, e: io::Error) {
        let _ = self.err.set(e);
    }

    /// The error captured during the scan, if any.
    pub fn err(&self) -> Option<&io::Error> {
        self.err.get()
    }

    /// Upgrade the parent back-reference. `None` for the root (or after the
    /// tree has been dropped, which navigation never outlives).
    pub fn parent(&self) -> Option<Arc<Node>> {
        self.parent.upgrade()
    }

    /// Whether `children` are already ordered for the given generation/mode.
    pub fn is_sorted(&self, r#gen: u64, mode: i8) -> bool {
        self.sort_gen.load(Ordering::Relaxed) == r#gen
            && self.sort_mode.load(Ordering::Relaxed) == mode
    }

    /// Record that `children` are ordered for the given generation/mode.
    pub fn mark_sorted(&self, r#gen: u64, mode: i8) {
        self.sort_gen.store(r#gen, Ordering::Relaxed);
        self.sort_mode.store(mode, Ordering::Relaxed);
    }

    /// Sort children by size, largest first. Ties in arbitrary order.
    pub fn sort_by_size(&self) {
        self.children
            .write()
            .sort_unstable_by(|a, b| b.size().cmp(&a.size()));
    }

    /// Sort children by name, ascending, byte-wise.
    pub fn sort_by_name(&self) {
        self.children
            .write()
            .sort_unstable_by(|a, b| a.name.cmp(&b.name));
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.read().len()
    }

    /// Reconstruct the absolute path by walking up to the root, joining
    /// components with exactly one separator each. Slower than storing full
    /// paths but saves ~100 bytes per node on deep trees; called only on
    /// user interaction (open, reveal, trash), never in render or scan
    /// hot paths.
    pub fn full_path(&self) -> PathBuf {
        let mut parts: Vec<CompactString> = vec![self.name.clone()];
        let mut cur: Option<Arc<Node>> = self.parent.upgrade();
        while let Some(n) = cur {
            parts.push(n.name.clone());
            cur = n.parent();
        }

        let mut path = PathBuf::new();
        for part in parts.iter().rev() {
            path.push(part.as_str());
        }
        path
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("is_dir", &self.is_dir)
            .field("size", &self.size())
            .field("children", &self.child_count())
            .field("err", &self.err.get().map(|e| e.to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (Arc<Node>, Arc<Node>, Arc<Node>) {
        let root = Node::root("/scan/root", true);
        let a = Node::child(&root, "aaa.txt", false);
        let b = Node::child(&root, "bbb", true);
        a.set_size(100);
        b.set_size(900);
        {
            let mut kids = root.children.write();
            kids.push(a.clone());
            kids.push(b.clone());
        }
        root.set_size(1000);
        (root, a, b)
    }

    #[test]
    fn add_size_is_cumulative_and_signed() {
        let n = Node::root("/x", true);
        n.add_size(500);
        n.add_size(250);
        n.add_size(-100);
        assert_eq!(n.size(), 650);
    }

    #[test]
    fn sort_by_size_descending() {
        let (root, _a, b) = tree();
        root.sort_by_size();
        assert_eq!(root.children.read()[0].name, b.name);
    }

    #[test]
    fn sort_by_name_ascending() {
        let (root, a, _b) = tree();
        root.sort_by_size();
        root.sort_by_name();
        assert_eq!(root.children.read()[0].name, a.name);
    }

    #[test]
    fn sorted_bookkeeping_is_per_generation_and_mode() {
        let (root, ..) = tree();
        assert!(!root.is_sorted(1, SORT_BY_SIZE));
        root.mark_sorted(1, SORT_BY_SIZE);
        assert!(root.is_sorted(1, SORT_BY_SIZE));
        assert!(!root.is_sorted(2, SORT_BY_SIZE));
        assert!(!root.is_sorted(1, SORT_BY_NAME));
    }

    #[test]
    fn full_path_joins_with_single_separators() {
        let root = Node::root("/scan/root", true);
        let sub = Node::child(&root, "sub", true);
        root.children.write().push(sub.clone());
        let leaf = Node::child(&sub, "leaf.bin", false);
        sub.children.write().push(leaf.clone());

        assert_eq!(leaf.full_path(), PathBuf::from("/scan/root/sub/leaf.bin"));
        assert_eq!(root.full_path(), PathBuf::from("/scan/root"));
    }

    #[test]
    fn full_path_with_trailing_separator_on_root() {
        // A root name ending in a separator must still yield exactly one
        // separator between components.
        let root = Node::root("/scan/root/", true);
        let leaf = Node::child(&root, "leaf", false);
        root.children.write().push(leaf.clone());
        assert_eq!(leaf.full_path(), PathBuf::from("/scan/root/leaf"));
    }

    #[test]
    fn first_error_wins() {
        let n = Node::root("/x", true);
        n.record_err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        n.record_err(io::Error::other("close failed"));
        assert_eq!(n.err().unwrap().kind(), io::ErrorKind::PermissionDenied);
    }
}
