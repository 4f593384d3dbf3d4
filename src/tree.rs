use std::fmt::Debug;

use crate::error::InvariantError;
use crate::types::NodeArena;
use crate::util;

/// Self-balancing binary search tree over a totally ordered key type.
///
/// Keys are unique: inserting a present key and removing an absent one are
/// silent no-ops, reported only through the `bool` return. Nodes live in an
/// index arena owned by the tree, so the whole structure is released in one
/// sweep on [`clear`](AvlTree::clear) or drop.
pub struct AvlTree<K> {
    arena: NodeArena<K>,
    root: Option<u32>,
    len: usize,
}

impl<K: Ord> AvlTree<K> {
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            root: None,
            len: 0,
        }
    }

    /// Ensures `key` is present. Returns `true` if it was newly inserted.
    pub fn insert(&mut self, key: K) -> bool {
        let ins = util::insert(&mut self.arena, self.root, key);
        self.root = Some(ins.root);
        if ins.fresh {
            self.len += 1;
        }
        ins.fresh
    }

    /// Ensures `key` is absent. Returns `true` if a key was removed.
    pub fn remove(&mut self, key: &K) -> bool {
        let (root, removed) = util::remove(&mut self.arena, self.root, key);
        self.root = root;
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Membership search; never mutates.
    pub fn has(&self, key: &K) -> bool {
        util::find(&self.arena, self.root, key).is_some()
    }

    pub fn size(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the whole tree; 0 when empty, 1 for a single key.
    pub fn height(&self) -> i32 {
        util::height(&self.arena, self.root)
    }

    /// Arena index of the root node.
    pub fn root_index(&self) -> Option<u32> {
        self.root
    }

    /// Key stored at an occupied arena index.
    pub fn key(&self, idx: u32) -> &K {
        &self.arena.node(idx).k
    }

    pub fn arena(&self) -> &NodeArena<K> {
        &self.arena
    }

    /// Releases every node and resets to the empty tree. Safe to call on an
    /// already-empty tree.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    /// Validates the BST order, AVL balance, cached heights, and size
    /// bookkeeping. Conformance aid, not a hot path.
    pub fn assert_valid(&self) -> Result<(), InvariantError> {
        util::assert_avl_tree(&self.arena, self.root)?;
        if self.len != self.arena.len() {
            return Err(InvariantError::SizeMismatch {
                tracked: self.len,
                stored: self.arena.len(),
            });
        }
        Ok(())
    }
}

impl<K: Ord> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Debug> AvlTree<K> {
    /// Indented rendering of the tree shape with per-node heights. Debug
    /// aid only; the format is not contractual.
    pub fn print(&self) -> String {
        util::print(&self.arena, self.root, "")
    }
}
