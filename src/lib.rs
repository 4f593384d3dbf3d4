//! Arena-backed self-balancing AVL tree.
//!
//! Stores a set of unique, totally ordered keys and keeps membership
//! lookups logarithmic by rebalancing with rotations on every insert and
//! delete. Instead of owned pointers, all links are `Option<u32>` indices
//! into a tree-owned slot arena; slots freed by deletion go on a free-list
//! and are handed back to later insertions.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! [`types`] | [`AvlNode`] and the [`NodeArena`] slot store |
//! [`util`] | Rotations, recursive insert/remove, search, validation |
//! [`tree`] | [`AvlTree`], the public container |
//! [`error`] | [`InvariantError`] reported by validation |

pub mod error;
pub mod tree;
pub mod types;
pub mod util;

pub use error::InvariantError;
pub use tree::AvlTree;
pub use types::{AvlNode, NodeArena};
pub use util::{assert_avl_tree, find, insert, print, remove};
