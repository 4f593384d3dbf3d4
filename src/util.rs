use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::InvariantError;
use crate::types::NodeArena;

/// Height of a possibly absent subtree; an absent subtree has height 0.
#[inline]
pub(crate) fn height<K>(arena: &NodeArena<K>, subtree: Option<u32>) -> i32 {
    subtree.map(|i| arena.node(i).h).unwrap_or(0)
}

#[inline]
fn update_height<K>(arena: &mut NodeArena<K>, i: u32) {
    let h = 1 + height(arena, arena.node(i).l).max(height(arena, arena.node(i).r));
    arena.node_mut(i).h = h;
}

/// Balance factor, `height(l) - height(r)`.
#[inline]
fn balance<K>(arena: &NodeArena<K>, i: u32) -> i32 {
    height(arena, arena.node(i).l) - height(arena, arena.node(i).r)
}

/// Right rotation around `y`; its left child becomes the new subtree root.
///
/// Heights are recomputed child before parent: `y` drops below the pivot,
/// so its height must be settled before the pivot reads it.
fn right_rotate<K>(arena: &mut NodeArena<K>, y: u32) -> u32 {
    let x = arena.node(y).l.expect("right rotation pivot has a left child");
    let t2 = arena.node(x).r;
    arena.node_mut(x).r = Some(y);
    arena.node_mut(y).l = t2;
    update_height(arena, y);
    update_height(arena, x);
    x
}

/// Mirror image of [`right_rotate`].
fn left_rotate<K>(arena: &mut NodeArena<K>, x: u32) -> u32 {
    let y = arena.node(x).r.expect("left rotation pivot has a right child");
    let t2 = arena.node(y).l;
    arena.node_mut(y).l = Some(x);
    arena.node_mut(x).r = t2;
    update_height(arena, x);
    update_height(arena, y);
    y
}

/// Index of the minimum key in the subtree rooted at `i`.
fn min_index<K>(arena: &NodeArena<K>, mut i: u32) -> u32 {
    while let Some(l) = arena.node(i).l {
        i = l;
    }
    i
}

/// Result of a recursive insert: the subtree root after rebalancing, the
/// slot holding the inserted key, and whether that slot is new.
pub struct Inserted {
    pub root: u32,
    pub node: u32,
    pub fresh: bool,
}

/// Inserts `key` into the subtree and returns its new root.
///
/// An already present key leaves the subtree unchanged (`fresh` is false).
/// Each unwind level reattaches the child returned one level down, refreshes
/// the cached height, and applies at most one rebalancing case.
pub fn insert<K: Ord>(arena: &mut NodeArena<K>, subtree: Option<u32>, key: K) -> Inserted {
    let Some(i) = subtree else {
        let node = arena.alloc(key);
        return Inserted {
            root: node,
            node,
            fresh: true,
        };
    };

    let ins = match key.cmp(&arena.node(i).k) {
        Ordering::Equal => {
            return Inserted {
                root: i,
                node: i,
                fresh: false,
            }
        }
        Ordering::Less => {
            let ins = insert(arena, arena.node(i).l, key);
            arena.node_mut(i).l = Some(ins.root);
            ins
        }
        Ordering::Greater => {
            let ins = insert(arena, arena.node(i).r, key);
            arena.node_mut(i).r = Some(ins.root);
            ins
        }
    };

    update_height(arena, i);
    Inserted {
        root: rebalance_after_insert(arena, i, ins.node),
        ..ins
    }
}

/// Applies the single rotation case an insertion can require at `i`.
///
/// The straight and zig-zag cases are told apart by comparing the inserted
/// key against the taller child's key, not by the child's balance sign.
fn rebalance_after_insert<K: Ord>(arena: &mut NodeArena<K>, i: u32, inserted: u32) -> u32 {
    let bf = balance(arena, i);
    if bf > 1 {
        let l = arena.node(i).l.expect("left-heavy node has a left child");
        if arena.node(inserted).k < arena.node(l).k {
            right_rotate(arena, i)
        } else {
            let l = left_rotate(arena, l);
            arena.node_mut(i).l = Some(l);
            right_rotate(arena, i)
        }
    } else if bf < -1 {
        let r = arena.node(i).r.expect("right-heavy node has a right child");
        if arena.node(inserted).k > arena.node(r).k {
            left_rotate(arena, i)
        } else {
            let r = right_rotate(arena, r);
            arena.node_mut(i).r = Some(r);
            left_rotate(arena, i)
        }
    } else {
        i
    }
}

/// Removes `key` from the subtree and returns its new root, plus whether a
/// key was actually removed. A missing key is a no-op.
pub fn remove<K: Ord>(
    arena: &mut NodeArena<K>,
    subtree: Option<u32>,
    key: &K,
) -> (Option<u32>, bool) {
    let Some(i) = subtree else {
        return (None, false);
    };

    let removed = match key.cmp(&arena.node(i).k) {
        Ordering::Less => {
            let (l, removed) = remove(arena, arena.node(i).l, key);
            arena.node_mut(i).l = l;
            removed
        }
        Ordering::Greater => {
            let (r, removed) = remove(arena, arena.node(i).r, key);
            arena.node_mut(i).r = r;
            removed
        }
        Ordering::Equal => match (arena.node(i).l, arena.node(i).r) {
            (None, child) | (child, None) => {
                // Splice: the surviving child, if any, takes this slot's
                // place and the slot is recycled.
                arena.release(i);
                return (child, true);
            }
            (Some(_), Some(right)) => {
                // Two children: trade keys with the in-order successor and
                // delete the key from the right subtree, where it now sits
                // in a slot with at most one child.
                let successor = min_index(arena, right);
                arena.swap_keys(i, successor);
                let (r, removed) = remove(arena, Some(right), key);
                arena.node_mut(i).r = r;
                removed
            }
        },
    };

    update_height(arena, i);
    (Some(rebalance_after_remove(arena, i)), removed)
}

/// Applies the deletion rebalancing policy at `i`, keyed on the taller
/// child's balance factor (which, unlike after insertion, can be 0).
///
/// A removal can shrink several ancestor levels, so the caller runs this at
/// every level of the unwind rather than stopping at the first fix.
fn rebalance_after_remove<K>(arena: &mut NodeArena<K>, i: u32) -> u32 {
    let bf = balance(arena, i);
    if bf > 1 {
        let l = arena.node(i).l.expect("left-heavy node has a left child");
        if balance(arena, l) >= 0 {
            right_rotate(arena, i)
        } else {
            let l = left_rotate(arena, l);
            arena.node_mut(i).l = Some(l);
            right_rotate(arena, i)
        }
    } else if bf < -1 {
        let r = arena.node(i).r.expect("right-heavy node has a right child");
        if balance(arena, r) <= 0 {
            left_rotate(arena, i)
        } else {
            let r = right_rotate(arena, r);
            arena.node_mut(i).r = Some(r);
            left_rotate(arena, i)
        }
    } else {
        i
    }
}

/// Index of `key`'s slot, if present. Never mutates.
pub fn find<K: Ord>(arena: &NodeArena<K>, root: Option<u32>, key: &K) -> Option<u32> {
    let mut curr = root;
    while let Some(i) = curr {
        curr = match key.cmp(&arena.node(i).k) {
            Ordering::Equal => return Some(i),
            Ordering::Less => arena.node(i).l,
            Ordering::Greater => arena.node(i).r,
        };
    }
    None
}

fn in_order<K>(arena: &NodeArena<K>, i: u32, out: &mut Vec<u32>) {
    if let Some(l) = arena.node(i).l {
        in_order(arena, l, out);
    }
    out.push(i);
    if let Some(r) = arena.node(i).r {
        in_order(arena, r, out);
    }
}

/// Validates the tree rooted at `root`: cached heights, AVL balance,
/// strictly increasing key order, and arena hygiene (every occupied slot
/// reachable from the root).
pub fn assert_avl_tree<K: Ord>(
    arena: &NodeArena<K>,
    root: Option<u32>,
) -> Result<(), InvariantError> {
    fn check<K>(arena: &NodeArena<K>, i: u32, count: &mut usize) -> Result<i32, InvariantError> {
        *count += 1;
        let node = arena.node(i);
        let (l, r) = (node.l, node.r);
        let cached = node.h;

        let lh = match l {
            Some(l) => check(arena, l, count)?,
            None => 0,
        };
        let rh = match r {
            Some(r) => check(arena, r, count)?,
            None => 0,
        };

        let computed = 1 + lh.max(rh);
        if cached != computed {
            return Err(InvariantError::HeightMismatch { cached, computed });
        }
        let bf = lh - rh;
        if !(-1..=1).contains(&bf) {
            return Err(InvariantError::OutOfBalance(bf));
        }
        Ok(computed)
    }

    let Some(root) = root else {
        return if arena.is_empty() {
            Ok(())
        } else {
            Err(InvariantError::LeakedSlots {
                occupied: arena.len(),
                reachable: 0,
            })
        };
    };

    let mut reachable = 0;
    check(arena, root, &mut reachable)?;
    if reachable != arena.len() {
        return Err(InvariantError::LeakedSlots {
            occupied: arena.len(),
            reachable,
        });
    }

    let mut order = Vec::with_capacity(reachable);
    in_order(arena, root, &mut order);
    for pair in order.windows(2) {
        if arena.node(pair[0]).k >= arena.node(pair[1]).k {
            return Err(InvariantError::OrderViolation);
        }
    }

    Ok(())
}

/// Debug printer for the subtree rooted at `node`.
pub fn print<K: Debug>(arena: &NodeArena<K>, node: Option<u32>, tab: &str) -> String {
    match node {
        None => "∅".to_string(),
        Some(i) => {
            let n = arena.node(i);
            let left = print(arena, n.l, &format!("{tab}  "));
            let right = print(arena, n.r, &format!("{tab}  "));
            format!(
                "Node[{i}] [h={}] {{ {:?} }}\n{tab}L={left}\n{tab}R={right}",
                n.h, n.k
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeArena;

    #[test]
    fn right_rotate_rewires_child_links() {
        let mut arena = NodeArena::new();
        let y = arena.alloc(20);
        let x = arena.alloc(10);
        let t2 = arena.alloc(15);
        arena.node_mut(x).r = Some(t2);
        arena.node_mut(x).h = 2;
        arena.node_mut(y).l = Some(x);
        arena.node_mut(y).h = 3;

        let root = right_rotate(&mut arena, y);
        assert_eq!(root, x);
        assert_eq!(arena.node(x).r, Some(y));
        assert_eq!(arena.node(y).l, Some(t2));
        assert_eq!(arena.node(y).h, 2);
        assert_eq!(arena.node(x).h, 3);
    }

    #[test]
    fn left_rotate_rewires_child_links() {
        let mut arena = NodeArena::new();
        let x = arena.alloc(10);
        let y = arena.alloc(20);
        let t2 = arena.alloc(15);
        arena.node_mut(y).l = Some(t2);
        arena.node_mut(y).h = 2;
        arena.node_mut(x).r = Some(y);
        arena.node_mut(x).h = 3;

        let root = left_rotate(&mut arena, x);
        assert_eq!(root, y);
        assert_eq!(arena.node(y).l, Some(x));
        assert_eq!(arena.node(x).r, Some(t2));
        assert_eq!(arena.node(x).h, 2);
        assert_eq!(arena.node(y).h, 3);
    }

    #[test]
    fn insert_reports_fresh_and_existing_keys() {
        let mut arena = NodeArena::new();
        let first = insert(&mut arena, None, 5);
        assert!(first.fresh);

        let again = insert(&mut arena, Some(first.root), 5);
        assert!(!again.fresh);
        assert_eq!(again.root, first.root);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn remove_reports_missing_keys() {
        let mut arena = NodeArena::new();
        let ins = insert(&mut arena, None, 5);

        let (root, removed) = remove(&mut arena, Some(ins.root), &9);
        assert!(!removed);
        assert_eq!(root, Some(ins.root));

        let (root, removed) = remove(&mut arena, root, &5);
        assert!(removed);
        assert_eq!(root, None);
        assert!(arena.is_empty());
    }

    #[test]
    fn assert_avl_tree_catches_a_stale_height() {
        let mut arena = NodeArena::new();
        let mut root = None;
        for k in [2, 1, 3] {
            root = Some(insert(&mut arena, root, k).root);
        }
        assert!(assert_avl_tree(&arena, root).is_ok());

        arena.node_mut(root.expect("tree is non-empty")).h = 7;
        assert_eq!(
            assert_avl_tree(&arena, root),
            Err(InvariantError::HeightMismatch {
                cached: 7,
                computed: 2
            })
        );
    }

    #[test]
    fn assert_avl_tree_catches_a_detached_slot() {
        let mut arena = NodeArena::new();
        let mut root = None;
        for k in [2, 1, 3] {
            root = Some(insert(&mut arena, root, k).root);
        }
        arena.alloc(9);
        assert_eq!(
            assert_avl_tree(&arena, root),
            Err(InvariantError::LeakedSlots {
                occupied: 4,
                reachable: 3
            })
        );
    }
}
