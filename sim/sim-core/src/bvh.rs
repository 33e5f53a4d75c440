//! Incremental bounding volume hierarchy for the broad phase.
//!
//! Unlike a top-down build, this tree is edited in place as objects come and
//! go. Each object is a leaf keyed by an identifier; internal nodes hold the
//! union of their two children.
//!
//! # Algorithm
//!
//! - **Insert** descends from the root, at each internal node taking the child
//!   whose volume grows least, then splits the reached leaf into an internal
//!   node holding the old leaf and the new one.
//! - **Remove** promotes the leaf's sibling into the parent's slot.
//! - **Update** refits in place while the new volume stays inside the old
//!   one, and re-inserts otherwise.
//! - **Coarse collisions** run a dual-tree descent of the root against
//!   itself, pruning every node pair whose volumes do not overlap.
//!
//! Nodes live in an arena and refer to each other by index. The parent link
//! is a plain index used to walk back up for refits. A sorted side-table maps
//! identifiers to leaves.
//!
//! # Usage
//!
//! ```
//! use sim_core::bounding::BoundingSphere;
//! use sim_core::bvh::Bvh;
//! use nalgebra::Point3;
//!
//! let mut bvh: Bvh<BoundingSphere, u32> = Bvh::new();
//! bvh.insert(1, BoundingSphere::new(Point3::new(0.0, 0.0, 0.0), 1.0));
//! bvh.insert(2, BoundingSphere::new(Point3::new(1.5, 0.0, 0.0), 1.0));
//! bvh.insert(3, BoundingSphere::new(Point3::new(9.0, 0.0, 0.0), 1.0));
//!
//! let mut pairs = Vec::new();
//! bvh.generate_coarse_collisions(&mut pairs);
//! assert_eq!(pairs, vec![(1, 2)]);
//! ```

use std::collections::BTreeMap;
use std::fmt::Debug;

use sim_types::BodyId;
use tracing::trace;

use crate::bounding::BoundingVolume;

/// A node in the hierarchy.
#[derive(Debug, Clone)]
enum BvhNode<V, K> {
    /// Two children; the volume is the union of theirs.
    Internal {
        volume: V,
        parent: Option<usize>,
        children: [usize; 2],
    },
    /// One object.
    Leaf {
        volume: V,
        parent: Option<usize>,
        id: K,
    },
}

impl<V, K: Copy> BvhNode<V, K> {
    fn volume(&self) -> &V {
        match self {
            Self::Internal { volume, .. } | Self::Leaf { volume, .. } => volume,
        }
    }

    fn set_volume(&mut self, new_volume: V) {
        match self {
            Self::Internal { volume, .. } | Self::Leaf { volume, .. } => *volume = new_volume,
        }
    }

    fn parent(&self) -> Option<usize> {
        match self {
            Self::Internal { parent, .. } | Self::Leaf { parent, .. } => *parent,
        }
    }

    fn set_parent(&mut self, new_parent: Option<usize>) {
        match self {
            Self::Internal { parent, .. } | Self::Leaf { parent, .. } => *parent = new_parent,
        }
    }

    fn children(&self) -> Option<[usize; 2]> {
        match self {
            Self::Internal { children, .. } => Some(*children),
            Self::Leaf { .. } => None,
        }
    }
}

/// Incremental bounding volume hierarchy keyed by object identifier.
///
/// `V` is the volume kind and `K` the identifier, [`BodyId`] by default.
/// Identifiers must be unique; inserting an identifier already present is
/// refused.
#[derive(Debug, Clone)]
pub struct Bvh<V, K = BodyId> {
    /// Node arena. Slots on the free list are stale.
    nodes: Vec<BvhNode<V, K>>,
    /// Released arena slots, reused before growing `nodes`.
    free: Vec<usize>,
    root: Option<usize>,
    /// Identifier to leaf slot.
    leaves: BTreeMap<K, usize>,
}

impl<V, K> Default for Bvh<V, K> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            leaves: BTreeMap::new(),
        }
    }
}

impl<V, K> Bvh<V, K>
where
    V: BoundingVolume,
    K: Ord + Copy + Debug,
{
    /// Create an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the hierarchy holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Whether an object with this identifier is stored.
    #[must_use]
    pub fn contains(&self, id: K) -> bool {
        self.leaves.contains_key(&id)
    }

    /// Stored volume of an object.
    #[must_use]
    pub fn volume(&self, id: K) -> Option<&V> {
        self.leaves.get(&id).map(|&leaf| self.nodes[leaf].volume())
    }

    /// Volume enclosing everything, or `None` when empty.
    #[must_use]
    pub fn root_volume(&self) -> Option<&V> {
        self.root.map(|root| self.nodes[root].volume())
    }

    /// Stored identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = K> + '_ {
        self.leaves.keys().copied()
    }

    /// Number of edges between the root and an object's leaf.
    #[must_use]
    pub fn depth(&self, id: K) -> Option<usize> {
        let mut node = *self.leaves.get(&id)?;
        let mut depth = 0;
        while let Some(parent) = self.nodes[node].parent() {
            node = parent;
            depth += 1;
        }
        Some(depth)
    }

    /// Number of levels: zero when empty, one for a lone leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        self.root.map_or(0, |root| self.subtree_height(root))
    }

    fn subtree_height(&self, node: usize) -> usize {
        match self.nodes[node].children() {
            Some([left, right]) => 1 + self.subtree_height(left).max(self.subtree_height(right)),
            None => 1,
        }
    }

    /// Remove every object.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.leaves.clear();
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Insert an object.
    ///
    /// Returns `false`, leaving the tree untouched, if `id` is already
    /// present.
    pub fn insert(&mut self, id: K, volume: V) -> bool {
        if self.leaves.contains_key(&id) {
            return false;
        }

        let leaf = self.alloc(BvhNode::Leaf {
            volume,
            parent: None,
            id,
        });
        self.leaves.insert(id, leaf);

        match self.root {
            None => self.root = Some(leaf),
            Some(root) => self.insert_leaf(root, leaf),
        }

        trace!(?id, size = self.len(), "bvh insert");
        true
    }

    /// Hang `leaf` below the subtree rooted at `node`.
    fn insert_leaf(&mut self, mut node: usize, leaf: usize) {
        let volume = self.nodes[leaf].volume().clone();

        while let Some([left, right]) = self.nodes[node].children() {
            let grow_left = self.nodes[left].volume().growth(&volume);
            let grow_right = self.nodes[right].volume().growth(&volume);
            node = if grow_left < grow_right { left } else { right };
        }

        // `node` is a leaf: replace it by an internal node over both leaves.
        let parent = self.nodes[node].parent();
        let merged = self.nodes[node].volume().union(&volume);
        let internal = self.alloc(BvhNode::Internal {
            volume: merged,
            parent,
            children: [node, leaf],
        });
        self.nodes[node].set_parent(Some(internal));
        self.nodes[leaf].set_parent(Some(internal));

        match parent {
            None => self.root = Some(internal),
            Some(parent) => {
                self.replace_child(parent, node, internal);
                self.refit(parent);
            }
        }
    }

    /// Remove an object.
    ///
    /// Returns `false`, leaving the tree untouched, if `id` is absent.
    pub fn remove(&mut self, id: K) -> bool {
        let Some(leaf) = self.leaves.remove(&id) else {
            return false;
        };

        match self.nodes[leaf].parent() {
            None => {
                // Last object.
                self.clear();
            }
            Some(parent) => {
                let sibling = self.sibling(parent, leaf);
                let grandparent = self.nodes[parent].parent();
                self.nodes[sibling].set_parent(grandparent);

                match grandparent {
                    None => self.root = Some(sibling),
                    Some(grandparent) => {
                        self.replace_child(grandparent, parent, sibling);
                        self.refit(grandparent);
                    }
                }
                self.free.push(parent);
                self.free.push(leaf);
            }
        }

        trace!(?id, size = self.len(), "bvh remove");
        true
    }

    /// Replace an object's volume.
    ///
    /// A volume still enclosed by the stored one is refitted in place;
    /// anything else is removed and re-inserted. Returns `false`, leaving the
    /// tree untouched, if `id` is absent.
    pub fn update(&mut self, id: K, volume: V) -> bool {
        let Some(&leaf) = self.leaves.get(&id) else {
            return false;
        };

        if self.nodes[leaf].volume().contains(&volume) {
            self.nodes[leaf].set_volume(volume);
            if let Some(parent) = self.nodes[leaf].parent() {
                self.refit(parent);
            }
            trace!(?id, "bvh refit");
        } else {
            self.remove(id);
            self.insert(id, volume);
        }
        true
    }

    fn alloc(&mut self, node: BvhNode<V, K>) -> usize {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = node;
            slot
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn sibling(&self, parent: usize, child: usize) -> usize {
        match self.nodes[parent].children() {
            Some([left, right]) if left == child => right,
            Some([left, _]) => left,
            None => {
                debug_assert!(false, "parent {parent} of {child} is a leaf");
                child
            }
        }
    }

    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if let BvhNode::Internal { children, .. } = &mut self.nodes[parent] {
            for slot in children.iter_mut().filter(|slot| **slot == old) {
                *slot = new;
            }
        }
    }

    /// Recompute internal volumes from `node` up to the root.
    fn refit(&mut self, node: usize) {
        let mut current = Some(node);
        while let Some(index) = current {
            if let Some([left, right]) = self.nodes[index].children() {
                let merged = self.nodes[left].volume().union(self.nodes[right].volume());
                self.nodes[index].set_volume(merged);
            }
            current = self.nodes[index].parent();
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Append every pair of stored objects whose volumes overlap to `out`.
    ///
    /// Each pair appears once, as `(low, high)` by identifier order. Returns
    /// the number of pairs appended.
    pub fn generate_coarse_collisions(&self, out: &mut Vec<(K, K)>) -> usize {
        let before = out.len();
        if let Some(root) = self.root {
            self.collide_within(root, out);
        }
        out.len() - before
    }

    /// Pairs with both leaves below `node`.
    fn collide_within(&self, node: usize, out: &mut Vec<(K, K)>) {
        if let Some([left, right]) = self.nodes[node].children() {
            self.collide_within(left, out);
            self.collide_within(right, out);
            self.collide_between(left, right, out);
        }
    }

    /// Pairs with one leaf below `a` and the other below `b`.
    fn collide_between(&self, a: usize, b: usize, out: &mut Vec<(K, K)>) {
        let (node_a, node_b) = (&self.nodes[a], &self.nodes[b]);
        if !node_a.volume().overlaps(node_b.volume()) {
            return;
        }

        match (node_a, node_b) {
            (BvhNode::Leaf { id: id_a, .. }, BvhNode::Leaf { id: id_b, .. }) => {
                out.push(if id_a < id_b {
                    (*id_a, *id_b)
                } else {
                    (*id_b, *id_a)
                });
            }
            (BvhNode::Leaf { .. }, BvhNode::Internal { children, .. }) => {
                self.collide_between(a, children[0], out);
                self.collide_between(a, children[1], out);
            }
            (BvhNode::Internal { children, .. }, BvhNode::Leaf { .. }) => {
                self.collide_between(children[0], b, out);
                self.collide_between(children[1], b, out);
            }
            (
                BvhNode::Internal {
                    volume: volume_a,
                    children: children_a,
                    ..
                },
                BvhNode::Internal {
                    volume: volume_b,
                    children: children_b,
                    ..
                },
            ) => {
                // Split the larger volume.
                if volume_a.size() >= volume_b.size() {
                    self.collide_between(children_a[0], b, out);
                    self.collide_between(children_a[1], b, out);
                } else {
                    self.collide_between(a, children_b[0], out);
                    self.collide_between(a, children_b[1], out);
                }
            }
        }
    }

    /// Identifiers of stored objects whose volumes overlap `volume`.
    #[must_use]
    pub fn query(&self, volume: &V) -> Vec<K> {
        let mut results = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.volume().overlaps(volume) {
                continue;
            }
            match node {
                BvhNode::Internal { children, .. } => stack.extend_from_slice(children),
                BvhNode::Leaf { id, .. } => results.push(*id),
            }
        }

        results.sort_unstable();
        results
    }

    /// Check the structural invariants with a full traversal.
    ///
    /// Verifies parent links, the identifier table, and that every internal
    /// volume equals the union of its children exactly.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let Some(root) = self.root else {
            return self.leaves.is_empty();
        };
        if self.nodes[root].parent().is_some() {
            return false;
        }

        let mut leaf_count = 0;
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            match &self.nodes[index] {
                BvhNode::Internal {
                    volume, children, ..
                } => {
                    let [left, right] = *children;
                    if self.nodes[left].parent() != Some(index)
                        || self.nodes[right].parent() != Some(index)
                    {
                        return false;
                    }
                    let merged = self.nodes[left].volume().union(self.nodes[right].volume());
                    if merged != *volume {
                        return false;
                    }
                    stack.push(left);
                    stack.push(right);
                }
                BvhNode::Leaf { id, .. } => {
                    if self.leaves.get(id) != Some(&index) {
                        return false;
                    }
                    leaf_count += 1;
                }
            }
        }

        leaf_count == self.leaves.len()
    }
}
