// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use crate::base::state::RealVectorState;

use super::{node::NodeId, particle::ParticleId};

/// A stable handle for a tree owned by [`super::forest::Forest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeId(pub usize);

/// The forest's single root tree is always at this id.
pub const ROOT_TREE_ID: TreeId = TreeId(0);

/// Whether a [`Tree`] carries the rooted parent/cost structure (`Root`) or is an undirected,
/// not-yet-connected tree (`Disjoint`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Root,
    Disjoint,
}

/// A tree of configurations.
///
/// `poses` is a dense array mirroring `node_ids` in insertion order, kept purely to vectorize
/// the nearest-neighbour scan in `Forest::nearest_in_tree`; the nodes' canonical state still
/// lives in the shared [`super::node::NodeArena`].
#[derive(Debug, Clone)]
pub struct Tree {
    pub kind: TreeKind,
    pub node_ids: Vec<NodeId>,
    pub poses: Vec<RealVectorState>,
    pub particle_ids: Vec<ParticleId>,
}

impl Tree {
    pub fn new(kind: TreeKind) -> Self {
        Tree {
            kind,
            node_ids: Vec::new(),
            poses: Vec::new(),
            particle_ids: Vec::new(),
        }
    }

    /// Appends `node_id` to the tree, writing its position into the parallel pose array.
    pub fn add_newnode(&mut self, node_id: NodeId, pos: RealVectorState) {
        self.node_ids.push(node_id);
        self.poses.push(pos);
    }

    /// Appends `other`'s nodes and poses onto this tree, draining `other`.
    pub fn extend_tree(&mut self, other: &mut Tree) {
        self.node_ids.append(&mut other.node_ids);
        self.poses.append(&mut other.poses);
        self.particle_ids.append(&mut other.particle_ids);
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }
}
