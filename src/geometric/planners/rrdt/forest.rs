// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::base::{space::RealVectorStateSpace, space::StateSpace, state::RealVectorState, validity::StateValidityChecker};

use super::{
    error::RrdtError,
    motion::check_motion,
    node::{Node, NodeArena, NodeId},
    particle::ParticleId,
    rewire,
    stats::Stats,
    tree::{Tree, TreeId, TreeKind, ROOT_TREE_ID},
};

/// Merge radius for a 6-DOF (SE(3)-like) configuration space, in radians; general spaces use
/// `epsilon` instead.
const ANGULAR_ABSORB_RADIUS: f64 = 1.0;

/// The result of an `absorb` attempt: which tree `newnode` ended up belonging to, plus any
/// particles that were bound to a tree which got dissolved in the process and must have their
/// `tree_id` updated by the caller — `Forest` doesn't own `Particle`s, so it can't update that
/// field itself.
pub struct AbsorbOutcome {
    pub tree_id: TreeId,
    pub rebound_particles: Vec<ParticleId>,
}

/// Owns every [`Node`] (via a shared [`NodeArena`]) and every [`Tree`] in the run.
pub struct Forest {
    pub arena: NodeArena,
    pub trees: BTreeMap<TreeId, Tree>,
    next_tree_id: usize,
}

impl Forest {
    /// Creates a forest whose root tree contains a single start node. Returns the forest and
    /// the new start node's id.
    pub fn new(start: RealVectorState) -> (Self, NodeId) {
        let mut arena = NodeArena::default();
        let mut start_node = Node::new(start.clone());
        start_node.is_start = true;
        let start_id = arena.insert(start_node);

        let mut root = Tree::new(TreeKind::Root);
        root.add_newnode(start_id, start);

        let mut trees = BTreeMap::new();
        trees.insert(ROOT_TREE_ID, root);

        (
            Forest {
                arena,
                trees,
                next_tree_id: 1,
            },
            start_id,
        )
    }

    pub fn root(&self) -> &Tree {
        self.trees
            .get(&ROOT_TREE_ID)
            .expect("root tree always present")
    }

    pub fn root_mut(&mut self) -> &mut Tree {
        self.trees
            .get_mut(&ROOT_TREE_ID)
            .expect("root tree always present")
    }

    pub fn tree_len(&self, id: TreeId) -> usize {
        self.trees.get(&id).map_or(0, Tree::len)
    }

    /// Spawns a new disjoint tree seeded with a single node at `seed_pos`. Returns the new
    /// tree's id and its seed node's id.
    pub fn new_disjoint_tree(&mut self, seed_pos: RealVectorState) -> (TreeId, NodeId) {
        let node_id = self.arena.insert(Node::new(seed_pos.clone()));
        let id = self.new_disjoint_tree_from_node(node_id, seed_pos);
        (id, node_id)
    }

    /// Wraps an already-allocated orphan node (typically one `absorb` just found no merge for)
    /// into a fresh disjoint tree, without allocating a new node.
    pub fn new_disjoint_tree_from_node(&mut self, node_id: NodeId, pos: RealVectorState) -> TreeId {
        let id = TreeId(self.next_tree_id);
        self.next_tree_id += 1;

        let mut tree = Tree::new(TreeKind::Disjoint);
        tree.add_newnode(node_id, pos);
        self.trees.insert(id, tree);

        id
    }

    fn nn_idx(space: &RealVectorStateSpace, q: &RealVectorState, poses: &[RealVectorState]) -> Option<usize> {
        if poses.is_empty() {
            return None;
        }
        let mut best = 0usize;
        let mut best_dist = space.distance(q, &poses[0]);
        for (i, pos) in poses.iter().enumerate().skip(1) {
            let dist = space.distance(q, pos);
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        Some(best)
    }

    /// Finds the nearest node to `q` within `tree_id`, via a linear scan over its dense pose
    /// array. Ties break towards the lowest insertion index.
    pub fn nearest_in_tree(
        &self,
        space: &RealVectorStateSpace,
        tree_id: TreeId,
        q: &RealVectorState,
    ) -> Option<(NodeId, f64)> {
        let tree = self.trees.get(&tree_id)?;
        let idx = Self::nn_idx(space, q, &tree.poses)?;
        Some((tree.node_ids[idx], space.distance(q, &tree.poses[idx])))
    }

    /// Attempts to merge `newnode`'s tree into another tree in the forest.
    ///
    /// * `parent_tree = None` means `newnode` is an orphan not yet part of any tree: on
    ///   success it is simply added to whichever tree it connects to. `None` is returned if no
    ///   tree would take it, and the caller must spawn a fresh disjoint tree for it instead.
    /// * `parent_tree = Some(t)` means `newnode` already belongs to tree `t`: on success `t` is
    ///   merged into the tree it connects to via [`Forest::join_trees`]. If no merge is found
    ///   `Some` is still returned, reporting that `newnode` stayed in `t` unchanged.
    ///
    /// Root is always examined last, for stability.
    pub fn absorb(
        &mut self,
        space: &RealVectorStateSpace,
        checker: &dyn StateValidityChecker<RealVectorState>,
        stats: &mut Stats,
        epsilon: f64,
        radius_cap: f64,
        newnode_id: NodeId,
        parent_tree: Option<TreeId>,
    ) -> Option<AbsorbOutcome> {
        let newnode_pos = self.arena.get(newnode_id).pos.clone();

        let mut candidates: Vec<TreeId> = self
            .trees
            .keys()
            .copied()
            .filter(|&t| Some(t) != parent_tree && t != ROOT_TREE_ID)
            .collect();
        if Some(ROOT_TREE_ID) != parent_tree {
            candidates.push(ROOT_TREE_ID);
        }

        let absorb_radius = if space.dimension == 6 {
            ANGULAR_ABSORB_RADIUS
        } else {
            epsilon
        };

        for other_id in candidates {
            let Some((near_id, dist)) = self.nearest_in_tree(space, other_id, &newnode_pos) else {
                continue;
            };
            if dist > absorb_radius {
                continue;
            }
            let near_pos = self.arena.get(near_id).pos.clone();
            if !check_motion(space, checker, stats, &newnode_pos, &near_pos) {
                continue;
            }

            return Some(match parent_tree {
                None => {
                    self.arena.get_mut(newnode_id).edges.push(near_id);
                    self.arena.get_mut(near_id).edges.push(newnode_id);
                    self.trees
                        .get_mut(&other_id)
                        .unwrap()
                        .add_newnode(newnode_id, newnode_pos.clone());
                    AbsorbOutcome {
                        tree_id: other_id,
                        rebound_particles: Vec::new(),
                    }
                }
                Some(own_tree) => {
                    let Some((surviving, rebound)) = self.join_trees(
                        space, checker, stats, epsilon, radius_cap, own_tree, other_id, newnode_id, near_id,
                    ) else {
                        continue;
                    };
                    AbsorbOutcome {
                        tree_id: surviving,
                        rebound_particles: rebound,
                    }
                }
            });
        }

        // No merge found. For an already-treed node (`parent_tree = Some`) this means it just
        // stays where it is; the caller can tell by comparing `tree_id` to what it already knew.
        // For an orphan (`parent_tree = None`) it means no tree would take it and the caller must
        // spawn a fresh disjoint tree via `new_disjoint_tree`.
        parent_tree.map(|t| AbsorbOutcome {
            tree_id: t,
            rebound_particles: Vec::new(),
        })
    }

    /// Merges `t2` into `t1`, connecting endpoint `e1` (in `t1`) to `e2` (in `t2`). Returns the
    /// id of the surviving tree and any particles that were bound to the dissolved tree and
    /// must be rebound by the caller. Returns `None`, logging and counting the inconsistency, if
    /// `t2` turns out not to exist (an endpoint outlived the tree it claimed to belong to) — the
    /// caller skips the merge in that case.
    #[allow(clippy::too_many_arguments)]
    fn join_trees(
        &mut self,
        space: &RealVectorStateSpace,
        checker: &dyn StateValidityChecker<RealVectorState>,
        stats: &mut Stats,
        epsilon: f64,
        radius_cap: f64,
        t1: TreeId,
        t2: TreeId,
        e1: NodeId,
        e2: NodeId,
    ) -> Option<(TreeId, Vec<ParticleId>)> {
        let (mut t1, mut t2, mut e1, mut e2) = (t1, t2, e1, e2);
        if t1 != ROOT_TREE_ID && t2 == ROOT_TREE_ID {
            std::mem::swap(&mut t1, &mut t2);
            std::mem::swap(&mut e1, &mut e2);
        }

        if t1 == ROOT_TREE_ID {
            let Some(dissolved) = self.trees.remove(&t2) else {
                eprintln!("[warn] {}", RrdtError::JoinInconsistency);
                stats.join_inconsistency_count += 1;
                return None;
            };
            self.join_tree_to_root(space, checker, stats, epsilon, radius_cap, e2, e1);
            Some((ROOT_TREE_ID, dissolved.particle_ids))
        } else {
            let Some(mut donor) = self.trees.remove(&t2) else {
                eprintln!("[warn] {}", RrdtError::JoinInconsistency);
                stats.join_inconsistency_count += 1;
                return None;
            };
            self.arena.get_mut(e1).edges.push(e2);
            self.arena.get_mut(e2).edges.push(e1);
            let rebound = donor.particle_ids.clone();
            self.trees.get_mut(&t1).unwrap().extend_tree(&mut donor);
            Some((t1, rebound))
        }
    }

    /// Walks the (now-detached) disjoint tree reachable from `entry` breadth-first, re-inserting
    /// every visited node into the root tree via RRT* and freeing its `edges` once inserted.
    /// `root_endpoint` is assumed already visible from `entry` — the caller verified this while
    /// finding the merge.
    fn join_tree_to_root(
        &mut self,
        space: &RealVectorStateSpace,
        checker: &dyn StateValidityChecker<RealVectorState>,
        stats: &mut Stats,
        epsilon: f64,
        radius_cap: f64,
        entry: NodeId,
        root_endpoint: NodeId,
    ) {
        let mut queue = VecDeque::new();
        let mut visited = BTreeSet::new();
        queue.push_back((entry, root_endpoint));
        visited.insert(entry);

        while let Some((node_id, nn_id)) = queue.pop_front() {
            let edges = self.arena.get(node_id).edges.clone();
            rewire::rrt_star_add_node(
                self, space, checker, stats, epsilon, radius_cap, node_id, nn_id,
            );
            self.arena.get_mut(node_id).edges.clear();

            for neighbour in edges {
                if visited.insert(neighbour) {
                    queue.push_back((neighbour, node_id));
                }
            }
        }
    }
}
