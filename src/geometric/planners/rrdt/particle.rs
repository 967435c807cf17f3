// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use rand::Rng;

use crate::base::state::RealVectorState;

use super::{node::NodeId, pmf::PmfState, tree::TreeId};

/// A stable handle for a particle owned by [`super::planner::RrdtPlanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(pub usize);

/// A local sampler bound to one tree at a time.
///
/// `K` particles live for the whole run; `restart` (driven by
/// [`super::planner::RrdtPlanner`], since it needs the forest and collision checker) rebinds a
/// particle to a new position/tree without reallocating it.
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: RealVectorState,
    pub dir: Vec<f64>,
    pub tree_id: TreeId,
    pub proposal: PmfState,
    pub last_node: Option<NodeId>,
    provisional_dir: Option<Vec<f64>>,
    pub is_root_particle: bool,
}

impl Particle {
    pub fn new(pos: RealVectorState, tree_id: TreeId, proposal: PmfState, is_root_particle: bool) -> Self {
        let dim = pos.values.len();
        Particle {
            pos,
            dir: vec![0.0; dim],
            tree_id,
            proposal,
            last_node: None,
            provisional_dir: None,
            is_root_particle,
        }
    }

    /// Records the direction a candidate sample was proposed along, ahead of possibly
    /// confirming it.
    pub fn try_new_pos(&mut self, dir: Vec<f64>) {
        self.provisional_dir = Some(dir);
    }

    /// Commits to `pos`, adopting the direction recorded by the most recent `try_new_pos`.
    pub fn confirm(&mut self, pos: RealVectorState) {
        self.pos = pos;
        if let Some(dir) = self.provisional_dir.take() {
            self.dir = dir;
        }
    }

    /// Draws a proposal direction from this particle's PMF.
    pub fn propose_direction(&mut self, rng: &mut impl Rng) -> Vec<f64> {
        let has_direction = self.dir.iter().any(|v| *v != 0.0);
        let origin = if has_direction { Some(self.dir.as_slice()) } else { None };
        self.proposal.draw(origin, rng)
    }

    /// Reports a successful step: centers the PMF on the direction that was just proposed.
    /// Called before `confirm`, so it reads the still-pending `provisional_dir` rather than
    /// the (stale, pre-step) `dir`.
    pub fn success(&mut self) {
        let dir = self
            .provisional_dir
            .clone()
            .unwrap_or_else(|| self.dir.clone());
        self.proposal.success(dir);
    }

    /// Reports a failed step along `dir`.
    pub fn fail(&mut self, dir: &[f64]) {
        self.proposal.fail(dir);
    }
}
