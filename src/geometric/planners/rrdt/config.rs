// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

/// Selects how a particle's local sampler proposes its next direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalDistribution {
    /// Sample the PMF, but never update it on failure.
    Original,
    /// Sample the PMF and apply the Gaussian-on-sphere failure update.
    DynamicVonMises,
    /// Like `DynamicVonMises`, but exploit directional momentum after a success by reusing
    /// the previous direction unchanged.
    RayCasting,
}

/// Tunables for [`super::RrdtPlanner`]'s in-memory configuration surface.
#[derive(Debug, Clone)]
pub struct RrdtConfig {
    /// Maximum step length, ε, used by `step_from_to`.
    pub epsilon: f64,
    /// Cap on the RRT* rewire radius.
    pub radius: f64,
    /// Distance within which a new node is considered to have reached the goal.
    pub goal_radius: f64,
    /// Unused by RRdT's own sampling (direction proposal is not goal-biased), kept only so a
    /// caller sharing `RrdtConfig` with the baseline planners has one field to set.
    pub goal_bias: f64,
    /// Node budget N_max; `run_once` is looped until `Stats::valid_sample` reaches this.
    pub max_number_nodes: usize,
    /// If `true`, `step_from_to` always returns the target unchanged (no step clamping).
    pub ignore_step_size: bool,
    /// Which proposal mode each particle's PMF uses.
    pub proposal_distribution: ProposalDistribution,
    /// Ray-casting momentum shortcut: after a success, reuse the same particle and direction
    /// until the next failure.
    pub keep_go_forth: bool,
    /// Number of particles, K (default: 4).
    pub num_particles: usize,
    /// Fixed RNG seed. `None` (the default) draws from `rand::rng()`'s entropy each run; `Some`
    /// makes the whole run, including particle placement, reproducible.
    pub seed: Option<u64>,
}

impl RrdtConfig {
    /// Creates a config with RRdT's stated defaults (`K=4`, dynamic-von-Mises proposal mode)
    /// for the handful of parameters every run must set.
    pub fn new(epsilon: f64, radius: f64, goal_radius: f64, max_number_nodes: usize) -> Self {
        RrdtConfig {
            epsilon,
            radius,
            goal_radius,
            goal_bias: 0.0,
            max_number_nodes,
            ignore_step_size: false,
            proposal_distribution: ProposalDistribution::DynamicVonMises,
            keep_go_forth: false,
            num_particles: 4,
            seed: None,
        }
    }

    /// Builder-style setter for a fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
