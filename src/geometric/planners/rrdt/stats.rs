// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

/// Telemetry counters threaded through every component of the planner.
///
/// `restart_count`/`randomwalk_count` are carried alongside the feasibility/visibility
/// counters, mirroring the `sbp-env` original's `Stats` object.
#[derive(Debug, Clone)]
pub struct Stats {
    /// Number of feasibility queries issued to the collision oracle.
    pub feasible_cnt: u64,
    /// Number of visibility queries issued to the collision oracle.
    pub visible_cnt: u64,
    /// Number of proposed samples rejected for infeasibility.
    pub invalid_feasibility: u64,
    /// Number of proposed samples rejected for failing a visibility check.
    pub invalid_visibility: u64,
    /// Number of nodes successfully added to some tree.
    pub valid_sample: u64,
    /// Number of times a local sampler (particle) was restarted.
    pub restart_count: u64,
    /// Number of random-walk direction draws attempted.
    pub randomwalk_count: u64,
    /// Number of times the MAB scheduler's energy vector desynced (summed to a non-positive or
    /// non-finite value) and had to be reset.
    pub sampler_desync_count: u64,
    /// Number of times an `absorb` merge was skipped because an endpoint no longer belonged to
    /// its claimed tree.
    pub join_inconsistency_count: u64,
    /// Current best start-to-goal cost; `f64::INFINITY` until a path is found.
    pub c_max: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            feasible_cnt: 0,
            visible_cnt: 0,
            invalid_feasibility: 0,
            invalid_visibility: 0,
            valid_sample: 0,
            restart_count: 0,
            randomwalk_count: 0,
            sampler_desync_count: 0,
            join_inconsistency_count: 0,
            c_max: f64::INFINITY,
        }
    }
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a proposed sample passed both feasibility and visibility and was turned
    /// into a node.
    pub fn add_free(&mut self) {
        self.valid_sample += 1;
    }

    /// Records that a proposed sample was rejected. `feasibility = true` means it failed the
    /// feasibility check; `false` means it failed the visibility check.
    pub fn add_invalid(&mut self, feasibility: bool) {
        if feasibility {
            self.invalid_feasibility += 1;
        } else {
            self.invalid_visibility += 1;
        }
    }
}
