// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use crate::base::{
    space::{RealVectorStateSpace, StateSpace},
    state::RealVectorState,
    validity::StateValidityChecker,
};

use super::stats::Stats;

/// Checks whether every state along a straight-line segment is valid, which is what
/// "visibility" means once the collision oracle is reduced to a per-state
/// [`StateValidityChecker`], by discretizing `from -> to` and testing each intermediate state.
///
/// Grounded on `RRT::check_motion`/`RRTStar::check_motion`, generalized to record a visibility
/// query in `stats`.
pub fn check_motion(
    space: &RealVectorStateSpace,
    checker: &dyn StateValidityChecker<RealVectorState>,
    stats: &mut Stats,
    from: &RealVectorState,
    to: &RealVectorState,
) -> bool {
    stats.visible_cnt += 1;

    let dist = space.distance(from, to);
    let num_steps = (dist / (space.get_longest_valid_segment_length() * 0.1)).ceil() as usize;

    if num_steps <= 1 {
        return checker.is_valid(to);
    }

    let mut interpolated = from.clone();
    for i in 1..=num_steps {
        let t = i as f64 / num_steps as f64;
        space.interpolate(from, to, t, &mut interpolated);
        if !checker.is_valid(&interpolated) {
            return false;
        }
    }
    true
}

/// Checks a single configuration for feasibility, recording the query in `stats`.
pub fn is_feasible(
    checker: &dyn StateValidityChecker<RealVectorState>,
    stats: &mut Stats,
    q: &RealVectorState,
) -> bool {
    stats.feasible_cnt += 1;
    checker.is_valid(q)
}

/// Moves at most `epsilon` from `from` towards `to`, or returns `to` unchanged if
/// `ignore_step_size` is set or the two are already (numerically) the same state.
pub fn step_from_to(
    space: &RealVectorStateSpace,
    ignore_step_size: bool,
    from: &RealVectorState,
    to: &RealVectorState,
    epsilon: f64,
) -> RealVectorState {
    if ignore_step_size {
        return to.clone();
    }
    let dist = space.distance(from, to);
    if dist < 1e-9 {
        return to.clone();
    }
    let t = dist.min(epsilon) / dist;
    let mut out = from.clone();
    space.interpolate(from, to, t, &mut out);
    out
}
