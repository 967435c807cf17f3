// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use std::{error, fmt};

/// Errors specific to the RRdT planner's internal machinery.
///
/// `RrdtPlanner::solve` itself only ever returns a
/// [`crate::base::error::PlanningError`], to stay a drop-in [`crate::base::planner::Planner`]
/// implementation. `RrdtError` exists for the recoverable conditions the planner handles
/// internally (and logs), so that unit tests and library consumers inspecting [`super::Stats`]
/// can name what happened.
#[derive(Debug, PartialEq)]
pub enum RrdtError {
    /// The configured start state is not feasible.
    StartInfeasible,
    /// The configured goal state is not feasible.
    GoalInfeasible,
    /// The MAB scheduler's energy vector summed to a non-positive or non-finite value.
    /// Recovered by resetting all energies to 1 and resampling.
    SamplerDesync,
    /// An `absorb` attempt referenced an endpoint that turned out not to belong to its
    /// claimed tree. Recovered by skipping the merge.
    JoinInconsistency,
}

impl fmt::Display for RrdtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartInfeasible => write!(f, "Start configuration is not feasible."),
            Self::GoalInfeasible => write!(f, "Goal configuration is not feasible."),
            Self::SamplerDesync => write!(
                f,
                "MAB energy vector desynced (summed to a non-positive or non-finite value)."
            ),
            Self::JoinInconsistency => write!(
                f,
                "Absorb attempted to join an endpoint that is not in its claimed tree."
            ),
        }
    }
}

impl error::Error for RrdtError {}
