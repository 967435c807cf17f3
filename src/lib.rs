// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

//! A sampling-based motion planning library.
//!
//! `oxrrdt` provides the generic planning abstractions (state spaces, goals, validity
//! checkers) shared by several geometric planners, plus a set of geometric planners
//! themselves: [`geometric::PRM`], [`geometric::RRT`], [`geometric::RRTConnect`],
//! [`geometric::RRTStar`], and the disjoint-tree planner [`geometric::RrdtPlanner`].

pub mod base;
pub mod geometric;
pub mod time;
