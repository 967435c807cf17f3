// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

mod planners;

pub use self::planners::prm::PRM;
pub use self::planners::rrdt::{config::RrdtConfig, error::RrdtError, RrdtPlanner, Stats as RrdtStats};
pub use self::planners::rrt::RRT;
pub use self::planners::rrt_connect::RRTConnect;
pub use self::planners::rrt_star::RRTStar;
