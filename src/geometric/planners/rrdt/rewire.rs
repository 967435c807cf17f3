// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use crate::base::{space::RealVectorStateSpace, space::StateSpace, state::RealVectorState, validity::StateValidityChecker};

use super::{forest::Forest, motion::check_motion, node::NodeId, stats::Stats};

/// Radius-ball insertion of `newnode` into the root tree, with `nn_id` as a known-visible
/// fallback parent, following `RRTStar::solve`'s choose-parent/rewire steps.
///
/// The caller is responsible for having already verified `visible(nn.pos, newnode.pos)` before
/// calling into the root tree.
pub fn rrt_star_add_node(
    forest: &mut Forest,
    space: &RealVectorStateSpace,
    checker: &dyn StateValidityChecker<RealVectorState>,
    stats: &mut Stats,
    epsilon: f64,
    radius_cap: f64,
    newnode_id: NodeId,
    nn_id: NodeId,
) {
    let newnode_pos = forest.arena.get(newnode_id).pos.clone();
    let dim = newnode_pos.values.len() as f64;
    let node_count = (forest.root().len() + 1).max(2) as f64;
    let r_rw = (epsilon * node_count.ln().powf(1.0 / dim)).min(radius_cap);

    let candidates: Vec<NodeId> = forest
        .root()
        .node_ids
        .iter()
        .copied()
        .filter(|&id| space.distance(&newnode_pos, &forest.arena.get(id).pos) <= r_rw)
        .collect();

    // choose_least_cost_parent: nn_id is a guaranteed-visible fallback.
    let mut best_parent = nn_id;
    let mut best_cost =
        forest.arena.get(nn_id).cost + space.distance(&forest.arena.get(nn_id).pos, &newnode_pos);

    for &candidate in &candidates {
        if candidate == nn_id {
            continue;
        }
        let candidate_pos = forest.arena.get(candidate).pos.clone();
        let candidate_cost = forest.arena.get(candidate).cost + space.distance(&candidate_pos, &newnode_pos);
        if candidate_cost < best_cost
            && check_motion(space, checker, stats, &candidate_pos, &newnode_pos)
        {
            best_cost = candidate_cost;
            best_parent = candidate;
        }
    }

    {
        let node = forest.arena.get_mut(newnode_id);
        node.parent = Some(best_parent);
        node.cost = best_cost;
    }
    forest.arena.get_mut(best_parent).children.push(newnode_id);
    forest.root_mut().add_newnode(newnode_id, newnode_pos.clone());

    // rewire: does inserting through newnode give any candidate a cheaper path?
    for &candidate in &candidates {
        if candidate == best_parent {
            continue;
        }
        let candidate_pos = forest.arena.get(candidate).pos.clone();
        let via_newnode_cost = best_cost + space.distance(&newnode_pos, &candidate_pos);
        if via_newnode_cost < forest.arena.get(candidate).cost
            && check_motion(space, checker, stats, &newnode_pos, &candidate_pos)
        {
            if let Some(old_parent) = forest.arena.get(candidate).parent {
                forest
                    .arena
                    .get_mut(old_parent)
                    .children
                    .retain(|&c| c != candidate);
            }
            let delta = via_newnode_cost - forest.arena.get(candidate).cost;
            forest.arena.get_mut(candidate).parent = Some(newnode_id);
            forest.arena.get_mut(candidate).cost = via_newnode_cost;
            forest.arena.get_mut(newnode_id).children.push(candidate);
            propagate_cost_delta(forest, candidate, delta);
        }
    }
}

fn propagate_cost_delta(forest: &mut Forest, node_id: NodeId, delta: f64) {
    let children = forest.arena.get(node_id).children.clone();
    for child in children {
        forest.arena.get_mut(child).cost += delta;
        propagate_cost_delta(forest, child, delta);
    }
}

/// Checks whether `newnode` reaches the goal node better than the current best, updating
/// `c_max` and re-parenting the goal node if so. Returns whether the goal connection improved.
pub fn check_goal(
    forest: &mut Forest,
    space: &RealVectorStateSpace,
    checker: &dyn StateValidityChecker<RealVectorState>,
    stats: &mut Stats,
    goal_node_id: NodeId,
    goal_radius: f64,
    newnode_id: NodeId,
) -> bool {
    let goal_pos = forest.arena.get(goal_node_id).pos.clone();
    let newnode_pos = forest.arena.get(newnode_id).pos.clone();
    let dist = space.distance(&newnode_pos, &goal_pos);

    if dist >= goal_radius || !check_motion(space, checker, stats, &newnode_pos, &goal_pos) {
        return false;
    }

    let candidate_cost = forest.arena.get(newnode_id).cost + dist;
    if candidate_cost >= stats.c_max {
        return false;
    }

    if let Some(old_parent) = forest.arena.get(goal_node_id).parent {
        forest
            .arena
            .get_mut(old_parent)
            .children
            .retain(|&c| c != goal_node_id);
    }
    stats.c_max = candidate_cost;
    forest.arena.get_mut(goal_node_id).parent = Some(newnode_id);
    forest.arena.get_mut(goal_node_id).cost = candidate_cost;
    forest.arena.get_mut(newnode_id).children.push(goal_node_id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::node::Node;

    struct AlwaysValid;
    impl StateValidityChecker<RealVectorState> for AlwaysValid {
        fn is_valid(&self, _state: &RealVectorState) -> bool {
            true
        }
    }

    fn space() -> RealVectorStateSpace {
        RealVectorStateSpace::new(2, Some(vec![(0.0, 100.0), (0.0, 100.0)])).unwrap()
    }

    #[test]
    fn added_node_cost_matches_parent_cost_plus_distance() {
        let space = space();
        let checker = AlwaysValid;
        let mut stats = Stats::new();
        let (mut forest, start_id) = Forest::new(RealVectorState::new(vec![0.0, 0.0]));

        let newnode_id = forest.arena.insert(Node::new(RealVectorState::new(vec![1.0, 0.0])));
        rrt_star_add_node(&mut forest, &space, &checker, &mut stats, 5.0, 50.0, newnode_id, start_id);

        let node = forest.arena.get(newnode_id);
        let parent_id = node.parent.expect("newly inserted node must have a parent");
        let parent = forest.arena.get(parent_id);
        let expected = parent.cost + space.distance(&parent.pos, &node.pos);
        assert!((node.cost - expected).abs() < 1e-9);
    }

    #[test]
    fn check_goal_lowers_c_max_and_reparents_goal_only_on_improvement() {
        let space = space();
        let checker = AlwaysValid;
        let mut stats = Stats::new();
        let (mut forest, start_id) = Forest::new(RealVectorState::new(vec![0.0, 0.0]));

        let goal_id = forest.arena.insert(Node::new(RealVectorState::new(vec![10.0, 0.0])));

        let far_id = forest.arena.insert(Node::new(RealVectorState::new(vec![5.0, 5.0])));
        rrt_star_add_node(&mut forest, &space, &checker, &mut stats, 5.0, 50.0, far_id, start_id);
        let improved = check_goal(&mut forest, &space, &checker, &mut stats, goal_id, 1.0, far_id);
        assert!(!improved, "far_id is outside goal_radius and should not connect");
        assert_eq!(stats.c_max, f64::INFINITY);

        let near_id = forest.arena.insert(Node::new(RealVectorState::new(vec![9.5, 0.0])));
        rrt_star_add_node(&mut forest, &space, &checker, &mut stats, 5.0, 50.0, near_id, start_id);
        let improved = check_goal(&mut forest, &space, &checker, &mut stats, goal_id, 1.0, near_id);
        assert!(improved);
        assert!(stats.c_max.is_finite());
        assert_eq!(forest.arena.get(goal_id).parent, Some(near_id));

        let c_max_before = stats.c_max;
        let worse_id = forest.arena.insert(Node::new(RealVectorState::new(vec![-50.0, -50.0])));
        forest.arena.get_mut(worse_id).parent = Some(start_id);
        forest.arena.get_mut(worse_id).cost = 1000.0;
        let improved = check_goal(&mut forest, &space, &checker, &mut stats, goal_id, 1.0, worse_id);
        assert!(!improved);
        assert_eq!(stats.c_max, c_max_before, "c_max must never increase");
    }
}
