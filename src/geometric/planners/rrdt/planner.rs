// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use std::collections::VecDeque;
use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::base::{
    error::PlanningError,
    goal::{Goal, GoalSampleableRegion},
    planner::{Path, Planner},
    problem_definition::ProblemDefinition,
    space::{RealVectorStateSpace, StateSpace},
    state::RealVectorState,
    validity::StateValidityChecker,
};
use crate::time::{Duration, Instant};

use super::{
    config::RrdtConfig,
    error::RrdtError,
    forest::Forest,
    mab::Mab,
    motion::{check_motion, is_feasible, step_from_to},
    node::{Node, NodeId},
    particle::{Particle, ParticleId},
    pmf::PmfState,
    rewire,
    stats::Stats,
    tree::{TreeId, ROOT_TREE_ID},
};

/// Either a caller-seeded or entropy-seeded generator. A single concrete type so `solve` can
/// hold one generator across `initialize`/`run_once` regardless of which source it came from.
enum PlannerRng {
    Seeded(StdRng),
    Entropy(rand::rngs::ThreadRng),
}

impl rand::RngCore for PlannerRng {
    fn next_u32(&mut self) -> u32 {
        match self {
            PlannerRng::Seeded(r) => r.next_u32(),
            PlannerRng::Entropy(r) => r.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self {
            PlannerRng::Seeded(r) => r.next_u64(),
            PlannerRng::Entropy(r) => r.next_u64(),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            PlannerRng::Seeded(r) => r.fill_bytes(dest),
            PlannerRng::Entropy(r) => r.fill_bytes(dest),
        }
    }
}

/// Every this-many `run_once` iterations, enqueue all low-energy particles for restart.
const RANDOM_RESTART_EVERY: u64 = 20;

/// Bound on rejection-sampling attempts when seeding a particle at a random free position, so a
/// pathological (near-zero free-volume) space can't hang setup.
const FREE_SAMPLE_ATTEMPTS: u32 = 10_000;

/// The Rapidly-exploring Random disjoint-Tree planner.
///
/// Specialised to [`RealVectorState`]/[`RealVectorStateSpace`] — unlike the other planners in
/// this crate, RRdT's sampling machinery (the directional proposal distribution, the
/// `3*epsilon` step) is only meaningful for a real vector configuration space.
pub struct RrdtPlanner<G: Goal<RealVectorState>> {
    pub config: RrdtConfig,

    problem_def: Option<Arc<ProblemDefinition<RealVectorState, RealVectorStateSpace, G>>>,
    validity_checker: Option<Arc<dyn StateValidityChecker<RealVectorState>>>,

    forest: Option<Forest>,
    particles: Vec<Particle>,
    mab: Option<Mab>,
    stats: Stats,
    goal_node_id: Option<NodeId>,

    restart_pool: VecDeque<ParticleId>,
    iterations_since_restart_check: u64,
    initialized: bool,
}

impl<G> RrdtPlanner<G>
where
    G: Goal<RealVectorState> + GoalSampleableRegion<RealVectorState>,
{
    pub fn new(config: RrdtConfig) -> Self {
        RrdtPlanner {
            config,
            problem_def: None,
            validity_checker: None,
            forest: None,
            particles: Vec::new(),
            mab: None,
            stats: Stats::new(),
            goal_node_id: None,
            restart_pool: VecDeque::new(),
            iterations_since_restart_check: 0,
            initialized: false,
        }
    }

    /// Current telemetry. Most useful once a run has made progress or finished.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    fn sample_free_state(
        &mut self,
        space: &RealVectorStateSpace,
        checker: &dyn StateValidityChecker<RealVectorState>,
        rng: &mut impl Rng,
    ) -> Result<RealVectorState, PlanningError> {
        for _ in 0..FREE_SAMPLE_ATTEMPTS {
            let candidate = space
                .sample_uniform(rng)
                .map_err(|_| PlanningError::UnsampledStateSpace)?;
            if is_feasible(checker, &mut self.stats, &candidate) {
                return Ok(candidate);
            }
            self.stats.add_invalid(true);
        }
        Err(PlanningError::NoSolutionFound)
    }

    /// Lazily seeds the forest and the particle swarm on the first call to `solve`: particle 0
    /// is the root particle at `start`; particle 1 sits in a disjoint tree seeded at a goal
    /// sample; particles 2..K start at random free positions, merging into an existing tree
    /// where possible.
    fn initialize(&mut self, rng: &mut impl Rng) -> Result<(), PlanningError> {
        let pd = self.problem_def.as_ref().unwrap().clone();
        let checker = self.validity_checker.as_ref().unwrap().clone();
        let space = &pd.space;

        let start = pd.start_states[0].clone();
        if !is_feasible(checker.as_ref(), &mut self.stats, &start) {
            eprintln!("[warn] RRdT: {}", RrdtError::StartInfeasible);
            return Err(PlanningError::InvalidStartState);
        }

        let goal_pos = pd
            .goal
            .sample_goal(rng)
            .map_err(|_| PlanningError::NoSolutionFound)?;
        if !is_feasible(checker.as_ref(), &mut self.stats, &goal_pos) {
            eprintln!("[warn] RRdT: {}", RrdtError::GoalInfeasible);
            return Err(PlanningError::NoSolutionFound);
        }

        let (mut forest, start_id) = Forest::new(start.clone());
        let (goal_tree_id, goal_node_id) = forest.new_disjoint_tree(goal_pos.clone());
        forest.arena.get_mut(goal_node_id).is_goal = true;
        self.goal_node_id = Some(goal_node_id);

        let dim = start.values.len();
        let mode = self.config.proposal_distribution;

        let mut particles = Vec::with_capacity(self.config.num_particles.max(2));

        let mut root_particle = Particle::new(start, ROOT_TREE_ID, PmfState::new(dim, mode, rng), true);
        root_particle.last_node = Some(start_id);
        particles.push(root_particle);

        let mut goal_particle = Particle::new(goal_pos, goal_tree_id, PmfState::new(dim, mode, rng), false);
        goal_particle.last_node = Some(goal_node_id);
        particles.push(goal_particle);

        for _ in 2..self.config.num_particles {
            let pos = self.sample_free_state(space, checker.as_ref(), rng)?;
            let node_id = forest.arena.insert(Node::new(pos.clone()));
            let tree_id = match forest.absorb(
                space,
                checker.as_ref(),
                &mut self.stats,
                self.config.epsilon,
                self.config.radius,
                node_id,
                None,
            ) {
                Some(outcome) => outcome.tree_id,
                None => forest.new_disjoint_tree_from_node(node_id, pos.clone()),
            };

            let mut particle = Particle::new(pos, tree_id, PmfState::new(dim, mode, rng), false);
            particle.last_node = Some(node_id);
            particles.push(particle);
        }

        self.forest = Some(forest);
        self.mab = Some(Mab::new(particles.len()));
        self.particles = particles;
        Ok(())
    }

    /// Rebinds particle `j` to a fresh position. Returns `false` if the new position merged
    /// straight into an existing tree (the particle has been deferred to the restart pool and
    /// the caller should loop), `true` otherwise.
    fn restart_particle(&mut self, j: usize, rng: &mut impl Rng) -> Result<bool, PlanningError> {
        let pd = self.problem_def.as_ref().unwrap().clone();
        let checker = self.validity_checker.as_ref().unwrap().clone();
        let space = &pd.space;
        let forest = self.forest.as_mut().unwrap();

        // Dropping the tree outright (rather than merging it) can leave another particle's
        // `tree_id` dangling if two particles ever ended up sharing the same small disjoint
        // tree; `nearest_in_tree` degrades to `None` for a missing tree id, which this loop
        // already treats as "nothing to extend from" rather than a crash.
        let old_tree = self.particles[j].tree_id;
        if old_tree != ROOT_TREE_ID && forest.tree_len(old_tree) < 5 {
            forest.trees.remove(&old_tree);
        }

        let pos = self.sample_free_state(space, checker.as_ref(), rng)?;
        let node_id = forest.arena.insert(Node::new(pos.clone()));

        let parent_tree = if forest.trees.contains_key(&old_tree) {
            Some(old_tree)
        } else {
            None
        };

        let outcome = forest.absorb(
            space,
            checker.as_ref(),
            &mut self.stats,
            self.config.epsilon,
            self.config.radius,
            node_id,
            parent_tree,
        );

        self.stats.restart_count += 1;

        match outcome {
            Some(result) => {
                self.rebind_particles_from(result.tree_id, &result.rebound_particles);
                let particle = &mut self.particles[j];
                particle.pos = pos;
                particle.dir = vec![0.0; particle.dir.len()];
                particle.tree_id = result.tree_id;
                particle.last_node = Some(node_id);
                self.mab.as_mut().unwrap().reset_energy(j);
                Ok(false)
            }
            None => {
                let tree_id = forest.new_disjoint_tree_from_node(node_id, pos.clone());
                let particle = &mut self.particles[j];
                particle.pos = pos;
                particle.dir = vec![0.0; particle.dir.len()];
                particle.tree_id = tree_id;
                particle.last_node = Some(node_id);
                self.mab.as_mut().unwrap().reset_energy(j);
                Ok(true)
            }
        }
    }

    /// Updates every particle bound to a tree that was just dissolved into `surviving_tree`.
    /// Always rebinds rather than restarting, since a restart-during-merge would recurse back
    /// into `absorb`.
    fn rebind_particles_from(&mut self, surviving_tree: TreeId, rebound: &[ParticleId]) {
        for &pid in rebound {
            if let Some(particle) = self.particles.get_mut(pid.0) {
                particle.tree_id = surviving_tree;
            }
        }
    }

    /// One iteration of the main loop. Returns `Ok(())` whether or not a node was
    /// actually added this tick — a dropped/infeasible/invisible proposal is a normal outcome,
    /// not an error.
    fn run_once(&mut self, rng: &mut impl Rng) -> Result<(), PlanningError> {
        self.iterations_since_restart_check += 1;
        if self.iterations_since_restart_check > RANDOM_RESTART_EVERY {
            self.iterations_since_restart_check = 0;
            let low_energy = self.mab.as_ref().unwrap().low_energy_indices();
            for idx in low_energy {
                self.restart_pool.push_back(ParticleId(idx));
            }
        }

        if let Some(pid) = self.restart_pool.pop_front() {
            if !self.restart_particle(pid.0, rng)? {
                // merged straight into an existing tree; no node proposed this tick.
                return Ok(());
            }
        }

        let pd = self.problem_def.as_ref().unwrap().clone();
        let checker = self.validity_checker.as_ref().unwrap().clone();
        let space = &pd.space;

        let j = self
            .mab
            .as_mut()
            .unwrap()
            .pick(self.config.keep_go_forth, &mut self.stats, rng);
        let origin = self.particles[j].pos.clone();
        let dir = self.particles[j].propose_direction(rng);
        self.stats.randomwalk_count += 1;

        let mut q_rand = origin.clone();
        for (v, d) in q_rand.values.iter_mut().zip(dir.iter()) {
            *v += 3.0 * self.config.epsilon * d;
        }
        space.enforce_bounds(&mut q_rand);
        self.particles[j].try_new_pos(dir.clone());

        if !is_feasible(checker.as_ref(), &mut self.stats, &q_rand) {
            self.stats.add_invalid(true);
            self.particles[j].fail(&dir);
            self.mab.as_mut().unwrap().report_failure(j);
            return Ok(());
        }

        let tree_id = self.particles[j].tree_id;
        let forest = self.forest.as_mut().unwrap();
        let Some((nn_id, _)) = forest.nearest_in_tree(space, tree_id, &q_rand) else {
            return Ok(());
        };
        let nn_pos = forest.arena.get(nn_id).pos.clone();
        let q_new = step_from_to(space, self.config.ignore_step_size, &nn_pos, &q_rand, self.config.epsilon);

        if !check_motion(space, checker.as_ref(), &mut self.stats, &nn_pos, &q_new) {
            self.stats.add_invalid(false);
            self.particles[j].fail(&dir);
            self.mab.as_mut().unwrap().report_failure(j);
            return Ok(());
        }

        let newnode_id = forest.arena.insert(Node::new(q_new.clone()));
        self.particles[j].success();
        self.particles[j].confirm(q_new.clone());
        self.stats.add_free();
        self.mab.as_mut().unwrap().report_success(j);

        if tree_id == ROOT_TREE_ID {
            rewire::rrt_star_add_node(
                forest,
                space,
                checker.as_ref(),
                &mut self.stats,
                self.config.epsilon,
                self.config.radius,
                newnode_id,
                nn_id,
            );
        } else {
            forest.arena.get_mut(newnode_id).edges.push(nn_id);
            forest.arena.get_mut(nn_id).edges.push(newnode_id);
            let pos = forest.arena.get(newnode_id).pos.clone();
            forest.trees.get_mut(&tree_id).unwrap().add_newnode(newnode_id, pos);
        }
        self.particles[j].last_node = Some(newnode_id);

        if let Some(outcome) = forest.absorb(
            space,
            checker.as_ref(),
            &mut self.stats,
            self.config.epsilon,
            self.config.radius,
            newnode_id,
            Some(tree_id),
        ) {
            self.particles[j].tree_id = outcome.tree_id;
            self.rebind_particles_from(outcome.tree_id, &outcome.rebound_particles);
        }

        if self.particles[j].tree_id == ROOT_TREE_ID {
            if let Some(goal_node_id) = self.goal_node_id {
                rewire::check_goal(
                    self.forest.as_mut().unwrap(),
                    space,
                    checker.as_ref(),
                    &mut self.stats,
                    goal_node_id,
                    self.config.goal_radius,
                    newnode_id,
                );
            }
        }

        Ok(())
    }

    fn reconstruct_path(&self) -> Path<RealVectorState> {
        let forest = self.forest.as_ref().unwrap();
        let Some(goal_node_id) = self.goal_node_id else {
            return Path(Vec::new());
        };
        if self.stats.c_max.is_infinite() {
            return Path(Vec::new());
        }

        let mut states = Vec::new();
        let mut current = Some(goal_node_id);
        while let Some(id) = current {
            let node = forest.arena.get(id);
            states.push(node.pos.clone());
            current = node.parent;
        }
        states.reverse();
        Path(states)
    }
}

impl<G> Planner<RealVectorState, RealVectorStateSpace, G> for RrdtPlanner<G>
where
    G: Goal<RealVectorState> + GoalSampleableRegion<RealVectorState>,
{
    fn setup(
        &mut self,
        problem_def: Arc<ProblemDefinition<RealVectorState, RealVectorStateSpace, G>>,
        validity_checker: Arc<dyn StateValidityChecker<RealVectorState>>,
    ) {
        self.problem_def = Some(problem_def);
        self.validity_checker = Some(validity_checker);
        self.forest = None;
        self.particles.clear();
        self.mab = None;
        self.stats = Stats::new();
        self.goal_node_id = None;
        self.restart_pool.clear();
        self.iterations_since_restart_check = 0;
        self.initialized = false;
    }

    fn solve(&mut self, timeout: Duration) -> Result<Path<RealVectorState>, PlanningError> {
        if self.problem_def.is_none() || self.validity_checker.is_none() {
            return Err(PlanningError::PlannerUninitialised);
        }

        let mut rng = match self.config.seed {
            Some(seed) => PlannerRng::Seeded(StdRng::seed_from_u64(seed)),
            None => PlannerRng::Entropy(rand::rng()),
        };
        if !self.initialized {
            self.initialize(&mut rng)?;
            self.initialized = true;
        }

        let start_time = Instant::now();
        while self.stats.valid_sample < self.config.max_number_nodes as u64 {
            if start_time.elapsed() > timeout {
                return Err(PlanningError::Timeout);
            }
            self.run_once(&mut rng)?;
        }

        println!(
            "RRdT: reached {} valid samples, c_max = {}.",
            self.stats.valid_sample, self.stats.c_max
        );

        Ok(self.reconstruct_path())
    }
}
