// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use rand::Rng;

use super::{error::RrdtError, stats::Stats};

const ENERGY_MIN: f64 = 0.0;
const ENERGY_MAX: f64 = 10.0;
const ENERGY_START: f64 = ENERGY_MAX;
const ENERGY_DECAY: f64 = 0.7;
const LOW_ENERGY_THRESHOLD: f64 = 0.1;

/// The multi-armed-bandit scheduler picking which particle samples next.
#[derive(Debug, Clone)]
pub struct Mab {
    energy: Vec<f64>,
    last_picked: Option<usize>,
    last_outcome_success: bool,
}

impl Mab {
    pub fn new(num_particles: usize) -> Self {
        Mab {
            energy: vec![ENERGY_START; num_particles],
            last_picked: None,
            last_outcome_success: false,
        }
    }

    /// Picks a particle index, `j ~ Categorical(E / sum(E))`.
    ///
    /// If `keep_go_forth` is set and the previous pick succeeded, the same index is returned
    /// unchanged — the ray-casting momentum shortcut. On numerical desync (`sum(E)`
    /// non-positive or non-finite) energies are reset to 1 and a warning is logged.
    pub fn pick(&mut self, keep_go_forth: bool, stats: &mut Stats, rng: &mut impl Rng) -> usize {
        if keep_go_forth && self.last_outcome_success {
            if let Some(j) = self.last_picked {
                return j;
            }
        }

        let sum: f64 = self.energy.iter().sum();
        let j = if sum.is_finite() && sum > 0.0 {
            categorical_index(&self.energy, sum, rng)
        } else {
            eprintln!("[warn] {} (sum={sum})", RrdtError::SamplerDesync);
            stats.sampler_desync_count += 1;
            for e in self.energy.iter_mut() {
                *e = 1.0;
            }
            let resync_sum: f64 = self.energy.iter().sum();
            categorical_index(&self.energy, resync_sum, rng)
        };

        self.last_picked = Some(j);
        j
    }

    /// Records that the pick at index `j` succeeded. Energy is left unchanged on success.
    pub fn report_success(&mut self, _j: usize) {
        self.last_outcome_success = true;
    }

    /// Records that the pick at index `j` failed, decaying its energy.
    pub fn report_failure(&mut self, j: usize) {
        self.energy[j] = (self.energy[j] * ENERGY_DECAY).max(ENERGY_MIN);
        self.last_outcome_success = false;
    }

    /// Resets `j`'s energy back to `ENERGY_START` (called on particle restart).
    pub fn reset_energy(&mut self, j: usize) {
        self.energy[j] = ENERGY_START;
    }

    /// Returns the indices of particles whose energy has decayed below the low-energy
    /// threshold, to be enqueued for restart.
    pub fn low_energy_indices(&self) -> Vec<usize> {
        self.energy
            .iter()
            .enumerate()
            .filter(|&(_, &e)| e < LOW_ENERGY_THRESHOLD)
            .map(|(i, _)| i)
            .collect()
    }
}

fn categorical_index(weights: &[f64], total: f64, rng: &mut impl Rng) -> usize {
    let mut target = rng.random_range(0.0..total);
    for (i, &w) in weights.iter().enumerate() {
        if target < w {
            return i;
        }
        target -= w;
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_decays_energy_and_success_does_not() {
        let mut mab = Mab::new(3);
        mab.report_failure(0);
        assert!((mab.energy[0] - ENERGY_START * ENERGY_DECAY).abs() < 1e-9);
        let before = mab.energy.clone();
        mab.report_success(1);
        assert_eq!(before, mab.energy);
    }

    #[test]
    fn desync_resets_energy_to_one() {
        let mut mab = Mab::new(3);
        mab.energy = vec![0.0, 0.0, 0.0];
        let mut stats = Stats::new();
        let mut rng = rand::rng();
        mab.pick(false, &mut stats, &mut rng);
        assert!(mab.energy.iter().all(|&e| (e - 1.0).abs() < 1e-9));
        assert_eq!(stats.sampler_desync_count, 1);
    }

    #[test]
    fn keep_go_forth_repeats_last_pick_after_success() {
        let mut mab = Mab::new(3);
        let mut stats = Stats::new();
        let mut rng = rand::rng();
        let j = mab.pick(true, &mut stats, &mut rng);
        mab.report_success(j);
        let j2 = mab.pick(true, &mut stats, &mut rng);
        assert_eq!(j, j2);
    }
}
