// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::config::ProposalDistribution;

/// The von Mises-Fisher concentration parameter used for the base PMF.
const VMF_KAPPA: f64 = 1.5 * PI;
/// The length scale of the Gaussian-on-sphere failure bump.
const FAIL_LENGTH_SCALE: f64 = PI / 10.0;

/// A particle's dynamic directional proposal distribution over the unit sphere in R^d.
///
/// `support` is a fixed set of unit vectors on the sphere, sampled once at construction. The
/// base PMF is a von Mises-Fisher distribution centered at the last successful direction;
/// `working` starts equal to the base PMF after every success and is eroded by `fail` calls
/// in between.
#[derive(Debug, Clone)]
pub struct PmfState {
    dim: usize,
    support: Vec<Vec<f64>>,
    mu: Option<Vec<f64>>,
    working: Vec<f64>,
    mode: ProposalDistribution,
    last_failed: bool,
}

impl PmfState {
    /// Builds a fresh, cold-start PMF for a `dim`-dimensional configuration space. Support set
    /// size is `361*(d-1)^2` for `d>=2`, `61` for `d=1`.
    pub fn new(dim: usize, mode: ProposalDistribution, rng: &mut impl Rng) -> Self {
        let support_size = if dim >= 2 { 361 * (dim - 1).pow(2) } else { 61 };
        let support: Vec<Vec<f64>> = (0..support_size)
            .map(|_| random_unit_vector(dim, rng))
            .collect();
        let working = vec![1.0 / support_size as f64; support_size];
        PmfState {
            dim,
            support,
            mu: None,
            working,
            mode,
            last_failed: false,
        }
    }

    /// Draws a proposal direction.
    ///
    /// `origin_dir` is the particle's current direction, used only by `ray-casting` mode to
    /// exploit directional momentum after a success.
    pub fn draw(&mut self, origin_dir: Option<&[f64]>, rng: &mut impl Rng) -> Vec<f64> {
        if self.mu.is_none() {
            // Cold start: the base PMF hasn't been centered on anything yet.
            return random_unit_vector(self.dim, rng);
        }

        match self.mode {
            ProposalDistribution::RayCasting => {
                if !self.last_failed {
                    if let Some(origin) = origin_dir {
                        return origin.to_vec();
                    }
                }
                self.support[argmax(&self.working)].clone()
            }
            ProposalDistribution::DynamicVonMises | ProposalDistribution::Original => {
                self.support[categorical_sample(&self.working, rng)].clone()
            }
        }
    }

    /// Erodes the working PMF around the failed direction `xi` and renormalizes it to sum to 1.
    /// A no-op in `original` mode.
    pub fn fail(&mut self, xi: &[f64]) {
        self.last_failed = true;
        if self.mode == ProposalDistribution::Original {
            return;
        }

        for (i, x) in self.support.iter().enumerate() {
            let sigma = 0.9 * self.working[i].sqrt();
            let chord: f64 = x
                .iter()
                .zip(xi.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            let bump = sigma.powi(2)
                * (-2.0 * (chord / 2.0).sin().powi(2) / FAIL_LENGTH_SCALE.powi(2)).exp();
            self.working[i] = (self.working[i] - bump).max(0.0);
        }

        let sum: f64 = self.working.iter().sum();
        if sum > 1e-12 {
            for w in self.working.iter_mut() {
                *w /= sum;
            }
        } else {
            let n = self.working.len() as f64;
            for w in self.working.iter_mut() {
                *w = 1.0 / n;
            }
        }
    }

    /// Records a successful move: centers the base PMF on `direction` and resets the working
    /// PMF to match it.
    pub fn success(&mut self, direction: Vec<f64>) {
        self.mu = Some(direction);
        self.last_failed = false;
        self.recompute_base();
    }

    fn recompute_base(&mut self) {
        let Some(mu) = self.mu.clone() else { return };
        let mut y: Vec<f64> = self
            .support
            .iter()
            .map(|x| {
                let dot: f64 = x.iter().zip(mu.iter()).map(|(a, b)| a * b).sum();
                (VMF_KAPPA * dot).exp()
            })
            .collect();
        let sum: f64 = y.iter().sum();
        if sum > 0.0 {
            for v in y.iter_mut() {
                *v /= sum;
            }
        }
        self.working = y;
    }

    #[cfg(test)]
    pub(crate) fn working_sum(&self) -> f64 {
        self.working.iter().sum()
    }
}

fn random_unit_vector(dim: usize, rng: &mut impl Rng) -> Vec<f64> {
    let mut v: Vec<f64> = (0..dim).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
    let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 1e-12 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn categorical_sample(weights: &[f64], rng: &mut impl Rng) -> usize {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return rng.random_range(0..weights.len());
    }
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
    fn working_pmf_stays_normalized_after_fail_calls() {
        let mut rng = rand::rng();
        let mut pmf = PmfState::new(2, ProposalDistribution::DynamicVonMises, &mut rng);
        pmf.success(vec![1.0, 0.0]);
        for _ in 0..10 {
            pmf.fail(&[1.0, 0.0]);
            assert!((pmf.working_sum() - 1.0).abs() < 1e-6);
            assert!(pmf.working.iter().all(|&w| w >= 0.0));
        }
    }

    #[test]
    fn fail_shifts_argmax_away_from_failed_direction() {
        let mut rng = rand::rng();
        let mut pmf = PmfState::new(2, ProposalDistribution::DynamicVonMises, &mut rng);
        pmf.success(vec![1.0, 0.0]);
        let before = argmax(&pmf.working);
        pmf.fail(&pmf.support[before].clone());
        let after = argmax(&pmf.working);
        assert_ne!(before, after);
    }

    #[test]
    fn original_mode_ignores_fail() {
        let mut rng = rand::rng();
        let mut pmf = PmfState::new(2, ProposalDistribution::Original, &mut rng);
        pmf.success(vec![1.0, 0.0]);
        let before = pmf.working.clone();
        pmf.fail(&[0.0, 1.0]);
        assert_eq!(before, pmf.working);
    }

    #[test]
    fn cold_start_draw_does_not_touch_support() {
        let mut rng = rand::rng();
        let mut pmf = PmfState::new(2, ProposalDistribution::DynamicVonMises, &mut rng);
        let v = pmf.draw(None, &mut rng);
        assert!((v.iter().map(|x| x * x).sum::<f64>().sqrt() - 1.0).abs() < 1e-9);
    }
}
