// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use std::f64::consts::PI;

use rand::Rng;

use crate::base::{
    error::{StateSamplingError, StateSpaceError},
    space::StateSpace,
    state::RealVectorState,
};

/// A state space representing an N-dimensional Euclidean space (R^n), with optional
/// per-dimension wraparound.
///
/// Most common state space for systems whose configuration can be described by a vector of real
/// numbers. Supports both bounded (hyper-rectangle) and unbounded configurations. A dimension
/// marked "angular" is treated as a value on a circle of circumference `2*PI`: distance and
/// interpolation along that dimension take the shortest way around instead of the plain
/// difference. This lets the same space type serve a 2D point robot, a planar pose with heading,
/// or a manipulator's joint vector, without a dedicated state space for each.
#[derive(Clone)]
pub struct RealVectorStateSpace {
    /// n-Dimensionality of VectorStateSpace i.e. R^n.
    pub dimension: usize,
    /// The bounds for each dimension, defining the valid region for planning. Each tuple is
    /// `(lower, upper)`. For unbounded dimensions it is`f64::NEG_INFINITY` and `f64::INFINITY`
    pub bounds: Vec<(f64, f64)>,
    /// Per-dimension flag marking that dimension as angular (wraps at `2*PI`). Has length
    /// `dimension`; all `false` unless the space was built with `with_angular_dims`.
    pub angular_dims: Vec<bool>,

    longest_valid_segment_fraction: f64,
}

impl RealVectorStateSpace {
    /// Creates a new `RealVectorStateSpace`.
    ///
    /// This constructor allows for the creation of both bounded and unbounded spaces.
    /// To create a bounded space, provide a Some() vector of `(lower, upper)` tuples.
    /// To create an unbounded space, pass `None` for the bounds.
    ///
    /// # Arguments
    ///
    /// * `dimension` - The number of dimensions for the space.
    /// * `bounds_option` - An optional vector of `(min, max)` tuples.
    ///   - If `Some(bounds)`, the length of `bounds` must match `dimension`.
    ///   - If `None`, the space is initialized as unbounded in all dimensions.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * `StateSpaceError::DimensionMismatch`: The provided bounds vector has a different
    ///   length than the specified `dimension`.
    /// * `StateSpaceError::InvalidBound`: A lower bound is greater than or equal to its
    ///   corresponding upper bound.
    /// * `StateSpaceError::ZeroDimensionUnbounded`: An attempt is made to create an unbounded
    ///   space with zero dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use oxrrdt::base::space::RealVectorStateSpace;
    ///
    /// let bounds = vec![(-1.0, 1.0), (-2.0, 2.0)];
    /// let bounded_space = RealVectorStateSpace::new(2, Some(bounds)).unwrap();
    /// assert_eq!(bounded_space.dimension, 2);
    ///
    /// let unbounded_space = RealVectorStateSpace::new(3, None).unwrap();
    /// assert_eq!(unbounded_space.dimension, 3);
    /// assert_eq!(unbounded_space.bounds[0], (f64::NEG_INFINITY, f64::INFINITY));
    /// ```
    pub fn new(
        dimension: usize,
        bounds_option: Option<Vec<(f64, f64)>>,
    ) -> Result<Self, StateSpaceError> {
        let bounds = match bounds_option {
            Some(explicit_bounds) => {
                if explicit_bounds.len() != dimension {
                    return Err(StateSpaceError::DimensionMismatch {
                        expected: dimension,
                        found: explicit_bounds.len(),
                    });
                }
                for bound in &explicit_bounds {
                    if bound.0 >= bound.1 {
                        return Err(StateSpaceError::InvalidBound {
                            lower: bound.0,
                            upper: bound.1,
                        });
                    }
                }
                explicit_bounds
            }
            None => {
                if dimension == 0 {
                    return Err(StateSpaceError::ZeroDimensionUnbounded);
                }
                vec![(f64::NEG_INFINITY, f64::INFINITY); dimension]
            }
        };

        Ok(Self {
            dimension,
            bounds,
            angular_dims: vec![false; dimension],
            longest_valid_segment_fraction: 0.05,
        })
    }

    /// Creates a new `RealVectorStateSpace` with a subset of its dimensions marked as angular.
    ///
    /// Behaves exactly like [`RealVectorStateSpace::new`], except that `angular_dims[i] == true`
    /// causes dimension `i` to wrap at `2*PI` for the purposes of `distance` and `interpolate`.
    /// Bounds for an angular dimension are still honoured as given; pass `[-PI, PI)` if the
    /// dimension should range over the full circle.
    ///
    /// # Errors
    ///
    /// In addition to the errors of `new`, returns `StateSpaceError::DimensionMismatch` if
    /// `angular_dims.len() != dimension`.
    pub fn with_angular_dims(
        dimension: usize,
        bounds_option: Option<Vec<(f64, f64)>>,
        angular_dims: Vec<bool>,
    ) -> Result<Self, StateSpaceError> {
        if angular_dims.len() != dimension {
            return Err(StateSpaceError::DimensionMismatch {
                expected: dimension,
                found: angular_dims.len(),
            });
        }
        let mut space = Self::new(dimension, bounds_option)?;
        space.angular_dims = angular_dims;
        Ok(space)
    }

    /// A helper to calculate the diagonal of the space's bounding box.
    pub fn get_maximum_extent(&self) -> f64 {
        if self
            .bounds
            .iter()
            .any(|(low, high)| !low.is_finite() || !high.is_finite())
        {
            1.0
        } else {
            let sum_sq_diff: f64 = self
                .bounds
                .iter()
                .map(|(low, high)| (high - low).powi(2))
                .sum();
            sum_sq_diff.sqrt()
        }
    }

    /// Allows a user to configure the motion checking resolution.
    pub fn set_longest_valid_segment_fraction(&mut self, fraction: f64) {
        if fraction > 0.0 && fraction <= 1.0 {
            self.longest_valid_segment_fraction = fraction;
        } else if fraction <= 0.0 {
            self.longest_valid_segment_fraction = 0.;
        } else {
            self.longest_valid_segment_fraction = 1.;
        }
    }
}

impl StateSpace for RealVectorStateSpace {
    type StateType = RealVectorState;

    /// Find distance between current state1 and target state2. Depends on StateSpace.
    ///
    /// For non-angular dimensions this is the plain difference; for angular dimensions it is the
    /// shortest signed difference around the circle. The combined distance is the L2-norm of the
    /// per-dimension differences, so a space with no angular dimensions reduces to the ordinary
    /// Euclidean distance.
    fn distance(&self, state1: &Self::StateType, state2: &Self::StateType) -> f64 {
        assert_eq!(
            state1.values.len(),
            self.dimension,
            "State1 has incorrect dimension for this space."
        );
        assert_eq!(
            state2.values.len(),
            self.dimension,
            "State2 has incorrect dimension for this space."
        );
        state1
            .values
            .iter()
            .zip(state2.values.iter())
            .enumerate()
            .map(|(i, (v1, v2))| {
                let diff = v1 - v2;
                if self.angular_dims[i] {
                    wrap_pi(diff).powi(2)
                } else {
                    diff.powi(2)
                }
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Performs linear interpolation between two states.
    ///
    /// For a non-angular dimension the result is the usual
    /// `from.values[i] + t * (to.values[i] - from.values[i])`. For an angular dimension the
    /// shortest way around the circle is taken before scaling by `t`, and the result is
    /// normalised back into `[-PI, PI)`.
    fn interpolate(
        &self,
        from: &Self::StateType,
        to: &Self::StateType,
        t: f64,
        out_state: &mut Self::StateType,
    ) {
        assert_eq!(
            from.values.len(),
            self.dimension,
            "From-state has incorrect dimension."
        );
        assert_eq!(
            to.values.len(),
            self.dimension,
            "To-state has incorrect dimension."
        );
        assert_eq!(
            out_state.values.len(),
            self.dimension,
            "Out-state has incorrect dimension or not properly initialized."
        );
        for i in 0..from.values.len() {
            if self.angular_dims[i] {
                let diff = wrap_pi(to.values[i] - from.values[i]);
                out_state.values[i] = wrap_pi(from.values[i] + diff * t);
            } else {
                out_state.values[i] = from.values[i] + (to.values[i] - from.values[i]) * t;
            }
        }
    }

    /// Modifies the state by clamping each of its values to the space's bounds.
    ///
    /// Angular dimensions are normalised into `[-PI, PI)` before clamping, so a bound of
    /// `[-PI, PI)` on an angular dimension is effectively a no-op (the full circle).
    fn enforce_bounds(&self, state: &mut Self::StateType) {
        if state.values.len() != self.dimension {
            assert_eq!(
                state.values.len(),
                self.dimension,
                "State and space dimension mismatch when enforcing bounds."
            );
        }
        for (i, value) in state.values.iter_mut().enumerate() {
            if i < self.bounds.len() {
                if self.angular_dims[i] {
                    *value = wrap_pi(*value);
                }
                let (lower, upper) = self.bounds[i];
                *value = value.clamp(lower, upper);
            }
        }
    }

    /// Checks if a state is within the space's bounds, allowing for a small tolerance.
    ///
    /// This check uses a machine epsilon tolerance to prevent floating-point inaccuracies from
    /// incorrectly rejecting states that are numerically on the boundary.
    fn satisfies_bounds(&self, state: &Self::StateType) -> bool {
        if state.values.len() != self.dimension {
            assert_eq!(
                state.values.len(),
                self.dimension,
                "State and space dimension mismatch when checking bound satisfaction."
            );
        }
        for i in 0..self.dimension {
            let (lower, upper) = self.bounds[i];
            if state.values[i] - f64::EPSILON > upper || state.values[i] + f64::EPSILON < lower {
                return false;
            }
        }
        true
    }

    /// Generates a state uniformly at random from within the defined bounds.
    ///
    /// # Errors
    ///
    /// * `StateSamplingError::UnboundedDimension` if any dimension of the space is infinite.
    /// * `StateSamplingError::ZeroVolume` if any dimension has a lower bound greater than
    ///   or equal to its upper bound.
    fn sample_uniform(&self, rng: &mut impl Rng) -> Result<Self::StateType, StateSamplingError> {
        let mut values = Vec::with_capacity(self.dimension);

        for i in 0..self.dimension {
            let (lower, upper) = self.bounds[i];

            if !lower.is_finite() || !upper.is_finite() {
                return Err(StateSamplingError::UnboundedDimension { dimension_index: i });
            }
            if lower >= upper {
                return Err(StateSamplingError::ZeroVolume);
            }
            values.push(rng.random_range(lower..upper));
        }

        Ok(RealVectorState { values })
    }

    fn get_longest_valid_segment_length(&self) -> f64 {
        self.get_maximum_extent() * self.longest_valid_segment_fraction
    }
}

/// Wraps a difference into `[-PI, PI)`.
fn wrap_pi(diff: f64) -> f64 {
    (diff + PI).rem_euclid(2.0 * PI) - PI
}

#[cfg(test)]
#[path = "../unittests/rvss_tests.rs"]
mod tests;

#[cfg(test)]
mod angular_tests {
    use super::*;
    use crate::base::state::RealVectorState;

    #[test]
    fn distance_wraps_angular_dimension() {
        let space = RealVectorStateSpace::with_angular_dims(
            2,
            Some(vec![(-10.0, 10.0), (-PI, PI)]),
            vec![false, true],
        )
        .unwrap();
        let s1 = RealVectorState {
            values: vec![0.0, 3.0],
        };
        let s2 = RealVectorState {
            values: vec![0.0, -3.0],
        };
        let d = space.distance(&s1, &s2);
        assert!(d < (2.0 * PI - 6.0), "expected wrap-around to be shorter");
    }

    #[test]
    fn distance_matches_euclidean_when_no_dims_are_angular() {
        let euclidean = RealVectorStateSpace::new(3, None).unwrap();
        let generalized =
            RealVectorStateSpace::with_angular_dims(3, None, vec![false, false, false]).unwrap();
        let s1 = RealVectorState {
            values: vec![1.0, -2.0, 3.0],
        };
        let s2 = RealVectorState {
            values: vec![-1.0, 0.0, 7.0],
        };
        assert!(
            (euclidean.distance(&s1, &s2) - generalized.distance(&s1, &s2)).abs() < 1e-9
        );
    }

    #[test]
    fn interpolate_takes_shortest_way_around() {
        let space =
            RealVectorStateSpace::with_angular_dims(1, Some(vec![(-PI, PI)]), vec![true]).unwrap();
        let from = RealVectorState {
            values: vec![3.0],
        };
        let to = RealVectorState {
            values: vec![-3.0],
        };
        let mut out = RealVectorState { values: vec![0.0] };
        space.interpolate(&from, &to, 0.5, &mut out);
        assert!(
            out.values[0].abs() > 3.0,
            "midpoint should pass through the short way, near +/-PI, got {}",
            out.values[0]
        );
    }

    #[test]
    fn with_angular_dims_rejects_length_mismatch() {
        let result = RealVectorStateSpace::with_angular_dims(2, None, vec![true]);
        assert!(result.is_err());
    }
}
