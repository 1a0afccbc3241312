//! Labelled 2-D point clouds for the classification problems.
//!
//! Datasets are generated from an explicit seed so the same problem can be
//! rebuilt bit-for-bit. There is no global RNG.

use descentlab_core::core::{
    error::{ProblemError, ProblemResult},
    types::{DMatrix, DVector},
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A labelled sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataPoint {
    /// First feature.
    pub x1: f64,
    /// Second feature.
    pub x2: f64,
    /// Class membership, `true` for the positive class.
    pub label: bool,
}

/// A non-empty set of labelled samples with finite features.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dataset {
    points: Vec<DataPoint>,
}

impl Dataset {
    /// Wraps a list of samples.
    ///
    /// # Errors
    /// Fails on an empty list or non-finite features.
    pub fn new(points: Vec<DataPoint>) -> ProblemResult<Self> {
        if points.is_empty() {
            return Err(ProblemError::invalid_dataset("dataset has no points"));
        }
        if let Some(p) = points
            .iter()
            .find(|p| !(p.x1.is_finite() && p.x2.is_finite()))
        {
            return Err(ProblemError::invalid_dataset(format!(
                "non-finite features ({}, {})",
                p.x1, p.x2
            )));
        }
        Ok(Self { points })
    }

    /// Samples.
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// n × 3 matrix of rows `[x1, x2, 1]` (bias column last).
    pub fn design_matrix(&self) -> DMatrix {
        DMatrix::from_fn(self.points.len(), 3, |i, j| match j {
            0 => self.points[i].x1,
            1 => self.points[i].x2,
            _ => 1.0,
        })
    }

    /// Labels encoded as 0 / 1.
    pub fn binary_labels(&self) -> DVector {
        DVector::from_iterator(
            self.points.len(),
            self.points.iter().map(|p| if p.label { 1.0 } else { 0.0 }),
        )
    }

    /// Labels encoded as −1 / +1.
    pub fn signed_labels(&self) -> DVector {
        DVector::from_iterator(
            self.points.len(),
            self.points.iter().map(|p| if p.label { 1.0 } else { -1.0 }),
        )
    }
}

/// Seeded generator of synthetic datasets.
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    rng: SmallRng,
}

fn normal(std_dev: f64) -> ProblemResult<Normal<f64>> {
    Normal::new(0.0, std_dev)
        .map_err(|e| ProblemError::invalid_dataset(format!("invalid noise level {std_dev}: {e}")))
}

impl DatasetGenerator {
    /// Creates a generator from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Two isotropic Gaussian blobs centred at ±(separation/2)(1, 1).
    pub fn gaussian_clusters(
        &mut self,
        per_class: usize,
        separation: f64,
        spread: f64,
    ) -> ProblemResult<Dataset> {
        let noise = normal(spread)?;
        let half = 0.5 * separation;
        let mut points = Vec::with_capacity(2 * per_class);

        for label in [false, true] {
            let centre = if label { half } else { -half };
            for _ in 0..per_class {
                points.push(DataPoint {
                    x1: centre + noise.sample(&mut self.rng),
                    x2: centre + noise.sample(&mut self.rng),
                    label,
                });
            }
        }

        Dataset::new(points)
    }

    /// Two interleaved half-moons ("crescents") with Gaussian jitter.
    ///
    /// The negative class follows (cos t, sin t), the positive class
    /// (1 − cos t, ½ − sin t), for t uniform in [0, π]. The classes are not
    /// linearly separable.
    pub fn crescents(&mut self, per_class: usize, jitter: f64) -> ProblemResult<Dataset> {
        let noise = normal(jitter)?;
        let mut points = Vec::with_capacity(2 * per_class);

        for label in [false, true] {
            for _ in 0..per_class {
                let t = self.rng.gen_range(0.0..PI);
                let (x1, x2) = if label {
                    (1.0 - t.cos(), 0.5 - t.sin())
                } else {
                    (t.cos(), t.sin())
                };
                points.push(DataPoint {
                    x1: x1 + noise.sample(&mut self.rng),
                    x2: x2 + noise.sample(&mut self.rng),
                    label,
                });
            }
        }

        Dataset::new(points)
    }
}
