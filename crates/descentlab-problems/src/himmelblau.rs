//! Himmelblau's function.
//!
//! f(x, y) = (x² + y − 11)² + (x + y² − 7)²
//!
//! Four global minima with f = 0, one local maximum and four saddle points
//! inside [−5, 5]². The standard picture for basins of convergence: descent
//! methods split the plane into four attractor regions, while undamped Newton
//! is just as happy to converge to the maximum or a saddle.

use descentlab_core::core::{
    problem::{CriticalPoint, Domain, Problem},
    types::{DMatrix, DVector},
};

/// The four global minimizers.
pub const HIMMELBLAU_MINIMA: [[f64; 2]; 4] = [
    [3.0, 2.0],
    [-2.805_118_086_952_745, 3.131_312_518_250_573],
    [-3.779_310_253_377_747, -3.283_185_991_286_170],
    [3.584_428_340_330_492, -1.848_126_526_964_403],
];

/// The local maximizer.
pub const HIMMELBLAU_MAXIMUM: [f64; 2] = [-0.270_844_590_667_348, -0.923_038_556_479_981];

/// The four saddle points.
pub const HIMMELBLAU_SADDLES: [[f64; 2]; 4] = [
    [0.086_677_504_555_396, 2.884_254_701_174_776],
    [-3.073_025_750_764_390, -0.081_353_044_287_968],
    [3.385_154_183_607_021, 0.073_851_879_837_749],
    [-0.127_961_346_730_680, -1.953_714_980_244_577],
];

/// Himmelblau's function.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Himmelblau;

impl Himmelblau {
    /// Creates the problem.
    pub fn new() -> Self {
        Self
    }

    /// The four minimizers as vectors.
    pub fn minima() -> Vec<DVector> {
        HIMMELBLAU_MINIMA
            .iter()
            .map(|m| DVector::from_column_slice(m))
            .collect()
    }
}

impl Problem for Himmelblau {
    fn name(&self) -> &str {
        "himmelblau"
    }

    fn dimension(&self) -> usize {
        2
    }

    fn objective(&self, w: &DVector) -> f64 {
        let (x, y) = (w[0], w[1]);
        (x * x + y - 11.0).powi(2) + (x + y * y - 7.0).powi(2)
    }

    fn gradient(&self, w: &DVector) -> DVector {
        let (x, y) = (w[0], w[1]);
        let u = x * x + y - 11.0;
        let v = x + y * y - 7.0;
        DVector::from_vec(vec![4.0 * x * u + 2.0 * v, 2.0 * u + 4.0 * y * v])
    }

    fn hessian(&self, w: &DVector) -> Option<DMatrix> {
        let (x, y) = (w[0], w[1]);
        let hxx = 12.0 * x * x + 4.0 * y - 42.0;
        let hxy = 4.0 * (x + y);
        let hyy = 4.0 * x + 12.0 * y * y - 26.0;
        Some(DMatrix::from_row_slice(2, 2, &[hxx, hxy, hxy, hyy]))
    }

    fn has_hessian(&self) -> bool {
        true
    }

    fn domain(&self) -> Domain {
        Domain::cube(-5.0, 5.0, 2)
    }

    fn global_minimum(&self) -> Option<DVector> {
        Some(DVector::from_column_slice(&HIMMELBLAU_MINIMA[0]))
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        HIMMELBLAU_MINIMA
            .iter()
            .map(|m| CriticalPoint::minimum(m))
            .chain(std::iter::once(CriticalPoint::maximum(&HIMMELBLAU_MAXIMUM)))
            .chain(HIMMELBLAU_SADDLES.iter().map(|s| CriticalPoint::saddle(s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use descentlab_core::prelude::{symmetric_eigenvalues, CriticalPointKind};

    #[test]
    fn test_values_at_origin() {
        let f = Himmelblau::new();
        let w = DVector::zeros(2);
        assert_relative_eq!(f.objective(&w), 170.0);
        assert_relative_eq!(f.gradient(&w), DVector::from_vec(vec![-14.0, -22.0]));
        assert_relative_eq!(
            f.hessian(&w).unwrap(),
            DMatrix::from_row_slice(2, 2, &[-42.0, 0.0, 0.0, -26.0])
        );
    }

    #[test]
    fn test_critical_point_kinds_match_hessian() {
        let f = Himmelblau::new();
        let points = f.critical_points();
        assert_eq!(points.len(), 9);

        for cp in points {
            assert!(f.gradient(&cp.location).norm() < 1e-8);
            let eigs = symmetric_eigenvalues(&f.hessian(&cp.location).unwrap()).unwrap();
            let kind = match (eigs[0] > 0.0, eigs[1] > 0.0) {
                (true, true) => CriticalPointKind::Minimum,
                (false, false) => CriticalPointKind::Maximum,
                _ => CriticalPointKind::Saddle,
            };
            assert_eq!(kind, cp.kind, "at {:?}", cp.location.as_slice());
        }
    }
}
