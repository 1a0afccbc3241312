//! Three-hump camel function.
//!
//! f(x, y) = 2x² − 1.05x⁴ + x⁶/6 + xy + y²
//!
//! One global minimum at the origin, two shallower local minima and two
//! saddles separating them.

use descentlab_core::core::{
    problem::{CriticalPoint, Domain, Problem},
    types::{DMatrix, DVector},
};

const LOCAL_MIN: [f64; 2] = [1.747_552_345_830_289, -0.873_776_172_915_145];
const SADDLE: [f64; 2] = [1.070_542_291_823_660, -0.535_271_145_911_830];

/// Three-hump camel function.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThreeHumpCamel;

impl ThreeHumpCamel {
    /// Creates the problem.
    pub fn new() -> Self {
        Self
    }
}

impl Problem for ThreeHumpCamel {
    fn name(&self) -> &str {
        "three-hump-camel"
    }

    fn dimension(&self) -> usize {
        2
    }

    fn objective(&self, w: &DVector) -> f64 {
        let (x, y) = (w[0], w[1]);
        let x2 = x * x;
        2.0 * x2 - 1.05 * x2 * x2 + x2 * x2 * x2 / 6.0 + x * y + y * y
    }

    fn gradient(&self, w: &DVector) -> DVector {
        let (x, y) = (w[0], w[1]);
        let x2 = x * x;
        DVector::from_vec(vec![
            4.0 * x - 4.2 * x2 * x + x2 * x2 * x + y,
            x + 2.0 * y,
        ])
    }

    fn hessian(&self, w: &DVector) -> Option<DMatrix> {
        let x2 = w[0] * w[0];
        let hxx = 4.0 - 12.6 * x2 + 5.0 * x2 * x2;
        Some(DMatrix::from_row_slice(2, 2, &[hxx, 1.0, 1.0, 2.0]))
    }

    fn has_hessian(&self) -> bool {
        true
    }

    fn domain(&self) -> Domain {
        Domain::cube(-3.0, 3.0, 2)
    }

    fn global_minimum(&self) -> Option<DVector> {
        Some(DVector::zeros(2))
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        vec![
            CriticalPoint::minimum(&[0.0, 0.0]),
            CriticalPoint::minimum(&LOCAL_MIN),
            CriticalPoint::minimum(&[-LOCAL_MIN[0], -LOCAL_MIN[1]]),
            CriticalPoint::saddle(&SADDLE),
            CriticalPoint::saddle(&[-SADDLE[0], -SADDLE[1]]),
        ]
    }
}
