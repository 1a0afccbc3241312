//! Small dense linear algebra kernel.
//!
//! Everything here operates on 2×2 or 3×3 symmetric matrices (Hessians of
//! the supported problems), so the routines favour robustness over speed.
//!
//! # Eigenvalues
//!
//! For a symmetric 2×2 matrix
//!
//! ```text
//! H = | a  b |
//!     | b  d |
//! ```
//!
//! the eigenvalues are λ = (tr ± √(tr² − 4 det)) / 2. Written as
//!
//! ```text
//! λ± = (a + d)/2 ± hypot((a − d)/2, b)
//! ```
//!
//! the discriminant is a sum of squares, so it can never go negative through
//! rounding and `hypot` avoids overflow. Larger matrices go through
//! nalgebra's symmetric QR eigensolver.
//!
//! # Damped solve
//!
//! Newton directions solve (H + λI) p = −g. Cholesky is attempted first; if
//! the damped matrix is not positive definite, LU with partial pivoting is
//! used instead. The inverse is never formed.

use crate::core::error::{LinalgError, LinalgResult};
use crate::core::types::{all_finite, constants, DMatrix, DVector};
use nalgebra::SymmetricEigen;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decomposition that produced a damped Newton direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolveMethod {
    /// H + λI was positive definite.
    Cholesky,
    /// LU with partial pivoting fallback.
    Lu,
}

/// Solution of a damped Newton system.
#[derive(Debug, Clone, PartialEq)]
pub struct DampedSolution {
    /// Search direction p solving (H + λI) p = −g.
    pub direction: DVector,
    /// Decomposition used.
    pub method: SolveMethod,
}

fn ensure_square(h: &DMatrix) -> LinalgResult<usize> {
    if h.nrows() == h.ncols() {
        Ok(h.nrows())
    } else {
        Err(LinalgError::NotSquare {
            rows: h.nrows(),
            cols: h.ncols(),
        })
    }
}

fn symmetrize(h: &DMatrix) -> DMatrix {
    (h + h.transpose()) * 0.5
}

/// Eigenvalues of a symmetric 2×2 matrix, returned as `(λ1, λ2)` with λ1 ≥ λ2.
///
/// The off-diagonal entry is taken as the mean of `h[(0,1)]` and `h[(1,0)]`.
pub fn eigenvalues_2x2(h: &DMatrix) -> LinalgResult<(f64, f64)> {
    if h.shape() != (2, 2) {
        return Err(LinalgError::dimension_mismatch(
            "2x2",
            format!("{}x{}", h.nrows(), h.ncols()),
        ));
    }

    let a = h[(0, 0)];
    let d = h[(1, 1)];
    let b = 0.5 * (h[(0, 1)] + h[(1, 0)]);

    let mean = 0.5 * (a + d);
    let radius = (0.5 * (a - d)).hypot(b);

    Ok((mean + radius, mean - radius))
}

/// Eigenvalues of a symmetric matrix, sorted in descending order.
///
/// Uses the closed form for 2×2 matrices and nalgebra's symmetric
/// eigensolver otherwise. The input is symmetrized first.
pub fn symmetric_eigenvalues(h: &DMatrix) -> LinalgResult<DVector> {
    let n = ensure_square(h)?;

    if n == 2 {
        let (l1, l2) = eigenvalues_2x2(h)?;
        return Ok(DVector::from_vec(vec![l1, l2]));
    }

    let mut values: Vec<f64> = SymmetricEigen::new(symmetrize(h))
        .eigenvalues
        .iter()
        .copied()
        .collect();
    values.sort_by(|x, y| y.total_cmp(x));

    Ok(DVector::from_vec(values))
}

/// Ratio max|λ| / min|λ|.
///
/// Returns `f64::INFINITY` when the smallest magnitude is zero and `NaN`
/// for an empty input.
pub fn condition_number(eigenvalues: &DVector) -> f64 {
    if eigenvalues.is_empty() {
        return f64::NAN;
    }

    let max = eigenvalues.iter().fold(0.0_f64, |m, l| m.max(l.abs()));
    let min = eigenvalues
        .iter()
        .fold(f64::INFINITY, |m, l| m.min(l.abs()));

    if min == 0.0 {
        f64::INFINITY
    } else {
        max / min
    }
}

/// Returns `true` if every eigenvalue is strictly positive.
pub fn is_positive_definite(eigenvalues: &DVector) -> bool {
    !eigenvalues.is_empty() && eigenvalues.iter().all(|l| *l > 0.0)
}

/// Solves (H + λI) p = −g.
///
/// Cholesky is tried first. When the damped matrix is not positive definite
/// the system is handed to LU with partial pivoting; a pivot smaller than
/// `PIVOT_TOLERANCE` times the largest entry, or a non-finite solution, is
/// reported as [`LinalgError::SingularSystem`].
pub fn damped_solve(h: &DMatrix, g: &DVector, damping: f64) -> LinalgResult<DampedSolution> {
    let n = ensure_square(h)?;
    if g.len() != n {
        return Err(LinalgError::dimension_mismatch(n, g.len()));
    }

    let damped = symmetrize(h) + DMatrix::identity(n, n) * damping;
    let rhs = -g;

    if let Some(chol) = damped.clone().cholesky() {
        let direction = chol.solve(&rhs);
        if all_finite(&direction) {
            return Ok(DampedSolution {
                direction,
                method: SolveMethod::Cholesky,
            });
        }
    }

    let scale = damped.amax();
    if scale == 0.0 || !scale.is_finite() {
        return Err(LinalgError::singular_system(n, damping));
    }

    let lu = damped.lu();
    let u = lu.u();
    let pivot_floor = constants::PIVOT_TOLERANCE * scale;
    if (0..n).any(|i| u[(i, i)].abs() <= pivot_floor) {
        return Err(LinalgError::singular_system(n, damping));
    }

    match lu.solve(&rhs) {
        Some(direction) if all_finite(&direction) => Ok(DampedSolution {
            direction,
            method: SolveMethod::Lu,
        }),
        _ => Err(LinalgError::singular_system(n, damping)),
    }
}

/// Mean absolute per-coordinate change, (1/n) Σ |aᵢ − bᵢ|.
pub fn mean_abs_step(a: &DVector, b: &DVector) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    (a - b).iter().map(|x| x.abs()).sum::<f64>() / a.len() as f64
}
