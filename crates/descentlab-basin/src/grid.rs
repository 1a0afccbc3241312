//! Basin grid: bounds, per-cell outcomes and index-to-coordinate mapping.
//!
//! A grid of resolution R covers the rectangle `[x_min, x_max] × [y_min, y_max]`
//! with R × R starting points, endpoints included. Cells are indexed
//! `[row][col]`, rows following y and columns following x:
//!
//! ```text
//! x = x_min + col / (R − 1) · (x_max − x_min)
//! y = y_min + row / (R − 1) · (y_max − y_min)
//! ```
//!
//! A single-cell grid (R = 1) sits at the centre of the rectangle.

use crate::error::{BasinError, BasinResult};
use descentlab_core::core::{problem::Domain, types::Vector2};
use descentlab_core::optimization::optimizer::TerminationReason;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rectangle swept by a basin grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BasinBounds {
    /// Left edge
    pub x_min: f64,
    /// Right edge
    pub x_max: f64,
    /// Bottom edge
    pub y_min: f64,
    /// Top edge
    pub y_max: f64,
}

impl BasinBounds {
    /// Creates bounds without validating them.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Square `[min, max]²`.
    pub fn square(min: f64, max: f64) -> Self {
        Self::new(min, max, min, max)
    }

    /// Bounds spanning the first two axes of a problem domain.
    pub fn from_domain(domain: &Domain) -> Option<Self> {
        let (x_min, x_max) = domain.axis(0)?;
        let (y_min, y_max) = domain.axis(1)?;
        Some(Self::new(x_min, x_max, y_min, y_max))
    }

    /// Checks that both ranges are finite and non-empty.
    pub fn validate(&self) -> BasinResult<()> {
        for (axis, min, max) in [
            ("x", self.x_min, self.x_max),
            ("y", self.y_min, self.y_max),
        ] {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(BasinError::invalid_bounds(axis, min, max));
            }
        }
        Ok(())
    }

    /// Returns `true` if `(x, y)` lies inside the rectangle.
    pub fn contains(&self, point: &Vector2) -> bool {
        (self.x_min..=self.x_max).contains(&point.x) && (self.y_min..=self.y_max).contains(&point.y)
    }
}

/// Outcome of a single run started from a grid cell.
///
/// Exactly one of `converged`, `diverged` and `stalled` is set once the
/// cell has been computed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BasinPoint {
    /// Stopping tests fired and the final gradient is below gtol
    pub converged: bool,
    /// The run blew up or hit a singular system
    pub diverged: bool,
    /// Neither: iteration cap, or a convergence test fired away from a stationary point
    pub stalled: bool,
    /// Final position on the two grid axes
    pub convergence_loc: Vector2,
    /// Iterations performed
    pub iterations_used: usize,
    /// Loss at the final position
    pub final_loss: f64,
    /// Terminal state; `None` until the cell is computed
    pub termination: Option<TerminationReason>,
}

impl BasinPoint {
    /// Placeholder for a cell that has not been computed.
    pub fn pending(start: Vector2) -> Self {
        Self {
            converged: false,
            diverged: false,
            stalled: false,
            convergence_loc: start,
            iterations_used: 0,
            final_loss: f64::NAN,
            termination: None,
        }
    }

    /// Returns `true` once the cell holds a run outcome.
    pub fn is_computed(&self) -> bool {
        self.termination.is_some()
    }
}

/// Outcome counts over a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BasinSummary {
    /// Converged cells
    pub converged: usize,
    /// Diverged cells
    pub diverged: usize,
    /// Stalled cells
    pub stalled: usize,
}

/// A resolution × resolution grid of run outcomes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BasinData {
    /// Cells per axis
    pub resolution: usize,
    /// Swept rectangle
    pub bounds: BasinBounds,
    /// Fixed third coordinate for three-variable problems
    pub slice: Option<f64>,
    /// Cells, indexed `[row][col]`
    pub points: Vec<Vec<BasinPoint>>,
}

impl BasinData {
    /// Cell at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<&BasinPoint> {
        self.points.get(row)?.get(col)
    }

    /// Cells in row-major order with their indices.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &BasinPoint)> {
        self.points.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, point)| (row, col, point))
        })
    }

    /// Counts converged, diverged and stalled cells.
    pub fn summary(&self) -> BasinSummary {
        self.cells()
            .fold(BasinSummary::default(), |mut summary, (_, _, point)| {
                summary.converged += usize::from(point.converged);
                summary.diverged += usize::from(point.diverged);
                summary.stalled += usize::from(point.stalled);
                summary
            })
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Always `false` for a valid grid.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Allocates a grid with every cell pending.
///
/// # Errors
/// Fails on a zero resolution or invalid bounds.
pub fn initialize_basin_data(resolution: usize, bounds: BasinBounds) -> BasinResult<BasinData> {
    if resolution == 0 {
        return Err(BasinError::InvalidResolution { resolution });
    }
    bounds.validate()?;

    let mut data = BasinData {
        resolution,
        bounds,
        slice: None,
        points: Vec::with_capacity(resolution),
    };
    let points: Vec<Vec<BasinPoint>> = (0..resolution)
        .map(|row| {
            (0..resolution)
                .map(|col| BasinPoint::pending(grid_point(&data, row, col)))
                .collect()
        })
        .collect();
    data.points = points;

    Ok(data)
}

/// Coordinates of the starting point of cell `(row, col)`.
///
/// Indices past the last cell extrapolate linearly.
pub fn grid_point(data: &BasinData, row: usize, col: usize) -> Vector2 {
    let b = &data.bounds;
    if data.resolution <= 1 {
        return Vector2::new(0.5 * (b.x_min + b.x_max), 0.5 * (b.y_min + b.y_max));
    }

    let last = (data.resolution - 1) as f64;
    Vector2::new(
        b.x_min + col as f64 / last * (b.x_max - b.x_min),
        b.y_min + row as f64 / last * (b.y_max - b.y_min),
    )
}
