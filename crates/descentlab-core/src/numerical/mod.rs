//! Linear algebra kernel and derivative checks.

pub mod derivative_check;
pub mod linalg;

// Re-export numerical utilities
pub use derivative_check::*;
pub use linalg::*;
