//! Line search, stopping criteria and run traces.

pub mod line_search;
pub mod optimizer;
pub mod trace;

// Re-export optimization components
pub use line_search::*;
pub use optimizer::*;
pub use trace::*;
