//! Problem interface, error taxonomy and shared types.

pub mod error;
pub mod problem;
pub mod types;

// Re-export core types
pub use error::*;
pub use problem::*;
pub use types::*;
