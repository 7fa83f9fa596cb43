//! Temporal segment sampling strategies.

mod plan;
mod segment;

pub use plan::*;
pub use segment::*;
