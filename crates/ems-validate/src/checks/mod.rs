//! Individual data-quality checks.

pub mod duplicates;
pub mod intervals;
pub mod missing;
pub mod unmatched;
