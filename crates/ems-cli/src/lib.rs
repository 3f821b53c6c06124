//! CLI library components for the EMS cardiac arrest pipeline.

pub mod logging;
pub mod pipeline;
