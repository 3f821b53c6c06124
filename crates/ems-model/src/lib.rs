//! Shared data model for the EMS cardiac arrest analytics workspace.
//!
//! - **config**: pipeline configuration and the expected-schema manifest
//! - **columns**: names of the columns the pipeline derives
//! - **finding**: data-quality findings surfaced for human review
//! - **error**: configuration errors

pub mod columns;
pub mod config;
pub mod error;
pub mod finding;

pub use config::{ColumnNames, PipelineConfig, SchemaManifest, SheetNames, Thresholds};
pub use error::{ConfigError, Result};
pub use finding::{DataQualityFinding, FindingKind, FindingSeverity, QualityReport};
