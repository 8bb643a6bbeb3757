//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - engine/family enums (`EngineKind`, `Family`)
//! - coefficient summaries (`TermEstimate`) and the tidy output (`ResultRow`, `ResultTable`)
//! - the resolved run configuration (`RunConfig`)

pub mod types;

pub use types::*;
