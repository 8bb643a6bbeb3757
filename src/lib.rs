//! `hrv-seqmodels` library crate.
//!
//! Builds sequential regression models: for each outcome, an increasing chain of
//! nested models (`o ~ p1`, `o ~ p1 + p2`, ...) with an optional exposure forced
//! into first position, summarized into one tidy table.
//!
//! The binary (`seqmod`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the builder can be used directly from other Rust code

pub mod app;
pub mod cli;
pub mod data;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod fit;
pub mod formula;
pub mod io;
pub mod math;
pub mod models;
pub mod report;

pub use data::DataTable;
pub use domain::{ConfidenceLevel, EngineKind, Family, ResultRow, ResultTable};
pub use error::{AppError, FitError, ModelError};
pub use fit::{ModelPlan, RegressionEngine, SequentialBuilder, build_sequential_models};
pub use formula::ModelSpec;
