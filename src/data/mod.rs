//! Tabular data: the in-memory table the builder reads, and a synthetic
//! cohort generator for demos and tests.

pub mod sample;
pub mod table;

pub use sample::*;
pub use table::*;
