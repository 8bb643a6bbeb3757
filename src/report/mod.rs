//! Reporting utilities: terminal formatting of plans, results and diagnostics.

pub mod format;

pub use format::*;
