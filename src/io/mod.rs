//! Input/output helpers.
//!
//! - CSV ingest into a `DataTable` (`ingest`)
//! - tidy result export to CSV (`export`)
//! - result JSON read/write (`json`)

pub mod export;
pub mod ingest;
pub mod json;

pub use export::*;
pub use ingest::*;
pub use json::*;
