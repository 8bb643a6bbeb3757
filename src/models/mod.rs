//! Model inputs: design matrices built from formulas and data tables.

pub mod design;

pub use design::*;
