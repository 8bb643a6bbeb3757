//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - regression engines behind one trait (`engine`, `linear`, `logistic`)
//! - coefficient summaries with confidence intervals (`summary`)
//! - the sequential (outcome x chain length) model grid (`sequential`)

pub mod engine;
pub mod linear;
pub mod logistic;
pub mod sequential;
pub mod summary;

pub use engine::*;
pub use linear::*;
pub use logistic::*;
pub use sequential::*;
pub use summary::*;
