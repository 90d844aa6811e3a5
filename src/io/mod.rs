//! Input/output helpers.
//!
//! - parameter files (`params`)
//! - decision matrix CSV export (`export`)
//! - decision matrix JSON read/write (`matrix`)

pub mod export;
pub mod matrix;
pub mod params;

pub use export::*;
pub use matrix::*;
pub use params::*;
