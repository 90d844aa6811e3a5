//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - soil, slope and pipe configurations plus their enumerations (`types`)
//! - stability/stress outcomes and decision records (`results`)

pub mod results;
pub mod types;

pub use results::*;
pub use types::*;
