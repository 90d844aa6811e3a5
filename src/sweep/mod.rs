//! Configuration-space sweep.
//!
//! Responsibilities:
//!
//! - hold and validate the parameter axes (`axes`)
//! - expand them into deduplicated slope and pipe configurations (`generator`)

pub mod axes;
pub mod generator;

pub use axes::*;
pub use generator::*;
