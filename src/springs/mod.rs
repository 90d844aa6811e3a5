//! Soil-pipe interaction.
//!
//! Responsibilities:
//!
//! - ALA soil-spring factors (`factors`)
//! - soil force per unit length and the longitudinal stress check (`calculator`)

pub mod calculator;
pub mod factors;

pub use calculator::*;
pub use factors::*;
