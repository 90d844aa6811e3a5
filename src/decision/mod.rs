//! Decision support.
//!
//! Responsibilities:
//!
//! - map FoS and stress outcomes to action priorities (`classifier`)
//! - assemble the decision matrix and its summary (`aggregator`)

pub mod aggregator;
pub mod classifier;

pub use aggregator::*;
pub use classifier::*;
