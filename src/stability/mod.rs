//! Slope stability: factor-of-safety estimation behind ordered solver tiers.
//!
//! Responsibilities:
//!
//! - the tier capability (`tier`) and the 2-D slope cross-section (`section`)
//! - limit-equilibrium tiers (`bishop`, `wedge`) and an external command tier (`external`)
//! - ordered fallback with memoization (`resolver`)

pub mod bishop;
pub mod external;
pub mod resolver;
pub mod section;
pub mod tier;
pub mod wedge;

pub use bishop::*;
pub use external::*;
pub use resolver::*;
pub use section::*;
pub use tier::*;
pub use wedge::*;
