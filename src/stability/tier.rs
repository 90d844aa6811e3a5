//! The solver-tier capability.
//!
//! A tier is anything that can turn a slope configuration into a factor of safety
//! for one analysis type, or report that it cannot.

use crate::domain::{AnalysisType, SlopeConfiguration, TierId};
use crate::error::ScreenError;

/// One FoS estimation method in the resolver's ordered list.
pub trait StabilityTier: Send + Sync {
    fn id(&self) -> TierId;

    /// Whether the tier can run at all in this process (binary installed, etc.).
    ///
    /// Evaluated once, when the resolver is built.
    fn is_available(&self) -> bool {
        true
    }

    /// Estimate the FoS, or return `ScreenError::SolverUnavailable`.
    fn attempt(&self, slope: &SlopeConfiguration, analysis: AnalysisType) -> Result<f64, ScreenError>;
}
