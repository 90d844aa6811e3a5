//! Error types.
//!
//! Two layers:
//!
//! - [`ScreenError`] is the engine taxonomy. Only `InvalidAxis` aborts a run;
//!   the others are recorded per configuration and the batch carries on.
//! - [`AppError`] is what the binary reports: a message plus a process exit code.

use crate::domain::{AnalysisType, TierId};

/// Errors raised by the screening engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScreenError {
    #[error("Invalid {axis} axis: {reason}")]
    InvalidAxis { axis: &'static str, reason: String },

    #[error("Solver tier {tier} unavailable: {reason}")]
    SolverUnavailable { tier: TierId, reason: String },

    #[error("All {attempted} solver tier(s) exhausted for {analysis} analysis")]
    AllSolversExhausted {
        analysis: AnalysisType,
        attempted: usize,
    },

    #[error("Stress computation failed: {0}")]
    StressComputation(String),

    #[error("Worker pool: {0}")]
    WorkerPool(String),

    #[error("{0}")]
    Io(String),
}

impl ScreenError {
    pub fn invalid_axis(axis: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAxis {
            axis,
            reason: reason.into(),
        }
    }

    pub fn unavailable(tier: TierId, reason: impl Into<String>) -> Self {
        Self::SolverUnavailable {
            tier,
            reason: reason.into(),
        }
    }

    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidAxis { .. } | Self::Io(_) => 2,
            Self::SolverUnavailable { .. }
            | Self::AllSolversExhausted { .. }
            | Self::StressComputation(_)
            | Self::WorkerPool(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ScreenError> for AppError {
    fn from(err: ScreenError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
