//! Output-side domain types: stability and stress outcomes, decisions, records.

use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisType, PipeConfiguration, SlopeConfiguration, TierId};

/// Outcome of one stability analysis (total or effective stress).
///
/// `factor_of_safety` is `None` when every solver tier failed; such a result must
/// never be read as a passing FoS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityResult {
    pub analysis_type: AnalysisType,
    pub factor_of_safety: Option<f64>,
    pub method_used: Option<TierId>,
    pub unresolved_reason: Option<String>,
}

impl StabilityResult {
    pub fn resolved(analysis_type: AnalysisType, factor_of_safety: f64, method: TierId) -> Self {
        Self {
            analysis_type,
            factor_of_safety: Some(factor_of_safety),
            method_used: Some(method),
            unresolved_reason: None,
        }
    }

    pub fn unresolved(analysis_type: AnalysisType, reason: impl Into<String>) -> Self {
        Self {
            analysis_type,
            factor_of_safety: None,
            method_used: None,
            unresolved_reason: Some(reason.into()),
        }
    }
}

/// Both stability analyses for one slope configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityAssessment {
    pub total: StabilityResult,
    pub effective: StabilityResult,
}

impl StabilityAssessment {
    /// The more conservative resolved FoS, or the only resolved one.
    pub fn governing_fos(&self) -> Option<f64> {
        match (self.total.factor_of_safety, self.effective.factor_of_safety) {
            (Some(t), Some(e)) => Some(t.min(e)),
            (Some(t), None) => Some(t),
            (None, Some(e)) => Some(e),
            (None, None) => None,
        }
    }
}

/// Soil-pipe interaction outcome for one pipe in one soil profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    /// Soil resistance per unit length (lb/ft).
    pub longitudinal_force: f64,
    /// Axial stress over the configured PGD length (psi).
    pub axial_stress: f64,
    /// Pressure-induced hoop stress (psi).
    pub hoop_stress: f64,
    /// 72% of SMYS (psi).
    pub allowable_stress: f64,
    /// Allowable left after longitudinal pressure stress (psi).
    pub remaining_allowable_stress: f64,
    /// PGD length at which axial stress reaches the remaining allowable (ft).
    /// Infinite when the soil exerts no force; serialized as `null`.
    #[serde(with = "unbounded")]
    pub max_allowable_length: f64,
    pub exceeds: bool,
    /// Layer that produced the governing soil force.
    pub governing_layer: String,
}

/// Action-priority tier. Lower number is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Critical, Priority::High, Priority::Medium, Priority::Low];

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn timeline(self) -> &'static str {
        match self {
            Priority::Critical => "Immediate (0-7 days)",
            Priority::High => "Short-term (1-4 weeks)",
            Priority::Medium => "Medium-term (1-3 months)",
            Priority::Low => "Long-term (6-12 months)",
        }
    }

    pub fn cost_band(self) -> &'static str {
        match self {
            Priority::Critical => "$50,000 - $200,000",
            Priority::High => "$20,000 - $75,000",
            Priority::Medium => "$10,000 - $30,000",
            Priority::Low => "$5,000 - $15,000",
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            Priority::Critical => "Immediate detailed geotechnical analysis and design review",
            Priority::High => "Detailed analysis within 30 days, consider design modifications",
            Priority::Medium => "Engineering evaluation within 60 days",
            Priority::Low => "Routine monitoring and periodic review",
        }
    }
}

/// Five-band risk rating reported next to the priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::VeryHigh => "VERY HIGH",
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
            RiskLevel::VeryLow => "VERY LOW",
        }
    }
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub priority: Priority,
    pub recommended_timeline: String,
    pub estimated_cost_band: String,
    pub recommended_action: String,
    pub risk_level: RiskLevel,
    /// Set when stability could not be resolved by any tier.
    pub manual_review: bool,
    /// Set when a stress exceedance overrode the FoS-based tier.
    pub escalated_by_stress: bool,
}

/// What a record says about the pipe stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordNote {
    /// Pipe stress was evaluated.
    Evaluated,
    /// FoS alone settles the case.
    NoDetailRequired,
    /// Detail was needed but no pipe evaluation succeeded.
    PipeAnalysisUnavailable,
}

impl RecordNote {
    pub fn label(self) -> &'static str {
        match self {
            RecordNote::Evaluated => "pipe stress evaluated",
            RecordNote::NoDetailRequired => "no detailed pipe analysis required",
            RecordNote::PipeAnalysisUnavailable => "pipe analysis unavailable",
        }
    }
}

/// One row of the decision matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub slope_id: usize,
    pub slope: SlopeConfiguration,
    pub pipe_id: Option<usize>,
    pub pipe: Option<PipeConfiguration>,
    pub stability: StabilityAssessment,
    pub stress: Option<StressResult>,
    pub decision: Decision,
    pub note: RecordNote,
}

/// A pipe evaluation that failed and was left out of the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEvaluation {
    pub slope_id: usize,
    pub pipe_id: usize,
    pub pipe: PipeConfiguration,
    pub reason: String,
}

/// `f64` where infinity round-trips through JSON as `null`.
mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
