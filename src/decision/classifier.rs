//! Priority classification from factor of safety and pipe stress.

use crate::domain::{Decision, Priority, RiskLevel, StabilityAssessment, StressResult};

/// Lower bounds (inclusive) of the High, Medium and Low tiers.
pub const HIGH_FOS: f64 = 1.0;
pub const MEDIUM_FOS: f64 = 1.2;
pub const LOW_FOS: f64 = 1.5;
/// Lower bound (inclusive) of the very-low risk band.
pub const VERY_LOW_RISK_FOS: f64 = 2.0;

/// Priority for a resolved factor of safety.
pub fn priority_for_fos(fos: f64) -> Priority {
    // Written so NaN falls to Critical.
    if !(fos >= HIGH_FOS) {
        Priority::Critical
    } else if fos < MEDIUM_FOS {
        Priority::High
    } else if fos < LOW_FOS {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Risk band for a governing FoS; unresolved stability or an exceedance is very high.
pub fn risk_level(fos: Option<f64>, exceeds: bool) -> RiskLevel {
    match fos {
        Some(fos) if !exceeds && fos >= HIGH_FOS => {
            if fos < MEDIUM_FOS {
                RiskLevel::High
            } else if fos < LOW_FOS {
                RiskLevel::Medium
            } else if fos < VERY_LOW_RISK_FOS {
                RiskLevel::Low
            } else {
                RiskLevel::VeryLow
            }
        }
        _ => RiskLevel::VeryHigh,
    }
}

/// Classify one slope/pipe case.
///
/// Uses the governing (lower) resolved FoS. A stress exceedance always escalates
/// to Critical; an unresolved assessment is Critical and flagged for manual review.
pub fn classify(stability: &StabilityAssessment, stress: Option<&StressResult>) -> Decision {
    let (mut priority, manual_review) = match stability.governing_fos() {
        Some(fos) => (priority_for_fos(fos), false),
        None => (Priority::Critical, true),
    };

    let exceeds = stress.is_some_and(|s| s.exceeds);
    let mut escalated_by_stress = false;
    if exceeds && priority != Priority::Critical {
        priority = Priority::Critical;
        escalated_by_stress = true;
    }

    Decision {
        priority,
        recommended_timeline: priority.timeline().to_string(),
        estimated_cost_band: priority.cost_band().to_string(),
        recommended_action: priority.action().to_string(),
        risk_level: risk_level(stability.governing_fos(), exceeds),
        manual_review,
        escalated_by_stress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisType, StabilityResult, TierId};

    fn assessment(total: Option<f64>, effective: Option<f64>) -> StabilityAssessment {
        let make = |analysis, fos: Option<f64>| match fos {
            Some(v) => StabilityResult::resolved(analysis, v, TierId::CulmannWedge),
            None => StabilityResult::unresolved(analysis, "exhausted"),
        };
        StabilityAssessment {
            total: make(AnalysisType::TotalStress, total),
            effective: make(AnalysisType::EffectiveStress, effective),
        }
    }

    fn stress(exceeds: bool) -> StressResult {
        StressResult {
            longitudinal_force: 1000.0,
            axial_stress: if exceeds { 20_000.0 } else { 500.0 },
            hoop_stress: 30_000.0,
            allowable_stress: 30_240.0,
            remaining_allowable_stress: 15_240.0,
            max_allowable_length: 100.0,
            exceeds,
            governing_layer: "clay".to_string(),
        }
    }

    #[test]
    fn thresholds_are_inclusive_on_the_lower_urgency_side() {
        assert_eq!(priority_for_fos(0.999), Priority::Critical);
        assert_eq!(priority_for_fos(1.0), Priority::High);
        assert_eq!(priority_for_fos(1.2), Priority::Medium);
        assert_eq!(priority_for_fos(1.4999), Priority::Medium);
        assert_eq!(priority_for_fos(1.5), Priority::Low);
        assert_eq!(priority_for_fos(f64::NAN), Priority::Critical);
    }

    #[test]
    fn governing_fos_is_the_lower_of_both_analyses() {
        let d = classify(&assessment(Some(1.8), Some(1.1)), None);
        assert_eq!(d.priority, Priority::High);
        assert_eq!(d.recommended_timeline, "Short-term (1-4 weeks)");
        assert_eq!(d.estimated_cost_band, "$20,000 - $75,000");

        let one_sided = classify(&assessment(None, Some(1.3)), None);
        assert_eq!(one_sided.priority, Priority::Medium);
        assert!(!one_sided.manual_review);
    }

    #[test]
    fn risk_bands_split_low_priority_at_two() {
        assert_eq!(risk_level(Some(0.95), false), RiskLevel::VeryHigh);
        assert_eq!(risk_level(Some(1.0), false), RiskLevel::High);
        assert_eq!(risk_level(Some(1.2), false), RiskLevel::Medium);
        assert_eq!(risk_level(Some(1.5), false), RiskLevel::Low);
        assert_eq!(risk_level(Some(1.999), false), RiskLevel::Low);
        assert_eq!(risk_level(Some(2.0), false), RiskLevel::VeryLow);
        assert_eq!(risk_level(Some(3.0), true), RiskLevel::VeryHigh);
        assert_eq!(risk_level(None, false), RiskLevel::VeryHigh);

        let d = classify(&assessment(Some(2.4), Some(1.7)), None);
        assert_eq!(d.priority, Priority::Low);
        assert_eq!(d.risk_level, RiskLevel::Low);
        assert_eq!(d.risk_level.label(), "LOW");
    }

    #[test]
    fn stress_exceedance_escalates_to_critical() {
        let d = classify(&assessment(Some(2.0), Some(1.6)), Some(&stress(true)));
        assert_eq!(d.priority, Priority::Critical);
        assert!(d.escalated_by_stress);

        let calm = classify(&assessment(Some(2.0), Some(1.6)), Some(&stress(false)));
        assert_eq!(calm.priority, Priority::Low);
        assert!(!calm.escalated_by_stress);
    }

    #[test]
    fn already_critical_is_not_marked_escalated() {
        let d = classify(&assessment(Some(0.8), Some(0.9)), Some(&stress(true)));
        assert_eq!(d.priority, Priority::Critical);
        assert!(!d.escalated_by_stress);
    }

    #[test]
    fn unresolved_stability_needs_manual_review() {
        let d = classify(&assessment(None, None), None);
        assert_eq!(d.priority, Priority::Critical);
        assert!(d.manual_review);
        assert_eq!(d.recommended_timeline, "Immediate (0-7 days)");
    }

    #[test]
    fn classification_is_pure() {
        let a = assessment(Some(1.25), Some(1.4));
        assert_eq!(classify(&a, Some(&stress(false))), classify(&a, Some(&stress(false))));
    }
}
