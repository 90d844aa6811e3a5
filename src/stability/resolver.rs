//! Ordered tier fallback for factor-of-safety estimation.
//!
//! Each analysis type walks the tier list independently; the first tier that
//! yields a finite, non-negative FoS wins and is recorded on the result. Errors,
//! garbage values and panics inside a tier all move on to the next one. When the
//! list is exhausted the result is unresolved rather than defaulted.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{AnalysisType, SlopeConfiguration, SlopeKey, StabilityAssessment, StabilityResult, TierId};
use crate::error::ScreenError;
use crate::memo::Memo;
use crate::stability::bishop::BishopSimplifiedTier;
use crate::stability::external::ExternalSolverTier;
use crate::stability::tier::StabilityTier;
use crate::stability::wedge::CulmannWedgeTier;

pub struct StabilityResolver {
    tiers: Vec<Arc<dyn StabilityTier>>,
    cache: Memo<SlopeKey, StabilityAssessment>,
}

impl StabilityResolver {
    /// Keep the available candidates, in order. Availability is not re-checked later.
    pub fn new(candidates: Vec<Arc<dyn StabilityTier>>) -> Self {
        let tiers = candidates
            .into_iter()
            .filter(|tier| {
                let available = tier.is_available();
                if !available {
                    warn!(tier = %tier.id(), "solver tier not available; skipping");
                }
                available
            })
            .collect();
        Self {
            tiers,
            cache: Memo::new(),
        }
    }

    /// External command (if configured) → Bishop simplified → Culmann wedge.
    pub fn with_default_tiers(external: Option<ExternalSolverTier>) -> Self {
        let mut candidates: Vec<Arc<dyn StabilityTier>> = Vec::new();
        if let Some(tier) = external {
            candidates.push(Arc::new(tier));
        }
        candidates.push(Arc::new(BishopSimplifiedTier::default()));
        candidates.push(Arc::new(CulmannWedgeTier));
        Self::new(candidates)
    }

    pub fn tier_ids(&self) -> Vec<TierId> {
        self.tiers.iter().map(|t| t.id()).collect()
    }

    /// Number of memoized assessments.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn resolve(&self, slope: &SlopeConfiguration) -> StabilityAssessment {
        self.cache.get_or_insert_with(slope.key(), || StabilityAssessment {
            total: self.resolve_analysis(slope, AnalysisType::TotalStress),
            effective: self.resolve_analysis(slope, AnalysisType::EffectiveStress),
        })
    }

    pub fn resolve_analysis(&self, slope: &SlopeConfiguration, analysis: AnalysisType) -> StabilityResult {
        let mut failures = Vec::new();
        for tier in &self.tiers {
            match attempt_guarded(tier.as_ref(), slope, analysis) {
                Ok(fos) => {
                    debug!(tier = %tier.id(), %analysis, fos, "stability resolved");
                    return StabilityResult::resolved(analysis, fos, tier.id());
                }
                Err(err) => {
                    debug!(%analysis, "{err}");
                    failures.push(err.to_string());
                }
            }
        }

        let exhausted = ScreenError::AllSolversExhausted {
            analysis,
            attempted: self.tiers.len(),
        };
        warn!(
            angle = slope.angle,
            height = slope.height,
            groundwater_ratio = slope.groundwater_ratio,
            soil = %slope.soil.name,
            "{exhausted}"
        );
        let reason = if failures.is_empty() {
            exhausted.to_string()
        } else {
            format!("{exhausted}: {}", failures.join("; "))
        };
        StabilityResult::unresolved(analysis, reason)
    }
}

/// Run one tier, turning panics and non-physical values into `SolverUnavailable`.
fn attempt_guarded(
    tier: &dyn StabilityTier,
    slope: &SlopeConfiguration,
    analysis: AnalysisType,
) -> Result<f64, ScreenError> {
    let id = tier.id();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| tier.attempt(slope, analysis)))
        .map_err(|_| ScreenError::unavailable(id, "solver panicked"))?;
    let fos = outcome?;
    if fos.is_finite() && fos >= 0.0 {
        Ok(fos)
    } else {
        Err(ScreenError::unavailable(id, format!("non-physical factor of safety {fos}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SoilLayer, SoilScenario};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        id: TierId,
        fos: Option<f64>,
        available: bool,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(id: TierId, fos: Option<f64>) -> Self {
            Self {
                id,
                fos,
                available: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl StabilityTier for Fixed {
        fn id(&self) -> TierId {
            self.id
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn attempt(&self, _: &SlopeConfiguration, _: AnalysisType) -> Result<f64, ScreenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.fos.ok_or_else(|| ScreenError::unavailable(self.id, "no result"))
        }
    }

    struct Panicking;

    impl StabilityTier for Panicking {
        fn id(&self) -> TierId {
            TierId::ExternalSolver
        }

        fn attempt(&self, _: &SlopeConfiguration, _: AnalysisType) -> Result<f64, ScreenError> {
            panic!("solver blew up")
        }
    }

    fn slope() -> SlopeConfiguration {
        let soil = SoilScenario::uniform(SoilLayer::new("clay", 120.0, 600.0, 150.0, 28.0, 60.0));
        SlopeConfiguration::new(30.0, 40.0, 0.7, Arc::new(soil))
    }

    #[test]
    fn first_successful_tier_wins() {
        let resolver = StabilityResolver::new(vec![
            Arc::new(Fixed::new(TierId::ExternalSolver, None)),
            Arc::new(Fixed::new(TierId::BishopSimplified, Some(1.3))),
            Arc::new(Fixed::new(TierId::CulmannWedge, Some(0.9))),
        ]);
        let result = resolver.resolve_analysis(&slope(), AnalysisType::TotalStress);
        assert_eq!(result.factor_of_safety, Some(1.3));
        assert_eq!(result.method_used, Some(TierId::BishopSimplified));
    }

    #[test]
    fn unavailable_tiers_are_dropped_at_construction() {
        let mut external = Fixed::new(TierId::ExternalSolver, Some(2.0));
        external.available = false;
        let resolver = StabilityResolver::new(vec![
            Arc::new(external),
            Arc::new(Fixed::new(TierId::CulmannWedge, Some(1.1))),
        ]);
        assert_eq!(resolver.tier_ids(), vec![TierId::CulmannWedge]);
        let result = resolver.resolve_analysis(&slope(), AnalysisType::EffectiveStress);
        assert_eq!(result.method_used, Some(TierId::CulmannWedge));
    }

    #[test]
    fn panics_and_non_finite_values_fall_through() {
        let resolver = StabilityResolver::new(vec![
            Arc::new(Panicking),
            Arc::new(Fixed::new(TierId::BishopSimplified, Some(f64::NAN))),
            Arc::new(Fixed::new(TierId::CulmannWedge, Some(0.8))),
        ]);
        let result = resolver.resolve_analysis(&slope(), AnalysisType::TotalStress);
        assert_eq!(result.factor_of_safety, Some(0.8));
        assert_eq!(result.method_used, Some(TierId::CulmannWedge));
    }

    #[test]
    fn exhausted_tiers_leave_result_unresolved() {
        let resolver = StabilityResolver::new(vec![
            Arc::new(Fixed::new(TierId::BishopSimplified, None)),
            Arc::new(Fixed::new(TierId::CulmannWedge, Some(-1.0))),
        ]);
        let assessment = resolver.resolve(&slope());
        assert!(assessment.governing_fos().is_none());
        assert_eq!(assessment.total.method_used, None);
        let reason = assessment.effective.unresolved_reason.unwrap();
        assert!(reason.contains("All 2 solver tier(s) exhausted"), "{reason}");
        assert!(reason.contains("culmann-wedge"), "{reason}");
    }

    #[test]
    fn assessments_are_memoized_by_slope_value() {
        let tier = Arc::new(Fixed::new(TierId::BishopSimplified, Some(1.4)));
        let shared: Arc<dyn StabilityTier> = tier.clone();
        let resolver = StabilityResolver::new(vec![shared]);
        let a = resolver.resolve(&slope());
        let b = resolver.resolve(&slope());
        assert_eq!(a, b);
        assert_eq!(tier.calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cached(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn timed_out_external_solver_falls_through_to_wedge() {
        let external = ExternalSolverTier::new(
            "/bin/sh",
            vec!["-c".to_string(), "exec sleep 5".to_string()],
            std::time::Duration::from_millis(200),
        );
        let resolver = StabilityResolver::new(vec![Arc::new(external), Arc::new(CulmannWedgeTier)]);
        assert_eq!(resolver.tier_ids(), vec![TierId::ExternalSolver, TierId::CulmannWedge]);
        let started = std::time::Instant::now();
        let result = resolver.resolve_analysis(&slope(), AnalysisType::TotalStress);
        assert!(started.elapsed() < std::time::Duration::from_secs(3));
        assert_eq!(result.method_used, Some(TierId::CulmannWedge));
        assert!(result.factor_of_safety.is_some_and(|fos| fos > 0.0));
    }

    #[test]
    fn default_tiers_resolve_a_real_slope_deterministically() {
        let resolver = StabilityResolver::with_default_tiers(None);
        assert_eq!(resolver.tier_ids(), vec![TierId::BishopSimplified, TierId::CulmannWedge]);
        let first = resolver.resolve_analysis(&slope(), AnalysisType::EffectiveStress);
        let second = resolver.resolve_analysis(&slope(), AnalysisType::EffectiveStress);
        assert_eq!(first, second);
        assert_eq!(first.method_used, Some(TierId::BishopSimplified));
    }
}
