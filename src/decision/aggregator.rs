//! Joins stability and pipe outcomes into decision records.
//!
//! Workers call [`ResultAggregator::join`] once per slope configuration, in any
//! order; [`ResultAggregator::finish`] sorts by configuration identity so the final
//! matrix does not depend on scheduling.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::decision::classifier::classify;
use crate::domain::{
    DecisionRecord, PipeConfiguration, Priority, RecordNote, SkippedEvaluation, SlopeConfiguration,
    StabilityAssessment, StressResult, TierId,
};
use crate::error::ScreenError;

/// Slopes at or above this governing FoS skip the pipe stage.
pub const DEFAULT_DETAIL_FOS_THRESHOLD: f64 = 1.5;

/// One pipe evaluated against one slope.
#[derive(Debug, Clone)]
pub struct PipeOutcome {
    pub pipe_id: usize,
    pub pipe: PipeConfiguration,
    pub stress: Result<StressResult, ScreenError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub configurations_evaluated: usize,
    pub records: usize,
    /// Record counts indexed by `priority.level() - 1`.
    pub priority_counts: [usize; 4],
    pub exceeds: usize,
    pub manual_review: usize,
    pub skipped: usize,
    /// Slope configurations that needed the pipe stage.
    pub requiring_detail: usize,
    pub fos_min: Option<f64>,
    pub fos_max: Option<f64>,
    pub fos_mean: Option<f64>,
    /// How often each tier resolved an analysis.
    pub tier_usage: BTreeMap<TierId, usize>,
}

impl SummaryStats {
    pub fn count(&self, priority: Priority) -> usize {
        self.priority_counts[usize::from(priority.level() - 1)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMatrix {
    pub records: Vec<DecisionRecord>,
    pub skipped: Vec<SkippedEvaluation>,
    pub summary: SummaryStats,
    /// The run stopped before every configuration was evaluated.
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct Collected {
    records: Vec<DecisionRecord>,
    skipped: Vec<SkippedEvaluation>,
    configurations: usize,
    requiring_detail: usize,
    governing_fos: Vec<f64>,
    tier_usage: BTreeMap<TierId, usize>,
}

#[derive(Debug)]
pub struct ResultAggregator {
    detail_fos_threshold: f64,
    collected: Mutex<Collected>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_DETAIL_FOS_THRESHOLD)
    }
}

impl ResultAggregator {
    pub fn new(detail_fos_threshold: f64) -> Self {
        Self {
            detail_fos_threshold,
            collected: Mutex::new(Collected::default()),
        }
    }

    /// Whether pipes must be evaluated for this slope: unresolved or below threshold.
    pub fn requires_detail(&self, stability: &StabilityAssessment) -> bool {
        stability
            .governing_fos()
            .is_none_or(|fos| fos < self.detail_fos_threshold)
    }

    /// Record everything for one slope configuration in a single critical section.
    pub fn join(
        &self,
        slope_id: usize,
        slope: &SlopeConfiguration,
        stability: &StabilityAssessment,
        outcomes: Vec<PipeOutcome>,
    ) {
        let requires_detail = self.requires_detail(stability);
        let slope_only = |note: RecordNote| DecisionRecord {
            slope_id,
            slope: slope.clone(),
            pipe_id: None,
            pipe: None,
            stability: stability.clone(),
            stress: None,
            decision: classify(stability, None),
            note,
        };

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        if requires_detail {
            for outcome in outcomes {
                match outcome.stress {
                    Ok(stress) => records.push(DecisionRecord {
                        slope_id,
                        slope: slope.clone(),
                        pipe_id: Some(outcome.pipe_id),
                        pipe: Some(outcome.pipe),
                        stability: stability.clone(),
                        decision: classify(stability, Some(&stress)),
                        stress: Some(stress),
                        note: RecordNote::Evaluated,
                    }),
                    Err(err) => {
                        warn!(slope_id, pipe_id = outcome.pipe_id, "skipping pipe: {err}");
                        skipped.push(SkippedEvaluation {
                            slope_id,
                            pipe_id: outcome.pipe_id,
                            pipe: outcome.pipe,
                            reason: err.to_string(),
                        });
                    }
                }
            }
            if records.is_empty() {
                let priority = classify(stability, None).priority;
                records.push(slope_only(if priority.level() >= 3 {
                    RecordNote::NoDetailRequired
                } else {
                    RecordNote::PipeAnalysisUnavailable
                }));
            }
        } else {
            records.push(slope_only(RecordNote::NoDetailRequired));
        }

        let mut collected = self.lock();
        collected.configurations += 1;
        if requires_detail {
            collected.requiring_detail += 1;
        }
        if let Some(fos) = stability.governing_fos() {
            collected.governing_fos.push(fos);
        }
        for method in [stability.total.method_used, stability.effective.method_used].into_iter().flatten() {
            *collected.tier_usage.entry(method).or_insert(0) += 1;
        }
        collected.records.extend(records);
        collected.skipped.extend(skipped);
    }

    pub fn finish(self, cancelled: bool) -> DecisionMatrix {
        let mut collected = self.collected.into_inner().unwrap_or_else(PoisonError::into_inner);
        collected.records.sort_by_key(|r| (r.slope_id, r.pipe_id));
        collected.skipped.sort_by_key(|s| (s.slope_id, s.pipe_id));

        let mut summary = SummaryStats {
            configurations_evaluated: collected.configurations,
            records: collected.records.len(),
            skipped: collected.skipped.len(),
            requiring_detail: collected.requiring_detail,
            tier_usage: collected.tier_usage,
            ..SummaryStats::default()
        };
        for record in &collected.records {
            summary.priority_counts[usize::from(record.decision.priority.level() - 1)] += 1;
            if record.stress.as_ref().is_some_and(|s| s.exceeds) {
                summary.exceeds += 1;
            }
            if record.decision.manual_review {
                summary.manual_review += 1;
            }
        }
        let fos = &collected.governing_fos;
        if !fos.is_empty() {
            summary.fos_min = fos.iter().copied().reduce(f64::min);
            summary.fos_max = fos.iter().copied().reduce(f64::max);
            summary.fos_mean = Some(fos.iter().sum::<f64>() / fos.len() as f64);
        }

        DecisionMatrix {
            records: collected.records,
            skipped: collected.skipped,
            summary,
            cancelled,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Collected> {
        self.collected.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisType, Coating, PgdPath, PipeGrade, SoilLayer, SoilScenario, StabilityResult};
    use std::sync::Arc;

    fn slope(angle: f64) -> SlopeConfiguration {
        let soil = SoilScenario::uniform(SoilLayer::new("clay", 120.0, 800.0, 100.0, 26.0, 60.0));
        SlopeConfiguration::new(angle, 40.0, 0.5, Arc::new(soil))
    }

    fn assessment(fos: Option<f64>) -> StabilityAssessment {
        let make = |analysis| match fos {
            Some(v) => StabilityResult::resolved(analysis, v, TierId::BishopSimplified),
            None => StabilityResult::unresolved(analysis, "exhausted"),
        };
        StabilityAssessment {
            total: make(AnalysisType::TotalStress),
            effective: make(AnalysisType::EffectiveStress),
        }
    }

    fn pipe() -> PipeConfiguration {
        PipeConfiguration {
            outside_diameter: 24.0,
            wall_thickness: 0.5,
            grade: PipeGrade::X52,
            depth_of_cover: 8.0,
            coating: Coating::Concrete,
            internal_pressure: 1000.0,
            pgd_length: 30.0,
            pgd_path: PgdPath::Parallel,
        }
    }

    fn ok(pipe_id: usize, exceeds: bool) -> PipeOutcome {
        PipeOutcome {
            pipe_id,
            pipe: pipe(),
            stress: Ok(StressResult {
                longitudinal_force: 2000.0,
                axial_stress: if exceeds { 40_000.0 } else { 1_500.0 },
                hoop_stress: 24_000.0,
                allowable_stress: 37_440.0,
                remaining_allowable_stress: 25_440.0,
                max_allowable_length: 200.0,
                exceeds,
                governing_layer: "clay".to_string(),
            }),
        }
    }

    fn failed(pipe_id: usize) -> PipeOutcome {
        PipeOutcome {
            pipe_id,
            pipe: pipe(),
            stress: Err(ScreenError::StressComputation("degenerate".to_string())),
        }
    }

    #[test]
    fn stable_slope_yields_single_slope_record() {
        let agg = ResultAggregator::default();
        let stability = assessment(Some(1.5));
        assert!(!agg.requires_detail(&stability));
        agg.join(0, &slope(20.0), &stability, vec![ok(0, true)]);
        let matrix = agg.finish(false);
        assert_eq!(matrix.records.len(), 1);
        assert_eq!(matrix.records[0].pipe_id, None);
        assert_eq!(matrix.records[0].note, RecordNote::NoDetailRequired);
        assert_eq!(matrix.summary.count(Priority::Low), 1);
        assert_eq!(matrix.summary.requiring_detail, 0);
    }

    #[test]
    fn failed_pipe_only_removes_its_own_record() {
        let agg = ResultAggregator::default();
        agg.join(3, &slope(35.0), &assessment(Some(1.1)), vec![ok(0, false), failed(1), ok(2, true)]);
        let matrix = agg.finish(false);
        let ids: Vec<_> = matrix.records.iter().map(|r| r.pipe_id).collect();
        assert_eq!(ids, vec![Some(0), Some(2)]);
        assert_eq!(matrix.skipped.len(), 1);
        assert_eq!(matrix.skipped[0].pipe_id, 1);
        assert_eq!(matrix.summary.exceeds, 1);
        assert_eq!(matrix.summary.count(Priority::Critical), 1);
        assert_eq!(matrix.summary.count(Priority::High), 1);
    }

    #[test]
    fn all_pipes_failing_still_reports_the_slope() {
        let agg = ResultAggregator::default();
        agg.join(0, &slope(40.0), &assessment(Some(0.9)), vec![failed(0)]);
        agg.join(1, &slope(30.0), &assessment(Some(1.3)), vec![failed(0)]);
        let matrix = agg.finish(false);
        assert_eq!(matrix.records.len(), 2);
        assert_eq!(matrix.records[0].note, RecordNote::PipeAnalysisUnavailable);
        assert_eq!(matrix.records[1].note, RecordNote::NoDetailRequired);
        assert_eq!(matrix.summary.skipped, 2);
    }

    #[test]
    fn unresolved_slope_is_flagged_for_review() {
        let agg = ResultAggregator::default();
        agg.join(0, &slope(45.0), &assessment(None), vec![ok(0, false)]);
        let matrix = agg.finish(false);
        assert_eq!(matrix.summary.manual_review, 1);
        assert!(matrix.records[0].stability.governing_fos().is_none());
        assert_eq!(matrix.summary.fos_min, None);
        assert!(matrix.summary.tier_usage.is_empty());
    }

    #[test]
    fn finish_orders_by_identity_and_summarises() {
        let agg = ResultAggregator::default();
        agg.join(2, &slope(45.0), &assessment(Some(1.0)), vec![ok(1, false), ok(0, false)]);
        agg.join(0, &slope(15.0), &assessment(Some(2.5)), Vec::new());
        agg.join(1, &slope(30.0), &assessment(Some(1.6)), Vec::new());
        let matrix = agg.finish(true);
        let keys: Vec<_> = matrix.records.iter().map(|r| (r.slope_id, r.pipe_id)).collect();
        assert_eq!(keys, vec![(0, None), (1, None), (2, Some(0)), (2, Some(1))]);
        assert!(matrix.cancelled);
        let s = &matrix.summary;
        assert_eq!(s.configurations_evaluated, 3);
        assert_eq!(s.records, 4);
        assert_eq!(s.fos_min, Some(1.0));
        assert_eq!(s.fos_max, Some(2.5));
        assert!((s.fos_mean.unwrap() - 5.1 / 3.0).abs() < 1e-12);
        assert_eq!(s.tier_usage.get(&TierId::BishopSimplified), Some(&6));
    }
}
