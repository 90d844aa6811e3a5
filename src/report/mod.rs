//! Reporting utilities: urgency ranking and formatted terminal output.

use std::cmp::Ordering;

use crate::decision::DecisionMatrix;
use crate::domain::DecisionRecord;

pub mod format;

pub use format::*;

/// The `top_n` most urgent records: priority first, then lowest FoS (unresolved
/// first), then highest axial stress.
pub fn most_urgent(matrix: &DecisionMatrix, top_n: usize) -> Vec<&DecisionRecord> {
    let mut sorted: Vec<&DecisionRecord> = matrix.records.iter().collect();
    sorted.sort_by(|a, b| {
        a.decision
            .priority
            .cmp(&b.decision.priority)
            .then_with(|| cmp_fos(a.stability.governing_fos(), b.stability.governing_fos()))
            .then_with(|| {
                let stress = |r: &DecisionRecord| r.stress.as_ref().map_or(0.0, |s| s.axial_stress);
                stress(b).partial_cmp(&stress(a)).unwrap_or(Ordering::Equal)
            })
    });
    sorted.truncate(top_n);
    sorted
}

fn cmp_fos(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::ResultAggregator;
    use crate::domain::{
        AnalysisType, SlopeConfiguration, SoilLayer, SoilScenario, StabilityAssessment, StabilityResult, TierId,
    };
    use std::sync::Arc;

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

    #[test]
    fn most_urgent_orders_by_priority_then_fos() {
        let soil = Arc::new(SoilScenario::uniform(SoilLayer::new("clay", 120.0, 500.0, 100.0, 25.0, 50.0)));
        let slope = SlopeConfiguration::new(30.0, 40.0, 0.5, soil);
        let agg = ResultAggregator::default();
        agg.join(0, &slope, &assessment(Some(1.8)), Vec::new());
        agg.join(1, &slope, &assessment(Some(0.9)), Vec::new());
        agg.join(2, &slope, &assessment(None), Vec::new());
        agg.join(3, &slope, &assessment(Some(0.7)), Vec::new());
        let matrix = agg.finish(false);

        let top: Vec<usize> = most_urgent(&matrix, 3).iter().map(|r| r.slope_id).collect();
        assert_eq!(top, vec![2, 3, 1]);
        assert_eq!(most_urgent(&matrix, 10).len(), 4);
    }
}
