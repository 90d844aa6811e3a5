//! Bishop's simplified method of slices over a grid of trial circles.
//!
//! For each trial circle the sliding mass is cut into vertical slices and
//!
//! ```text
//! F = Σ [c·b + (W − u·b)·tanφ] / mα  /  Σ W·sinα,   mα = cosα + sinα·tanφ / F
//! ```
//!
//! is iterated to convergence. Total-stress analysis uses `φ = 0` and the undrained
//! cohesion, which makes the expression explicit. The reported FoS is the minimum
//! over the search grid.

use nalgebra::Point2;

use crate::domain::{AnalysisType, SlopeConfiguration, TierId};
use crate::error::ScreenError;
use crate::stability::section::SlopeSection;
use crate::stability::tier::StabilityTier;

const TOLERANCE: f64 = 1e-4;
const MAX_ITERATIONS: usize = 100;
/// Circles with a slice `mα` below this are numerically unreliable and skipped.
const MIN_M_ALPHA: f64 = 0.2;
const MIN_SLICES: usize = 3;

/// Trial-circle search grid.
#[derive(Debug, Clone)]
struct SearchGrid {
    centers_x: usize,
    centers_y: usize,
    /// Radius multipliers applied to the centre-to-toe distance.
    radius_factors: Vec<f64>,
    slices: usize,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            centers_x: 12,
            centers_y: 12,
            radius_factors: vec![1.0, 1.1, 1.25, 1.5],
            slices: 40,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BishopSimplifiedTier {
    grid: SearchGrid,
}

impl StabilityTier for BishopSimplifiedTier {
    fn id(&self) -> TierId {
        TierId::BishopSimplified
    }

    fn attempt(&self, slope: &SlopeConfiguration, analysis: AnalysisType) -> Result<f64, ScreenError> {
        let section = SlopeSection::new(slope);
        let run = section.run();
        let height = section.height();
        if !(run.is_finite() && height > 0.0) {
            return Err(ScreenError::unavailable(self.id(), "degenerate slope geometry"));
        }

        let span = run + height;
        let (x_lo, x_hi) = (-0.25 * span, run + 0.25 * span);
        let (y_lo, y_hi) = (0.75 * height, height + 0.75 * span);

        let mut best: Option<f64> = None;
        for i in 0..self.grid.centers_x {
            let xc = lerp(x_lo, x_hi, i, self.grid.centers_x);
            for j in 0..self.grid.centers_y {
                let yc = lerp(y_lo, y_hi, j, self.grid.centers_y);
                let center = Point2::new(xc, yc);
                let to_toe = (center - section.toe()).norm();
                for &factor in &self.grid.radius_factors {
                    let radius = to_toe * factor;
                    if let Some(fos) = circle_fos(&section, center, radius, self.grid.slices, analysis) {
                        if best.is_none_or(|b| fos < b) {
                            best = Some(fos);
                        }
                    }
                }
            }
        }

        best.ok_or_else(|| ScreenError::unavailable(self.id(), "no admissible slip circle in search grid"))
    }
}

/// Evenly spaced value `i` of `n` over `[lo, hi]`.
fn lerp(lo: f64, hi: f64, i: usize, n: usize) -> f64 {
    if n < 2 {
        return (lo + hi) / 2.0;
    }
    lo + (hi - lo) * i as f64 / (n - 1) as f64
}

struct Slice {
    width: f64,
    weight: f64,
    sin_a: f64,
    cos_a: f64,
    cohesion: f64,
    tan_phi: f64,
    pore_pressure: f64,
}

fn circle_fos(
    section: &SlopeSection<'_>,
    center: Point2<f64>,
    radius: f64,
    n_slices: usize,
    analysis: AnalysisType,
) -> Option<f64> {
    if !(radius.is_finite() && radius > 0.0) || n_slices == 0 {
        return None;
    }

    let width = 2.0 * radius / n_slices as f64;
    let mut slices = Vec::with_capacity(n_slices);
    for k in 0..n_slices {
        let x = center.x - radius + width * (k as f64 + 0.5);
        let dx = x - center.x;
        let base = center.y - (radius * radius - dx * dx).sqrt();
        if section.ground(x) - base <= 0.0 {
            continue;
        }

        let sin_a = dx / radius;
        let cos_a = (1.0 - sin_a * sin_a).sqrt();
        let layer = section.layer_at(base);
        let (cohesion, tan_phi, pore_pressure) = match analysis {
            AnalysisType::TotalStress => (layer.cohesion_total, 0.0, 0.0),
            AnalysisType::EffectiveStress => (
                layer.cohesion_effective,
                layer.friction_angle.to_radians().tan(),
                section.pore_pressure(Point2::new(x, base)),
            ),
        };
        slices.push(Slice {
            width,
            weight: section.column_weight(x, base, width),
            sin_a,
            cos_a,
            cohesion,
            tan_phi,
            pore_pressure,
        });
    }

    if slices.len() < MIN_SLICES {
        return None;
    }

    let driving: f64 = slices.iter().map(|s| s.weight * s.sin_a).sum();
    if !(driving.is_finite() && driving > 1e-9) {
        return None;
    }

    let mut fos = 1.0;
    for _ in 0..MAX_ITERATIONS {
        let mut resisting = 0.0;
        for s in &slices {
            let m_alpha = s.cos_a + s.sin_a * s.tan_phi / fos;
            if m_alpha < MIN_M_ALPHA {
                return None;
            }
            let effective_weight = (s.weight - s.pore_pressure * s.width).max(0.0);
            resisting += (s.cohesion * s.width + effective_weight * s.tan_phi) / m_alpha;
        }
        let next = resisting / driving;
        if !next.is_finite() {
            return None;
        }
        if (next - fos).abs() < TOLERANCE {
            return Some(next);
        }
        // A zero-strength mass has no meaningful iterate; it simply fails.
        if next <= 0.0 {
            return Some(0.0);
        }
        fos = next;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SoilLayer, SoilScenario};
    use std::sync::Arc;

    fn uniform(angle: f64, height: f64, ratio: f64, c_total: f64, c_eff: f64, phi: f64) -> SlopeConfiguration {
        let soil = SoilScenario::uniform(SoilLayer::new("clay", 120.0, c_total, c_eff, phi, 100.0));
        SlopeConfiguration::new(angle, height, ratio, Arc::new(soil))
    }

    #[test]
    fn stronger_soil_is_more_stable() {
        let tier = BishopSimplifiedTier::default();
        let weak = tier
            .attempt(&uniform(30.0, 40.0, 1.0, 300.0, 50.0, 20.0), AnalysisType::EffectiveStress)
            .unwrap();
        let strong = tier
            .attempt(&uniform(30.0, 40.0, 1.0, 300.0, 200.0, 35.0), AnalysisType::EffectiveStress)
            .unwrap();
        assert!(strong > weak, "strong={strong} weak={weak}");
    }

    #[test]
    fn steeper_slope_is_less_stable_in_total_stress() {
        let tier = BishopSimplifiedTier::default();
        let gentle = tier
            .attempt(&uniform(20.0, 40.0, 1.0, 800.0, 0.0, 0.0), AnalysisType::TotalStress)
            .unwrap();
        let steep = tier
            .attempt(&uniform(60.0, 40.0, 1.0, 800.0, 0.0, 0.0), AnalysisType::TotalStress)
            .unwrap();
        assert!(steep < gentle, "steep={steep} gentle={gentle}");
    }

    #[test]
    fn higher_water_table_reduces_effective_fos() {
        let tier = BishopSimplifiedTier::default();
        let dry = tier
            .attempt(&uniform(30.0, 40.0, 1.0, 0.0, 100.0, 30.0), AnalysisType::EffectiveStress)
            .unwrap();
        let wet = tier
            .attempt(&uniform(30.0, 40.0, 0.1, 0.0, 100.0, 30.0), AnalysisType::EffectiveStress)
            .unwrap();
        assert!(wet < dry, "wet={wet} dry={dry}");
    }

    #[test]
    fn cohesionless_slope_is_not_below_infinite_slope_bound() {
        let tier = BishopSimplifiedTier::default();
        let fos = tier
            .attempt(&uniform(20.0, 30.0, 1.0, 0.0, 0.0, 30.0), AnalysisType::EffectiveStress)
            .unwrap();
        let infinite_slope = 30f64.to_radians().tan() / 20f64.to_radians().tan();
        assert!(fos > 0.95 * infinite_slope && fos < 2.0 * infinite_slope, "fos={fos}");
    }

    #[test]
    fn search_is_deterministic() {
        let tier = BishopSimplifiedTier::default();
        let slope = uniform(35.0, 50.0, 0.7, 400.0, 150.0, 28.0);
        let a = tier.attempt(&slope, AnalysisType::EffectiveStress).unwrap();
        let b = tier.attempt(&slope, AnalysisType::EffectiveStress).unwrap();
        assert_eq!(a, b);
    }
}
