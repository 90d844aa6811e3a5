//! Culmann planar wedge through the toe.
//!
//! A trial plane leaves the toe at `θ < β` and exits on the crest at `x = H / tanθ`.
//! For the wedge above it
//!
//! ```text
//! F(θ) = [c̄·L + (W·cosθ − U)·tan φ̄] / (W·sinθ)
//! ```
//!
//! with `L = H / sinθ`, strength averaged along the plane by layer and `U` the
//! pore force on the plane. `F` is minimised over `θ` in half-degree steps.

use nalgebra::Point2;

use crate::domain::{AnalysisType, SlopeConfiguration, TierId};
use crate::error::ScreenError;
use crate::stability::section::SlopeSection;
use crate::stability::tier::StabilityTier;

const STEP_DEG: f64 = 0.5;
/// Integration strips on each side of the crest break.
const STRIPS: usize = 24;

#[derive(Debug, Clone, Copy, Default)]
pub struct CulmannWedgeTier;

impl StabilityTier for CulmannWedgeTier {
    fn id(&self) -> TierId {
        TierId::CulmannWedge
    }

    fn attempt(&self, slope: &SlopeConfiguration, analysis: AnalysisType) -> Result<f64, ScreenError> {
        let section = SlopeSection::new(slope);
        if !(section.run().is_finite() && section.height() > 0.0) {
            return Err(ScreenError::unavailable(self.id(), "degenerate slope geometry"));
        }

        let mut best: Option<f64> = None;
        let mut k = 1;
        loop {
            let theta = STEP_DEG * k as f64;
            if theta > slope.angle - STEP_DEG + 1e-9 {
                break;
            }
            if let Some(fos) = plane_fos(&section, theta.to_radians(), analysis) {
                if best.is_none_or(|b| fos < b) {
                    best = Some(fos);
                }
            }
            k += 1;
        }

        best.ok_or_else(|| ScreenError::unavailable(self.id(), "no admissible plane below the slope face"))
    }
}

fn plane_fos(section: &SlopeSection<'_>, theta: f64, analysis: AnalysisType) -> Option<f64> {
    let (sin_t, cos_t) = theta.sin_cos();
    let height = section.height();
    let exit = height / theta.tan();
    let run = section.run();
    if !(exit > run) {
        return None;
    }

    let mut weight = 0.0;
    let mut pore_force = 0.0;
    let mut cohesion_sum = 0.0;
    let mut tan_phi_sum = 0.0;
    let mut length = 0.0;

    // Midpoint rule on each linear piece of the ground profile; exact per layer.
    for (from, to) in [(0.0, run), (run, exit)] {
        let dx = (to - from) / STRIPS as f64;
        for i in 0..STRIPS {
            let x = from + dx * (i as f64 + 0.5);
            let base = x * theta.tan();
            let dl = dx / cos_t;
            weight += section.column_weight(x, base, dx);

            let layer = section.layer_at(base);
            let (c, tan_phi) = match analysis {
                AnalysisType::TotalStress => (layer.cohesion_total, 0.0),
                AnalysisType::EffectiveStress => {
                    pore_force += section.pore_pressure(Point2::new(x, base)) * dl;
                    (layer.cohesion_effective, layer.friction_angle.to_radians().tan())
                }
            };
            cohesion_sum += c * dl;
            tan_phi_sum += tan_phi * dl;
            length += dl;
        }
    }

    let driving = weight * sin_t;
    if !(driving.is_finite() && driving > 1e-9 && length > 0.0) {
        return None;
    }
    let cohesion = cohesion_sum / length;
    let tan_phi = tan_phi_sum / length;
    let normal = (weight * cos_t - pore_force).max(0.0);
    let fos = (cohesion * length + normal * tan_phi) / driving;
    fos.is_finite().then_some(fos)
}
