//! Soil-pipe interaction: soil force per unit length and the resulting pipe stress.
//!
//! The force model is a trait so the stress derivation can be exercised with any
//! soil-spring formulation. [`AlaSoilSprings`] is the default.

use std::f64::consts::PI;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{PgdPath, PipeConfiguration, SlopeConfiguration, SoilLayer, StressResult};
use crate::error::ScreenError;
use crate::springs::factors::{
    adhesion_factor, at_rest_coefficient, horizontal_bearing_clay, horizontal_bearing_sand,
};

/// Fraction of SMYS available to combined longitudinal stress.
pub const ALLOWABLE_FRACTION: f64 = 0.72;

/// Soil resistance per unit pipe length for one layer.
pub trait SoilForceModel: Send + Sync {
    /// Force in lb/ft.
    fn soil_force(&self, layer: &SoilLayer, pipe: &PipeConfiguration) -> Result<f64, ScreenError>;
}

/// ALA (2001) axial and lateral soil springs.
///
/// - parallel: `π·D·α·c + π·D·H·γ·((1 + K0)/2)·tan(f·φ)`
/// - perpendicular: `Nch·c·D + Nqh·γ·H·D`
///
/// with `H` the centreline depth, `D` the diameter (ft) and `f` the coating
/// roughness. Drained strength (`c'`, `φ'`) is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlaSoilSprings;

impl SoilForceModel for AlaSoilSprings {
    fn soil_force(&self, layer: &SoilLayer, pipe: &PipeConfiguration) -> Result<f64, ScreenError> {
        let d = pipe.diameter_ft();
        let h = pipe.centerline_depth();
        let c = layer.cohesion_effective;
        let gamma = layer.unit_weight;
        let phi = layer.friction_angle;

        let force = match pipe.pgd_path {
            PgdPath::Parallel => {
                let k0 = at_rest_coefficient(phi);
                let interface = (pipe.coating.roughness() * phi).to_radians().tan();
                PI * d * adhesion_factor(c) * c + PI * d * h * gamma * ((1.0 + k0) / 2.0) * interface
            }
            PgdPath::Perpendicular => {
                let x = h / d;
                horizontal_bearing_clay(x) * c * d + horizontal_bearing_sand(phi, x) * gamma * h * d
            }
        };

        if force.is_finite() && force >= 0.0 {
            Ok(force)
        } else {
            Err(ScreenError::StressComputation(format!(
                "non-physical soil force {force} in layer '{}'",
                layer.name
            )))
        }
    }
}

/// Longitudinal stress check for a pipe in a slope's soil profile.
#[derive(Clone)]
pub struct SoilPipeInteractionCalculator {
    model: Arc<dyn SoilForceModel>,
}

impl Default for SoilPipeInteractionCalculator {
    fn default() -> Self {
        Self::new(Arc::new(AlaSoilSprings))
    }
}

impl SoilPipeInteractionCalculator {
    pub fn new(model: Arc<dyn SoilForceModel>) -> Self {
        Self { model }
    }

    /// Evaluate every layer from the crest down to the pipe centreline; the largest
    /// force governs.
    pub fn evaluate(&self, slope: &SlopeConfiguration, pipe: &PipeConfiguration) -> Result<StressResult, ScreenError> {
        pipe.validate().map_err(ScreenError::StressComputation)?;

        let mut governing: Option<(f64, &SoilLayer)> = None;
        for layer in slope.soil.layers_above(pipe.centerline_depth()) {
            let force = self.model.soil_force(layer, pipe)?;
            if governing.is_none_or(|(best, _)| force > best) {
                governing = Some((force, layer));
            }
        }
        let (force, layer) = governing.ok_or_else(|| {
            ScreenError::StressComputation(format!("soil scenario '{}' has no layers", slope.soil.name))
        })?;

        let result = stress_from_force(force, pipe, &layer.name)?;
        debug!(
            soil = %slope.soil.name,
            layer = %layer.name,
            force,
            axial = result.axial_stress,
            exceeds = result.exceeds,
            "pipe stress evaluated"
        );
        Ok(result)
    }
}

/// Derive pipe stresses from a soil force (lb/ft).
pub fn stress_from_force(force: f64, pipe: &PipeConfiguration, layer: &str) -> Result<StressResult, ScreenError> {
    let od = pipe.outside_diameter;
    let t = pipe.wall_thickness;
    if !(od > 0.0 && t > 0.0 && t < od / 2.0) {
        return Err(ScreenError::StressComputation(format!(
            "degenerate pipe section: OD {od} in, wall {t} in"
        )));
    }

    let area = PI * (od - t) * t;
    let hoop_stress = pipe.internal_pressure * od / (2.0 * t);
    let axial_stress = force * pipe.pgd_length / area;
    let allowable_stress = ALLOWABLE_FRACTION * pipe.smys();
    let remaining_allowable_stress = (allowable_stress - hoop_stress / 2.0).max(0.0);
    let max_allowable_length = if force > 0.0 {
        remaining_allowable_stress * area / force
    } else {
        f64::INFINITY
    };

    if !(axial_stress.is_finite() && hoop_stress.is_finite()) {
        return Err(ScreenError::StressComputation(format!(
            "non-finite stress for force {force} lb/ft over {} ft",
            pipe.pgd_length
        )));
    }

    Ok(StressResult {
        longitudinal_force: force,
        axial_stress,
        hoop_stress,
        allowable_stress,
        remaining_allowable_stress,
        max_allowable_length,
        exceeds: axial_stress > remaining_allowable_stress,
        governing_layer: layer.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coating, PipeGrade, SoilScenario};

    fn fat_clay() -> SlopeConfiguration {
        let soil = SoilScenario::uniform(SoilLayer::new("Stiff Fat Clay", 120.0, 1500.0, 100.0, 26.0, 60.0));
        SlopeConfiguration::new(30.0, 40.0, 0.5, Arc::new(soil))
    }

    fn pipe(doc: f64, length: f64, path: PgdPath) -> PipeConfiguration {
        PipeConfiguration {
            outside_diameter: 16.0,
            wall_thickness: 0.375,
            grade: PipeGrade::X42,
            depth_of_cover: doc,
            coating: Coating::FusionBondedEpoxy,
            internal_pressure: 1500.0,
            pgd_length: length,
            pgd_path: path,
        }
    }

    #[test]
    fn reference_scenario_shallow_short_zone_passes() {
        let calc = SoilPipeInteractionCalculator::default();
        for path in [PgdPath::Parallel, PgdPath::Perpendicular] {
            let r = calc.evaluate(&fat_clay(), &pipe(1.0, 10.0, path)).unwrap();
            assert!((r.allowable_stress - 30_240.0).abs() < 1e-9);
            assert!((r.hoop_stress - 32_000.0).abs() < 1e-9);
            assert!((r.remaining_allowable_stress - 14_240.0).abs() < 1e-9);
            assert!(!r.exceeds, "{path:?}: axial {}", r.axial_stress);
        }
        let parallel = calc.evaluate(&fat_clay(), &pipe(1.0, 10.0, PgdPath::Parallel)).unwrap();
        assert!((parallel.axial_stress - 326.77).abs() < 0.1, "{}", parallel.axial_stress);
        assert_eq!(parallel.governing_layer, "Stiff Fat Clay");
    }

    #[test]
    fn reference_scenario_deep_long_zone_exceeds() {
        let calc = SoilPipeInteractionCalculator::default();
        for path in [PgdPath::Parallel, PgdPath::Perpendicular] {
            let r = calc.evaluate(&fat_clay(), &pipe(25.0, 100.0, path)).unwrap();
            assert!(r.exceeds, "{path:?}: axial {}", r.axial_stress);
            assert!(r.max_allowable_length < 100.0);
        }
    }

    #[test]
    fn stress_is_monotone_in_cover_and_length() {
        let calc = SoilPipeInteractionCalculator::default();
        for path in [PgdPath::Parallel, PgdPath::Perpendicular] {
            let mut last = 0.0;
            for doc in [1.0, 2.0, 4.0, 8.0, 15.0, 25.0, 40.0, 60.0] {
                let r = calc.evaluate(&fat_clay(), &pipe(doc, 50.0, path)).unwrap();
                assert!(r.axial_stress >= last, "{path:?} doc={doc}");
                last = r.axial_stress;
            }
            let short = calc.evaluate(&fat_clay(), &pipe(8.0, 10.0, path)).unwrap();
            let long = calc.evaluate(&fat_clay(), &pipe(8.0, 30.0, path)).unwrap();
            assert!((long.axial_stress - 3.0 * short.axial_stress).abs() < 1e-6);
        }
    }

    #[test]
    fn stress_is_monotone_in_friction_angle() {
        let calc = SoilPipeInteractionCalculator::default();
        for path in [PgdPath::Parallel, PgdPath::Perpendicular] {
            let mut last = 0.0;
            for phi in [0.0, 10.0, 20.0, 26.0, 32.0, 38.0, 45.0] {
                let soil = SoilScenario::uniform(SoilLayer::new("sand", 120.0, 0.0, 50.0, phi, 60.0));
                let slope = SlopeConfiguration::new(30.0, 40.0, 0.5, Arc::new(soil));
                let r = calc.evaluate(&slope, &pipe(8.0, 50.0, path)).unwrap();
                assert!(r.axial_stress >= last, "{path:?} phi={phi}");
                last = r.axial_stress;
            }
        }
    }

    #[test]
    fn strongest_layer_above_centreline_governs() {
        let soil = SoilScenario::new(
            "layered",
            vec![
                SoilLayer::new("stiff crust", 125.0, 2000.0, 400.0, 34.0, 5.0),
                SoilLayer::new("soft clay", 105.0, 300.0, 20.0, 18.0, 50.0),
            ],
        );
        let slope = SlopeConfiguration::new(30.0, 40.0, 0.5, Arc::new(soil));
        let calc = SoilPipeInteractionCalculator::default();
        let r = calc.evaluate(&slope, &pipe(10.0, 50.0, PgdPath::Parallel)).unwrap();
        assert_eq!(r.governing_layer, "stiff crust");
    }

    #[test]
    fn zero_force_allows_unbounded_length() {
        let p = pipe(4.0, 50.0, PgdPath::Parallel);
        let r = stress_from_force(0.0, &p, "none").unwrap();
        assert_eq!(r.axial_stress, 0.0);
        assert!(r.max_allowable_length.is_infinite());
        assert!(!r.exceeds);
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let mut p = pipe(4.0, 50.0, PgdPath::Parallel);
        p.wall_thickness = 8.0;
        let err = SoilPipeInteractionCalculator::default().evaluate(&fat_clay(), &p).unwrap_err();
        assert!(matches!(err, ScreenError::StressComputation(_)));
        assert!(stress_from_force(100.0, &p, "x").is_err());
    }
}
