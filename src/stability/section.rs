//! 2-D cross-section of a slope configuration.
//!
//! Coordinates are in feet with the toe at the origin, `x` increasing towards the
//! crest and `y` upward:
//!
//! ```text
//!                 crest (run, H) ___________________  y = H
//!                         /
//!                        /  face at `angle`
//!  y = 0 _______________/ toe (0, 0)
//! ```
//!
//! Soil layers are horizontal, stacked downward from the crest elevation. The
//! phreatic line is horizontal at `H·(1 − groundwater_ratio)` and is clipped to the
//! ground surface where it would daylight.

use nalgebra::Point2;

use crate::domain::{SlopeConfiguration, SoilLayer, WATER_UNIT_WEIGHT_PCF};

#[derive(Debug, Clone, Copy)]
pub struct SlopeSection<'a> {
    slope: &'a SlopeConfiguration,
    run: f64,
}

impl<'a> SlopeSection<'a> {
    pub fn new(slope: &'a SlopeConfiguration) -> Self {
        Self {
            slope,
            run: slope.face_run(),
        }
    }

    pub fn height(&self) -> f64 {
        self.slope.height
    }

    /// Horizontal length of the face.
    pub fn run(&self) -> f64 {
        self.run
    }

    pub fn toe(&self) -> Point2<f64> {
        Point2::origin()
    }

    /// Ground surface elevation at `x`.
    pub fn ground(&self, x: f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else if x >= self.run {
            self.slope.height
        } else {
            x * self.slope.height / self.run
        }
    }

    /// Phreatic surface elevation at `x`.
    pub fn water_table(&self, x: f64) -> f64 {
        self.slope.phreatic_elevation().min(self.ground(x))
    }

    /// Pore water pressure (psf) at a point below the ground surface.
    pub fn pore_pressure(&self, p: Point2<f64>) -> f64 {
        WATER_UNIT_WEIGHT_PCF * (self.water_table(p.x) - p.y).max(0.0)
    }

    /// Soil layer at elevation `y`.
    pub fn layer_at(&self, y: f64) -> &'a SoilLayer {
        self.slope.soil.layer_at_depth(self.slope.height - y)
    }

    /// Weight (lb per ft of slope) of a vertical soil column of `width` at `x`,
    /// from `base` up to the ground surface.
    pub fn column_weight(&self, x: f64, base: f64, width: f64) -> f64 {
        let surface = self.ground(x);
        if surface <= base {
            return 0.0;
        }

        let layers = &self.slope.soil.layers;
        let mut top = self.slope.height;
        let mut weight = 0.0;
        for (i, layer) in layers.iter().enumerate() {
            let bottom = if i + 1 == layers.len() {
                f64::NEG_INFINITY
            } else {
                top - layer.thickness
            };
            let overlap = surface.min(top) - base.max(bottom);
            if overlap > 0.0 {
                weight += layer.unit_weight * overlap;
            }
            if bottom <= base {
                break;
            }
            top = bottom;
        }
        weight * width
    }
}
