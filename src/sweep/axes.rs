//! Parameter axes for a screening study.
//!
//! `ScreenParameters` is the fully typed input the engine consumes. It is usually
//! loaded from JSON (`io::params`) or taken from [`ScreenParameters::default`],
//! which reproduces the standard parametric study.

use serde::{Deserialize, Serialize};

use crate::domain::{Coating, PgdPath, PipeGrade, SoilLayer, SoilScenario};
use crate::error::ScreenError;

/// Practical slope angle range (degrees); values outside it are allowed but logged.
pub const PRACTICAL_ANGLE_RANGE: (f64, f64) = (10.0, 60.0);

/// Complete input for one screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenParameters {
    pub project_name: String,
    #[serde(default)]
    pub description: String,
    pub slope: SlopeAxes,
    pub pipe: PipeAxes,
}

/// Slope-stage axes, nested in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeAxes {
    pub angles: Vec<f64>,
    pub heights: Vec<f64>,
    pub groundwater_ratios: Vec<f64>,
    pub soil_scenarios: Vec<SoilScenario>,
}

/// An outside-diameter / wall-thickness pair (in).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeSize {
    pub outside_diameter: f64,
    pub wall_thickness: f64,
}

/// Pipeline-stage axes, nested in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeAxes {
    pub sizes: Vec<PipeSize>,
    pub grades: Vec<PipeGrade>,
    pub depths_of_cover: Vec<f64>,
    pub coatings: Vec<Coating>,
    pub internal_pressures: Vec<f64>,
    pub pgd_lengths: Vec<f64>,
    pub pgd_paths: Vec<PgdPath>,
}

impl SlopeAxes {
    /// Fail-fast validation of every axis value.
    pub fn validate(&self) -> Result<(), ScreenError> {
        non_empty("slope angle", &self.angles)?;
        non_empty("slope height", &self.heights)?;
        non_empty("groundwater ratio", &self.groundwater_ratios)?;
        non_empty("soil scenario", &self.soil_scenarios)?;

        for &angle in &self.angles {
            if !(angle.is_finite() && angle > 0.0 && angle < 90.0) {
                return Err(ScreenError::invalid_axis(
                    "slope angle",
                    format!("{angle} is outside the open range 0-90 degrees"),
                ));
            }
            if angle < PRACTICAL_ANGLE_RANGE.0 || angle > PRACTICAL_ANGLE_RANGE.1 {
                tracing::warn!(angle, "slope angle outside the practical 10-60 degree range");
            }
        }
        for &height in &self.heights {
            if !(height.is_finite() && height > 0.0) {
                return Err(ScreenError::invalid_axis("slope height", format!("{height} must be > 0")));
            }
        }
        for &ratio in &self.groundwater_ratios {
            if !(ratio.is_finite() && (0.0..=1.0).contains(&ratio)) {
                return Err(ScreenError::invalid_axis(
                    "groundwater ratio",
                    format!("{ratio} must be within 0-1"),
                ));
            }
        }
        for scenario in &self.soil_scenarios {
            scenario
                .validate()
                .map_err(|reason| ScreenError::invalid_axis("soil scenario", reason))?;
        }
        Ok(())
    }

    pub fn combination_count(&self) -> usize {
        self.angles.len() * self.heights.len() * self.groundwater_ratios.len() * self.soil_scenarios.len()
    }
}

impl PipeAxes {
    /// Fail-fast validation of every axis value.
    pub fn validate(&self) -> Result<(), ScreenError> {
        non_empty("pipe size", &self.sizes)?;
        non_empty("pipe grade", &self.grades)?;
        non_empty("depth of cover", &self.depths_of_cover)?;
        non_empty("coating", &self.coatings)?;
        non_empty("internal pressure", &self.internal_pressures)?;
        non_empty("PGD length", &self.pgd_lengths)?;
        non_empty("PGD path", &self.pgd_paths)?;

        for size in &self.sizes {
            let PipeSize {
                outside_diameter: od,
                wall_thickness: wt,
            } = *size;
            if !(od.is_finite() && od > 0.0) {
                return Err(ScreenError::invalid_axis("pipe size", format!("outside diameter {od} must be > 0")));
            }
            if !(wt.is_finite() && wt > 0.0 && wt < od / 2.0) {
                return Err(ScreenError::invalid_axis(
                    "pipe size",
                    format!("wall thickness {wt} must be > 0 and < OD/2 ({})", od / 2.0),
                ));
            }
        }
        positive("depth of cover", &self.depths_of_cover)?;
        positive("PGD length", &self.pgd_lengths)?;
        for &p in &self.internal_pressures {
            if !(p.is_finite() && p >= 0.0) {
                return Err(ScreenError::invalid_axis("internal pressure", format!("{p} must be >= 0")));
            }
        }
        Ok(())
    }

    pub fn combination_count(&self) -> usize {
        self.sizes.len()
            * self.grades.len()
            * self.depths_of_cover.len()
            * self.coatings.len()
            * self.internal_pressures.len()
            * self.pgd_lengths.len()
            * self.pgd_paths.len()
    }
}

fn non_empty<T>(axis: &'static str, values: &[T]) -> Result<(), ScreenError> {
    if values.is_empty() {
        return Err(ScreenError::invalid_axis(axis, "axis is empty"));
    }
    Ok(())
}

fn positive(axis: &'static str, values: &[f64]) -> Result<(), ScreenError> {
    for &v in values {
        if !(v.is_finite() && v > 0.0) {
            return Err(ScreenError::invalid_axis(axis, format!("{v} must be > 0")));
        }
    }
    Ok(())
}

impl Default for ScreenParameters {
    fn default() -> Self {
        Self {
            project_name: "PGD Default Analysis".to_string(),
            description: "Standard parametric slope stability and pipeline screening".to_string(),
            slope: SlopeAxes {
                angles: vec![15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0],
                heights: vec![20.0, 30.0, 40.0, 50.0, 60.0, 80.0, 100.0],
                groundwater_ratios: vec![0.5, 0.7, 0.9],
                soil_scenarios: default_soil_scenarios(),
            },
            pipe: PipeAxes {
                sizes: vec![
                    PipeSize {
                        outside_diameter: 16.0,
                        wall_thickness: 0.375,
                    },
                    PipeSize {
                        outside_diameter: 24.0,
                        wall_thickness: 0.5,
                    },
                    PipeSize {
                        outside_diameter: 36.0,
                        wall_thickness: 0.75,
                    },
                ],
                grades: vec![PipeGrade::X52, PipeGrade::X70],
                depths_of_cover: vec![4.0, 8.0, 15.0],
                coatings: vec![Coating::FusionBondedEpoxy, Coating::Concrete],
                internal_pressures: vec![1000.0, 1440.0],
                pgd_lengths: vec![10.0, 30.0, 50.0],
                pgd_paths: vec![PgdPath::Parallel, PgdPath::Perpendicular],
            },
        }
    }
}

/// Weak / medium / strong two-layer profiles (slope material over foundation).
pub fn default_soil_scenarios() -> Vec<SoilScenario> {
    let scenario = |name: &str, upper: [f64; 4], lower: [f64; 4]| {
        SoilScenario::new(
            name,
            vec![
                SoilLayer::new("Slope Material", upper[0], upper[1], upper[2], upper[3], 20.0),
                SoilLayer::new("Foundation Material", lower[0], lower[1], lower[2], lower[3], 30.0),
            ],
        )
    };
    vec![
        scenario("Weak Soil Scenario", [115.0, 100.0, 50.0, 15.0], [120.0, 200.0, 100.0, 25.0]),
        scenario("Medium Soil Scenario", [120.0, 200.0, 100.0, 25.0], [125.0, 400.0, 200.0, 35.0]),
        scenario("Strong Soil Scenario", [125.0, 400.0, 200.0, 35.0], [130.0, 1000.0, 500.0, 40.0]),
    ]
}
