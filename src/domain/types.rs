//! Input-side domain types: soils, slopes, pipes and their enumerations.
//!
//! Configurations are plain values. Floating-point fields cannot derive `Hash`/`Eq`,
//! so each configuration exposes a bit-exact key (`SlopeKey`, `PipeKey`) used for
//! deduplication and memoization.

use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Unit weight of water (pcf).
pub const WATER_UNIT_WEIGHT_PCF: f64 = 62.4;

/// One soil stratum. Thickness is measured downward from the top of the layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    pub name: String,
    /// Unit weight (pcf).
    pub unit_weight: f64,
    /// Undrained cohesion used by total-stress analysis (psf).
    pub cohesion_total: f64,
    /// Effective cohesion `c'` (psf).
    pub cohesion_effective: f64,
    /// Effective friction angle `φ'` (degrees).
    pub friction_angle: f64,
    /// Layer thickness (ft).
    pub thickness: f64,
}

impl SoilLayer {
    pub fn new(
        name: impl Into<String>,
        unit_weight: f64,
        cohesion_total: f64,
        cohesion_effective: f64,
        friction_angle: f64,
        thickness: f64,
    ) -> Self {
        Self {
            name: name.into(),
            unit_weight,
            cohesion_total,
            cohesion_effective,
            friction_angle,
            thickness,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("soil layer name must not be empty".to_string());
        }
        if !(self.unit_weight.is_finite() && self.unit_weight > 0.0) {
            return Err(format!("layer '{}': unit weight must be > 0, got {}", self.name, self.unit_weight));
        }
        if !(self.cohesion_total.is_finite() && self.cohesion_total >= 0.0) {
            return Err(format!(
                "layer '{}': total cohesion must be >= 0, got {}",
                self.name, self.cohesion_total
            ));
        }
        if !(self.cohesion_effective.is_finite() && self.cohesion_effective >= 0.0) {
            return Err(format!(
                "layer '{}': effective cohesion must be >= 0, got {}",
                self.name, self.cohesion_effective
            ));
        }
        if !(self.friction_angle.is_finite() && (0.0..=90.0).contains(&self.friction_angle)) {
            return Err(format!(
                "layer '{}': friction angle must be within 0-90 degrees, got {}",
                self.name, self.friction_angle
            ));
        }
        if !(self.thickness.is_finite() && self.thickness > 0.0) {
            return Err(format!("layer '{}': thickness must be > 0, got {}", self.name, self.thickness));
        }
        Ok(())
    }
}

/// A named soil profile, layers ordered top to bottom from the slope crest.
///
/// The last layer is treated as extending indefinitely below its nominal thickness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilScenario {
    pub name: String,
    pub layers: Vec<SoilLayer>,
}

impl SoilScenario {
    pub fn new(name: impl Into<String>, layers: Vec<SoilLayer>) -> Self {
        Self {
            name: name.into(),
            layers,
        }
    }

    /// Single-layer scenario (handy for pipe-only calculations).
    pub fn uniform(layer: SoilLayer) -> Self {
        Self::new(layer.name.clone(), vec![layer])
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err(format!("soil scenario '{}' has no layers", self.name));
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        if self.total_thickness() <= 0.0 {
            return Err(format!("soil scenario '{}' has zero total thickness", self.name));
        }
        Ok(())
    }

    pub fn total_thickness(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness).sum()
    }

    /// Layer containing the given depth below the crest.
    ///
    /// # Panics
    /// Panics if the scenario has no layers; validated scenarios always have one.
    pub fn layer_at_depth(&self, depth: f64) -> &SoilLayer {
        let mut top = 0.0;
        for layer in &self.layers {
            let bottom = top + layer.thickness;
            if depth < bottom {
                return layer;
            }
            top = bottom;
        }
        &self.layers[self.layers.len() - 1]
    }

    /// Layers whose top lies above `depth` (always at least the first layer).
    pub fn layers_above(&self, depth: f64) -> impl Iterator<Item = &SoilLayer> {
        let mut top = 0.0;
        self.layers.iter().enumerate().filter_map(move |(i, layer)| {
            let include = i == 0 || top < depth;
            top += layer.thickness;
            include.then_some(layer)
        })
    }

    pub fn key(&self) -> SoilKey {
        SoilKey {
            name: self.name.clone(),
            layers: self
                .layers
                .iter()
                .map(|l| {
                    (
                        l.name.clone(),
                        [
                            bits(l.unit_weight),
                            bits(l.cohesion_total),
                            bits(l.cohesion_effective),
                            bits(l.friction_angle),
                            bits(l.thickness),
                        ],
                    )
                })
                .collect(),
        }
    }
}

/// Pipe material grade with its Specified Minimum Yield Strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum PipeGrade {
    #[serde(rename = "Grade B")]
    GradeB,
    #[serde(rename = "X-42")]
    X42,
    #[serde(rename = "X-52")]
    X52,
    #[serde(rename = "X-60")]
    X60,
    #[serde(rename = "X-70")]
    X70,
}

impl PipeGrade {
    /// SMYS (psi).
    pub fn smys(self) -> f64 {
        match self {
            PipeGrade::GradeB => 35_000.0,
            PipeGrade::X42 => 42_000.0,
            PipeGrade::X52 => 52_000.0,
            PipeGrade::X60 => 60_000.0,
            PipeGrade::X70 => 70_000.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PipeGrade::GradeB => "Grade B",
            PipeGrade::X42 => "X-42",
            PipeGrade::X52 => "X-52",
            PipeGrade::X60 => "X-60",
            PipeGrade::X70 => "X-70",
        }
    }
}

/// External pipe coating. The roughness coefficient `f` scales the soil friction
/// angle to the pipe-soil interface angle `δ = f·φ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Coating {
    Polyethylene,
    FusionBondedEpoxy,
    SmoothSteel,
    RoughSteel,
    CoalTar,
    Concrete,
}

impl Coating {
    pub fn roughness(self) -> f64 {
        match self {
            Coating::Polyethylene | Coating::FusionBondedEpoxy => 0.6,
            Coating::SmoothSteel => 0.7,
            Coating::RoughSteel => 0.8,
            Coating::CoalTar => 0.9,
            Coating::Concrete => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Coating::Polyethylene => "Polyethylene",
            Coating::FusionBondedEpoxy => "Fusion Bonded Epoxy",
            Coating::SmoothSteel => "Smooth Steel",
            Coating::RoughSteel => "Rough Steel",
            Coating::CoalTar => "Coal Tar",
            Coating::Concrete => "Concrete",
        }
    }
}

/// Direction of ground movement relative to the pipe axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PgdPath {
    Parallel,
    Perpendicular,
}

impl PgdPath {
    pub fn label(self) -> &'static str {
        match self {
            PgdPath::Parallel => "parallel",
            PgdPath::Perpendicular => "perpendicular",
        }
    }
}

/// Which strength model a stability analysis uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisType {
    /// Undrained: `φ = 0`, `c = cohesion_total`.
    TotalStress,
    /// Drained: `c'`, `φ'`, pore pressure from the phreatic line.
    EffectiveStress,
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisType::TotalStress => write!(f, "total-stress"),
            AnalysisType::EffectiveStress => write!(f, "effective-stress"),
        }
    }
}

/// Identifier of a stability solver tier, recorded on every resolved result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TierId {
    ExternalSolver,
    BishopSimplified,
    CulmannWedge,
}

impl std::fmt::Display for TierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierId::ExternalSolver => write!(f, "external-solver"),
            TierId::BishopSimplified => write!(f, "bishop-simplified"),
            TierId::CulmannWedge => write!(f, "culmann-wedge"),
        }
    }
}

/// One slope case: a simple 2-D slope with horizontal ground at toe and crest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeConfiguration {
    /// Face angle from horizontal (degrees).
    pub angle: f64,
    /// Toe-to-crest height (ft).
    pub height: f64,
    /// Water table depth below the crest as a fraction of `height`.
    pub groundwater_ratio: f64,
    pub soil: Arc<SoilScenario>,
}

impl SlopeConfiguration {
    pub fn new(angle: f64, height: f64, groundwater_ratio: f64, soil: Arc<SoilScenario>) -> Self {
        Self {
            angle,
            height,
            groundwater_ratio,
            soil,
        }
    }

    /// Water table depth below the crest (ft).
    pub fn water_table_depth(&self) -> f64 {
        self.groundwater_ratio * self.height
    }

    /// Phreatic surface elevation above the toe (ft).
    pub fn phreatic_elevation(&self) -> f64 {
        self.height - self.water_table_depth()
    }

    /// Horizontal run of the slope face (ft).
    pub fn face_run(&self) -> f64 {
        self.height / self.angle.to_radians().tan()
    }

    pub fn key(&self) -> SlopeKey {
        SlopeKey {
            angle: bits(self.angle),
            height: bits(self.height),
            groundwater_ratio: bits(self.groundwater_ratio),
            soil: self.soil.key(),
        }
    }
}

/// A candidate pipe crossing the PGD zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeConfiguration {
    /// Outside diameter (in).
    pub outside_diameter: f64,
    /// Wall thickness (in).
    pub wall_thickness: f64,
    pub grade: PipeGrade,
    /// Depth of cover to the top of pipe (ft).
    pub depth_of_cover: f64,
    pub coating: Coating,
    /// Internal operating pressure (psi).
    pub internal_pressure: f64,
    /// Length of pipe exposed to ground movement (ft).
    pub pgd_length: f64,
    pub pgd_path: PgdPath,
}

impl PipeConfiguration {
    pub fn smys(&self) -> f64 {
        self.grade.smys()
    }

    /// Outside diameter in feet.
    pub fn diameter_ft(&self) -> f64 {
        self.outside_diameter / 12.0
    }

    /// Depth from grade to the pipe centreline (ft).
    pub fn centerline_depth(&self) -> f64 {
        self.depth_of_cover + self.diameter_ft() / 2.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.outside_diameter.is_finite() && self.outside_diameter > 0.0) {
            return Err(format!("outside diameter must be > 0, got {}", self.outside_diameter));
        }
        if !(self.wall_thickness.is_finite() && self.wall_thickness > 0.0) {
            return Err(format!("wall thickness must be > 0, got {}", self.wall_thickness));
        }
        if self.wall_thickness >= self.outside_diameter / 2.0 {
            return Err(format!(
                "wall thickness {} must be less than half the outside diameter {}",
                self.wall_thickness, self.outside_diameter
            ));
        }
        if !(self.depth_of_cover.is_finite() && self.depth_of_cover > 0.0) {
            return Err(format!("depth of cover must be > 0, got {}", self.depth_of_cover));
        }
        if !(self.internal_pressure.is_finite() && self.internal_pressure >= 0.0) {
            return Err(format!("internal pressure must be >= 0, got {}", self.internal_pressure));
        }
        if !(self.pgd_length.is_finite() && self.pgd_length > 0.0) {
            return Err(format!("PGD length must be > 0, got {}", self.pgd_length));
        }
        Ok(())
    }

    pub fn key(&self) -> PipeKey {
        PipeKey {
            dims: [
                bits(self.outside_diameter),
                bits(self.wall_thickness),
                bits(self.depth_of_cover),
                bits(self.internal_pressure),
                bits(self.pgd_length),
            ],
            grade: self.grade,
            coating: self.coating,
            pgd_path: self.pgd_path,
        }
    }
}

/// Value identity of a soil scenario.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoilKey {
    name: String,
    layers: Vec<(String, [u64; 5])>,
}

/// Value identity of a slope configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlopeKey {
    angle: u64,
    height: u64,
    groundwater_ratio: u64,
    soil: SoilKey,
}

/// Value identity of a pipe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipeKey {
    dims: [u64; 5],
    grade: PipeGrade,
    coating: Coating,
    pgd_path: PgdPath,
}

/// Bit pattern with `-0.0` folded onto `0.0` so equal values hash equally.
fn bits(v: f64) -> u64 {
    if v == 0.0 { 0 } else { v.to_bits() }
}
