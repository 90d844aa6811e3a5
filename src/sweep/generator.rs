//! Configuration-space generation.
//!
//! Builds the cartesian product of the axes as a deduplicated, deterministic
//! sequence. Nesting follows the declared axis order, so identical input always
//! yields identical output order.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{PipeConfiguration, SlopeConfiguration, SoilScenario};
use crate::error::ScreenError;
use crate::sweep::axes::{PipeAxes, SlopeAxes};

/// All slope configurations: angle → height → groundwater ratio → soil scenario.
pub fn generate_slope_configurations(axes: &SlopeAxes) -> Result<Vec<SlopeConfiguration>, ScreenError> {
    axes.validate()?;

    let scenarios: Vec<Arc<SoilScenario>> = axes.soil_scenarios.iter().cloned().map(Arc::new).collect();

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(axes.combination_count());
    for &angle in &axes.angles {
        for &height in &axes.heights {
            for &ratio in &axes.groundwater_ratios {
                for soil in &scenarios {
                    let config = SlopeConfiguration::new(angle, height, ratio, Arc::clone(soil));
                    if seen.insert(config.key()) {
                        out.push(config);
                    }
                }
            }
        }
    }
    Ok(out)
}

/// All pipe configurations:
/// size → grade → depth of cover → coating → pressure → PGD length → PGD path.
pub fn generate_pipe_configurations(axes: &PipeAxes) -> Result<Vec<PipeConfiguration>, ScreenError> {
    axes.validate()?;

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(axes.combination_count());
    for size in &axes.sizes {
        for &grade in &axes.grades {
            for &depth_of_cover in &axes.depths_of_cover {
                for &coating in &axes.coatings {
                    for &internal_pressure in &axes.internal_pressures {
                        for &pgd_length in &axes.pgd_lengths {
                            for &pgd_path in &axes.pgd_paths {
                                let config = PipeConfiguration {
                                    outside_diameter: size.outside_diameter,
                                    wall_thickness: size.wall_thickness,
                                    grade,
                                    depth_of_cover,
                                    coating,
                                    internal_pressure,
                                    pgd_length,
                                    pgd_path,
                                };
                                if seen.insert(config.key()) {
                                    out.push(config);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(out)
}
