//! Export the decision matrix to CSV.
//!
//! One row per decision record. Slope-only records leave the pipe and stress
//! columns empty. The export is meant to be easy to consume in spreadsheets.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::decision::DecisionMatrix;
use crate::domain::{DecisionRecord, StabilityResult};
use crate::error::ScreenError;

pub const CSV_HEADER: &str = "slope_id,angle_deg,height_ft,groundwater_ratio,soil_scenario,\
fos_total,fos_effective,fos_governing,method_total,method_effective,priority,risk_level,\
pipe_id,pipe_od_in,pipe_wt_in,pipe_grade,pipe_smys_psi,doc_ft,coating,pressure_psi,pgd_length_ft,pgd_path,\
longitudinal_force_lb_ft,axial_stress_psi,allowable_stress_psi,remaining_allowable_psi,max_allowable_length_ft,\
exceeds,manual_review,timeline,cost_band,action,note";

/// Write the decision matrix to a CSV file.
pub fn write_matrix_csv(path: &Path, matrix: &DecisionMatrix) -> Result<(), ScreenError> {
    let file = File::create(path)
        .map_err(|e| ScreenError::Io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_matrix(&mut out, matrix)?;
    out.flush()
        .map_err(|e| ScreenError::Io(format!("Failed to flush export CSV: {e}")))
}

/// Write the CSV table to any writer.
pub fn write_matrix<W: Write>(out: &mut W, matrix: &DecisionMatrix) -> Result<(), ScreenError> {
    writeln!(out, "{CSV_HEADER}").map_err(|e| ScreenError::Io(format!("Failed to write export CSV header: {e}")))?;
    for record in &matrix.records {
        writeln!(out, "{}", format_row(record))
            .map_err(|e| ScreenError::Io(format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

fn format_row(r: &DecisionRecord) -> String {
    let s = &r.slope;
    let mut fields = vec![
        r.slope_id.to_string(),
        format!("{}", s.angle),
        format!("{}", s.height),
        format!("{}", s.groundwater_ratio),
        quote(&s.soil.name),
        fos(&r.stability.total),
        fos(&r.stability.effective),
        r.stability.governing_fos().map(|v| format!("{v:.4}")).unwrap_or_default(),
        method(&r.stability.total),
        method(&r.stability.effective),
        r.decision.priority.level().to_string(),
        r.decision.risk_level.label().to_string(),
        r.pipe_id.map(|id| id.to_string()).unwrap_or_default(),
    ];

    match &r.pipe {
        Some(p) => fields.extend([
            format!("{}", p.outside_diameter),
            format!("{}", p.wall_thickness),
            p.grade.label().to_string(),
            format!("{}", p.smys()),
            format!("{}", p.depth_of_cover),
            quote(p.coating.label()),
            format!("{}", p.internal_pressure),
            format!("{}", p.pgd_length),
            p.pgd_path.label().to_string(),
        ]),
        None => fields.extend(std::iter::repeat_n(String::new(), 9)),
    }

    match &r.stress {
        Some(st) => fields.extend([
            format!("{:.2}", st.longitudinal_force),
            format!("{:.2}", st.axial_stress),
            format!("{:.2}", st.allowable_stress),
            format!("{:.2}", st.remaining_allowable_stress),
            if st.max_allowable_length.is_finite() {
                format!("{:.2}", st.max_allowable_length)
            } else {
                "inf".to_string()
            },
            st.exceeds.to_string(),
        ]),
        None => fields.extend(std::iter::repeat_n(String::new(), 6)),
    }

    fields.extend([
        r.decision.manual_review.to_string(),
        quote(&r.decision.recommended_timeline),
        quote(&r.decision.estimated_cost_band),
        quote(&r.decision.recommended_action),
        quote(r.note.label()),
    ]);
    fields.join(",")
}

fn fos(result: &StabilityResult) -> String {
    result.factor_of_safety.map(|v| format!("{v:.4}")).unwrap_or_default()
}

fn method(result: &StabilityResult) -> String {
    result.method_used.map(|m| m.to_string()).unwrap_or_default()
}

/// Quote a field if it contains a delimiter, quote or newline.
fn quote(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{PipeOutcome, ResultAggregator};
    use crate::domain::{
        AnalysisType, Coating, PgdPath, PipeConfiguration, PipeGrade, SlopeConfiguration, SoilLayer, SoilScenario,
        StabilityAssessment, TierId,
    };
    use crate::springs::SoilPipeInteractionCalculator;
    use std::sync::Arc;

    fn matrix() -> DecisionMatrix {
        let soil = SoilScenario::uniform(SoilLayer::new("Stiff Fat Clay", 120.0, 1500.0, 100.0, 26.0, 60.0));
        let slope = SlopeConfiguration::new(30.0, 40.0, 0.5, Arc::new(soil));
        let pipe = PipeConfiguration {
            outside_diameter: 16.0,
            wall_thickness: 0.375,
            grade: PipeGrade::X42,
            depth_of_cover: 25.0,
            coating: Coating::FusionBondedEpoxy,
            internal_pressure: 1500.0,
            pgd_length: 100.0,
            pgd_path: PgdPath::Parallel,
        };
        let stress = SoilPipeInteractionCalculator::default().evaluate(&slope, &pipe);
        let low = StabilityAssessment {
            total: StabilityResult::resolved(AnalysisType::TotalStress, 1.35, TierId::BishopSimplified),
            effective: StabilityResult::unresolved(AnalysisType::EffectiveStress, "exhausted"),
        };
        let high = StabilityAssessment {
            total: StabilityResult::resolved(AnalysisType::TotalStress, 2.1, TierId::CulmannWedge),
            effective: StabilityResult::resolved(AnalysisType::EffectiveStress, 1.9, TierId::CulmannWedge),
        };
        let agg = ResultAggregator::default();
        agg.join(0, &slope, &low, vec![PipeOutcome { pipe_id: 0, pipe, stress }]);
        agg.join(1, &slope, &high, Vec::new());
        agg.finish(false)
    }

    #[test]
    fn csv_has_one_line_per_record_and_consistent_columns() {
        let mut buf = Vec::new();
        write_matrix(&mut buf, &matrix()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(CSV_HEADER.split(',').count(), 33);

        let evaluated = lines[1];
        assert!(evaluated.starts_with(
            "0,30,40,0.5,Stiff Fat Clay,1.3500,,1.3500,bishop-simplified,,1,VERY HIGH,0,16,0.375,X-42,42000,25,"
        ));
        assert!(evaluated.contains(",true,false,Immediate (0-7 days),\"$50,000 - $200,000\","));
        assert!(evaluated.ends_with(",pipe stress evaluated"));

        let slope_only = lines[2];
        assert!(slope_only.starts_with(
            "1,30,40,0.5,Stiff Fat Clay,2.1000,1.9000,1.9000,culmann-wedge,culmann-wedge,4,LOW,,"
        ));
        assert!(slope_only.ends_with(",no detailed pipe analysis required"));
    }

    #[test]
    fn writes_file_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.csv");
        write_matrix_csv(&path, &matrix()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn quoting_escapes_delimiters() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
