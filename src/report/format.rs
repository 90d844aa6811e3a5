//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engineering code stays clean and testable
//! - output changes are localized

use crate::decision::DecisionMatrix;
use crate::domain::{DecisionRecord, PipeConfiguration, Priority, SoilLayer, StressResult, TierId};

/// Run header, counts per priority and the FoS/tier statistics.
pub fn format_run_summary(
    project_name: &str,
    matrix: &DecisionMatrix,
    slope_count: usize,
    pipe_count: usize,
    tiers: &[TierId],
) -> String {
    let s = &matrix.summary;
    let mut out = String::new();

    out.push_str("=== pgd - PGD Slope/Pipeline Screening ===\n");
    out.push_str(&format!("Project: {project_name}\n"));
    out.push_str(&format!(
        "Configurations: {slope_count} slopes x {pipe_count} pipes | evaluated {} slopes\n",
        s.configurations_evaluated
    ));
    let tier_names: Vec<String> = tiers.iter().map(|t| t.to_string()).collect();
    out.push_str(&format!("Solver tiers: {}\n", tier_names.join(" -> ")));
    if matrix.cancelled {
        out.push_str("Run CANCELLED: results cover only the configurations evaluated before the stop.\n");
    }

    out.push_str("\nPriority distribution:\n");
    for priority in Priority::ALL {
        let n = s.count(priority);
        let pct = if s.records > 0 {
            100.0 * n as f64 / s.records as f64
        } else {
            0.0
        };
        out.push_str(&format!(
            "  {} {:<8} {:>7} ({:>5.1}%)  {}\n",
            priority.level(),
            priority.label(),
            n,
            pct,
            priority.timeline()
        ));
    }

    out.push('\n');
    out.push_str(&format!(
        "Records: {} | need pipe detail: {} slopes | stress exceedances: {} | manual review: {} | skipped pipes: {}\n",
        s.records, s.requiring_detail, s.exceeds, s.manual_review, s.skipped
    ));
    match (s.fos_min, s.fos_mean, s.fos_max) {
        (Some(min), Some(mean), Some(max)) => {
            out.push_str(&format!("Governing FoS: min={min:.3} mean={mean:.3} max={max:.3}\n"))
        }
        _ => out.push_str("Governing FoS: none resolved\n"),
    }
    if !s.tier_usage.is_empty() {
        let usage: Vec<String> = s.tier_usage.iter().map(|(t, n)| format!("{t}={n}")).collect();
        out.push_str(&format!("Tier usage: {}\n", usage.join(", ")));
    }

    out
}

/// Table of the given records (usually [`crate::report::most_urgent`]).
pub fn format_urgent_table(records: &[&DecisionRecord]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>5} {:>3} {:<9} {:>5} {:>6} {:>5} {:<22} {:>7} {:>5} {:>8} {:>5} {:<13} {:>10} {:<6}\n",
            "slope",
            "pri",
            "risk",
            "angle",
            "height",
            "gw",
            "soil",
            "fos",
            "pipe",
            "od x wt",
            "doc",
            "path",
            "axial",
            "flags"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<5} {:-<3} {:-<9} {:-<5} {:-<6} {:-<5} {:-<22} {:-<7} {:-<5} {:-<8} {:-<5} {:-<13} {:-<10} {:-<6}\n",
            "", "", "", "", "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in records {
        let fos = r
            .stability
            .governing_fos()
            .map(|v| format!("{v:.3}"))
            .unwrap_or_else(|| "n/a".to_string());
        let (pipe, size, doc, path) = match &r.pipe {
            Some(p) => (
                r.pipe_id.map(|id| id.to_string()).unwrap_or_default(),
                format!("{}x{}", p.outside_diameter, p.wall_thickness),
                format!("{}", p.depth_of_cover),
                p.pgd_path.label().to_string(),
            ),
            None => ("-".to_string(), String::new(), String::new(), String::new()),
        };
        let axial = r
            .stress
            .as_ref()
            .map(|s| format!("{:.0}", s.axial_stress))
            .unwrap_or_default();
        let mut flags = String::new();
        if r.stress.as_ref().is_some_and(|s| s.exceeds) {
            flags.push('X');
        }
        if r.decision.manual_review {
            flags.push('M');
        }
        out.push_str(
            format!(
                "{:>5} {:>3} {:<9} {:>5} {:>6} {:>5} {:<22} {:>7} {:>5} {:>8} {:>5} {:<13} {:>10} {:<6}\n",
                r.slope_id,
                r.decision.priority.level(),
                r.decision.risk_level.label(),
                r.slope.angle,
                r.slope.height,
                r.slope.groundwater_ratio,
                truncate(&r.slope.soil.name, 22),
                fos,
                pipe,
                size,
                doc,
                path,
                axial,
                flags,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out.push_str("flags: X = stress exceeds allowable, M = manual review\n");

    out
}

/// Single-case soil-spring report for `pgd springs`.
pub fn format_stress_result(layer: &SoilLayer, pipe: &PipeConfiguration, result: &StressResult) -> String {
    let mut out = String::new();

    out.push_str("=== pgd - Soil Spring Stress Check ===\n");
    out.push_str(&format!(
        "Soil: {} | gamma={} pcf | c'={} psf | phi'={} deg\n",
        layer.name, layer.unit_weight, layer.cohesion_effective, layer.friction_angle
    ));
    out.push_str(&format!(
        "Pipe: {} in x {} in {} (SMYS {} psi) | {} coating\n",
        pipe.outside_diameter,
        pipe.wall_thickness,
        pipe.grade.label(),
        pipe.smys(),
        pipe.coating.label()
    ));
    out.push_str(&format!(
        "Burial: cover {} ft | pressure {} psi | PGD {} ft {}\n",
        pipe.depth_of_cover,
        pipe.internal_pressure,
        pipe.pgd_length,
        pipe.pgd_path.label()
    ));

    out.push('\n');
    out.push_str(&format!("Soil force          : {:>12.2} lb/ft\n", result.longitudinal_force));
    out.push_str(&format!("Axial stress        : {:>12.2} psi\n", result.axial_stress));
    out.push_str(&format!("Hoop stress         : {:>12.2} psi\n", result.hoop_stress));
    out.push_str(&format!("Allowable (72% SMYS): {:>12.2} psi\n", result.allowable_stress));
    out.push_str(&format!("Remaining allowable : {:>12.2} psi\n", result.remaining_allowable_stress));
    if result.max_allowable_length.is_finite() {
        out.push_str(&format!("Max PGD length      : {:>12.2} ft\n", result.max_allowable_length));
    } else {
        out.push_str("Max PGD length      :    unbounded\n");
    }
    out.push_str(&format!(
        "Result              : {}\n",
        if result.exceeds { "EXCEEDS allowable" } else { "within allowable" }
    ));

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
