//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - builds the stability resolver and stress calculator
//! - runs the screening pipeline
//! - prints reports and writes optional exports

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ParamsArgs, ScreenArgs, SpringsArgs};
use crate::domain::{PipeConfiguration, SlopeConfiguration, SoilLayer, SoilScenario};
use crate::error::{AppError, ScreenError};
use crate::springs::SoilPipeInteractionCalculator;
use crate::stability::{ExternalSolverTier, StabilityResolver};
use crate::sweep::ScreenParameters;

pub mod pipeline;

/// Entry point for the `pgd` binary.
pub fn run() -> Result<(), AppError> {
    // `pgd` and `pgd --params file.json` behave like `pgd screen ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Screen(args) => handle_screen(args),
        Command::Springs(args) => handle_springs(args),
        Command::Params(args) => handle_params(args),
    }
}

/// Log to stderr so stdout carries only the report. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_screen(args: ScreenArgs) -> Result<(), AppError> {
    let params = match &args.params {
        Some(path) => crate::io::load_params(path)?,
        None => ScreenParameters::default(),
    };

    let resolver = StabilityResolver::with_default_tiers(external_tier(&args));
    let calculator = SoilPipeInteractionCalculator::default();
    let options = pipeline::RunOptions {
        threads: args.threads,
        detail_fos_threshold: args.detail_fos,
        deadline: args.deadline_secs.map(Duration::from_secs),
        ..pipeline::RunOptions::default()
    };

    let run = pipeline::run_screen(&params, &resolver, &calculator, &options)?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &params.project_name,
            &run.matrix,
            run.slope_count,
            run.pipe_count,
            &resolver.tier_ids(),
        )
    );
    println!("Elapsed: {:.2} s", run.elapsed.as_secs_f64());
    if args.top > 0 && !run.matrix.records.is_empty() {
        println!("Most urgent:");
        println!(
            "{}",
            crate::report::format_urgent_table(&crate::report::most_urgent(&run.matrix, args.top))
        );
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::write_matrix_csv(path, &run.matrix)?;
        info!(path = %path.display(), "decision matrix CSV written");
    }
    if let Some(path) = &args.export_json {
        let file = crate::io::MatrixFile::new(params.project_name.clone(), run.matrix);
        crate::io::write_matrix_json(path, &file)?;
        info!(path = %path.display(), "decision matrix JSON written");
    }

    Ok(())
}

/// CLI flags take precedence over `PGD_SOLVER_CMD` / `PGD_SOLVER_TIMEOUT_MS`.
fn external_tier(args: &ScreenArgs) -> Option<ExternalSolverTier> {
    let tier = match &args.solver_cmd {
        Some(cmd) => {
            let timeout = args
                .solver_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(ExternalSolverTier::DEFAULT_TIMEOUT);
            ExternalSolverTier::from_command_line(cmd, timeout)
        }
        None => ExternalSolverTier::from_env(),
    };
    if let Some(tier) = &tier {
        info!(program = %tier.program().display(), "external solver configured");
    }
    tier
}

fn handle_springs(args: SpringsArgs) -> Result<(), AppError> {
    let layer = SoilLayer::new(
        args.soil.clone(),
        args.unit_weight,
        args.cohesion,
        args.cohesion,
        args.friction_angle,
        args.doc + args.od / 24.0,
    );
    layer.validate().map_err(|reason| AppError::new(2, reason))?;

    let pipe = PipeConfiguration {
        outside_diameter: args.od,
        wall_thickness: args.wt,
        grade: args.grade,
        depth_of_cover: args.doc,
        coating: args.coating,
        internal_pressure: args.pressure,
        pgd_length: args.length,
        pgd_path: args.path,
    };
    pipe.validate()
        .map_err(|reason| AppError::from(ScreenError::invalid_axis("pipe", reason)))?;

    // Stress depends only on the soil profile, so any slope geometry will do.
    let soil = Arc::new(SoilScenario::uniform(layer.clone()));
    let slope = SlopeConfiguration::new(30.0, 10.0, 1.0, soil);
    let result = SoilPipeInteractionCalculator::default().evaluate(&slope, &pipe)?;

    println!("{}", crate::report::format_stress_result(&layer, &pipe, &result));
    Ok(())
}

fn handle_params(args: ParamsArgs) -> Result<(), AppError> {
    let params = ScreenParameters::default();
    match &args.write {
        Some(path) => {
            crate::io::write_params(path, &params)?;
            info!(path = %path.display(), "default parameters written");
        }
        None => println!("{}", crate::io::params_to_json(&params)?),
    }
    Ok(())
}

/// Rewrite argv so `pgd` defaults to `pgd screen`.
///
/// Rules:
/// - `pgd`                      -> `pgd screen`
/// - `pgd --params p.json ...`  -> `pgd screen --params p.json ...`
/// - `pgd --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("screen".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "screen" | "springs" | "params");
    if is_subcommand {
        return argv;
    }

    // `-v` alone is global; look past it for a subcommand.
    if (arg1 == "-v" || arg1 == "--verbose")
        && argv
            .get(2)
            .is_some_and(|a| matches!(a.as_str(), "screen" | "springs" | "params"))
    {
        return argv;
    }

    // If the first token is a flag, treat it as "screen flags".
    if arg1.starts_with('-') {
        argv.insert(1, "screen".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
