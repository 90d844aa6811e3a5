//! Command-line parsing for the PGD screening engine.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the engineering code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::decision::DEFAULT_DETAIL_FOS_THRESHOLD;
use crate::domain::{Coating, PgdPath, PipeGrade};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pgd", version, about = "PGD slope/pipeline screening engine")]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sweep the parameter space and print the prioritized decision summary.
    Screen(ScreenArgs),
    /// Soil-spring stress check for a single pipe in a single soil layer.
    Springs(SpringsArgs),
    /// Print the default parameter set as JSON, or write it to a file.
    Params(ParamsArgs),
}

/// Options for a screening run.
#[derive(Debug, Args, Clone)]
pub struct ScreenArgs {
    /// Parameter file (JSON). The built-in default study is used when omitted.
    #[arg(short, long, value_name = "JSON")]
    pub params: Option<PathBuf>,

    /// Worker threads (0 = one per core).
    #[arg(short = 'j', long, default_value_t = 0)]
    pub threads: usize,

    /// Stop starting new configurations after this many seconds.
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Slopes with a governing FoS at or above this skip the pipe stage.
    #[arg(long, default_value_t = DEFAULT_DETAIL_FOS_THRESHOLD)]
    pub detail_fos: f64,

    /// External solver command (also read from PGD_SOLVER_CMD).
    #[arg(long, value_name = "CMD")]
    pub solver_cmd: Option<String>,

    /// External solver timeout in milliseconds (also read from PGD_SOLVER_TIMEOUT_MS).
    #[arg(long)]
    pub solver_timeout_ms: Option<u64>,

    /// Number of most urgent records to print.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Export the decision matrix to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full decision matrix (records, skipped, summary) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Single-case soil-spring inputs. Defaults reproduce the stiff fat clay reference case.
#[derive(Debug, Args, Clone)]
pub struct SpringsArgs {
    /// Outside diameter (in).
    #[arg(long, default_value_t = 16.0)]
    pub od: f64,

    /// Wall thickness (in).
    #[arg(long, default_value_t = 0.375)]
    pub wt: f64,

    #[arg(long, value_enum, default_value_t = PipeGrade::X42)]
    pub grade: PipeGrade,

    /// Depth of cover to top of pipe (ft).
    #[arg(long, default_value_t = 1.0)]
    pub doc: f64,

    #[arg(long, value_enum, default_value_t = Coating::FusionBondedEpoxy)]
    pub coating: Coating,

    /// Internal pressure (psi).
    #[arg(long, default_value_t = 1500.0)]
    pub pressure: f64,

    /// Length of pipe in the moving ground (ft).
    #[arg(long, default_value_t = 10.0)]
    pub length: f64,

    #[arg(long, value_enum, default_value_t = PgdPath::Parallel)]
    pub path: PgdPath,

    /// Soil name used in the report.
    #[arg(long, default_value = "Stiff Fat Clay")]
    pub soil: String,

    /// Soil unit weight (pcf).
    #[arg(long, default_value_t = 120.0)]
    pub unit_weight: f64,

    /// Effective cohesion (psf).
    #[arg(long, default_value_t = 100.0)]
    pub cohesion: f64,

    /// Effective friction angle (degrees).
    #[arg(long, default_value_t = 26.0)]
    pub friction_angle: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ParamsArgs {
    /// Write to this file instead of stdout.
    #[arg(long, value_name = "JSON")]
    pub write: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_defaults_parse() {
        let cli = Cli::parse_from(["pgd", "screen"]);
        let Command::Screen(args) = cli.command else {
            panic!("expected screen");
        };
        assert_eq!(args.detail_fos, 1.5);
        assert_eq!(args.threads, 0);
        assert!(args.params.is_none());
    }

    #[test]
    fn springs_accepts_enum_values() {
        let cli = Cli::parse_from([
            "pgd",
            "-v",
            "springs",
            "--grade",
            "x70",
            "--coating",
            "concrete",
            "--path",
            "perpendicular",
        ]);
        assert!(cli.verbose);
        let Command::Springs(args) = cli.command else {
            panic!("expected springs");
        };
        assert_eq!(args.grade, PipeGrade::X70);
        assert_eq!(args.coating, Coating::Concrete);
        assert_eq!(args.path, PgdPath::Perpendicular);
    }
}
