//! Shared screening workflow used by the `screen` command.
//!
//! Keeping this in one place keeps the CLI focused on presentation:
//! generate configurations -> resolve stability -> evaluate pipes -> classify -> aggregate
//!
//! Slope configurations are evaluated on a dedicated rayon pool. Stability is
//! memoized by slope value (inside the resolver) and pipe stress by
//! (soil scenario, pipe), since stress does not depend on slope geometry.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::decision::{DEFAULT_DETAIL_FOS_THRESHOLD, DecisionMatrix, PipeOutcome, ResultAggregator};
use crate::domain::{PipeConfiguration, PipeKey, SlopeConfiguration, SoilKey, StressResult};
use crate::error::ScreenError;
use crate::memo::Memo;
use crate::springs::SoilPipeInteractionCalculator;
use crate::stability::StabilityResolver;
use crate::sweep::{ScreenParameters, generate_pipe_configurations, generate_slope_configurations};

/// Cooperative cancellation shared between the caller and the workers.
///
/// Checked before each slope configuration starts; in-flight work completes.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
    pub detail_fos_threshold: f64,
    /// Stop starting new configurations after this long.
    pub deadline: Option<Duration>,
    pub cancel: CancelFlag,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            detail_fos_threshold: DEFAULT_DETAIL_FOS_THRESHOLD,
            deadline: None,
            cancel: CancelFlag::new(),
        }
    }
}

/// All computed outputs of a single `pgd screen` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub matrix: DecisionMatrix,
    pub slope_count: usize,
    pub pipe_count: usize,
    pub elapsed: Duration,
}

/// Execute the full screening workflow.
///
/// Only invalid axes abort the run; every per-configuration failure ends up in
/// the matrix as an unresolved or skipped entry.
pub fn run_screen(
    params: &ScreenParameters,
    resolver: &StabilityResolver,
    calculator: &SoilPipeInteractionCalculator,
    options: &RunOptions,
) -> Result<RunOutput, ScreenError> {
    let started = Instant::now();

    // 1) Expand the axes. Validation happens here, before any computation.
    let slopes = generate_slope_configurations(&params.slope)?;
    let pipes = generate_pipe_configurations(&params.pipe)?;
    info!(
        project = %params.project_name,
        slopes = slopes.len(),
        pipes = pipes.len(),
        tiers = ?resolver.tier_ids(),
        "configuration space generated"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .build()
        .map_err(|e| ScreenError::WorkerPool(e.to_string()))?;

    let _deadline = options.deadline.map(|limit| DeadlineGuard::start(limit, options.cancel.clone()));

    let aggregator = ResultAggregator::new(options.detail_fos_threshold);
    let stress_memo: Memo<(SoilKey, PipeKey), Result<StressResult, ScreenError>> = Memo::new();
    let completed = AtomicUsize::new(0);

    // 2) Evaluate slopes in parallel; each slope joins its records atomically.
    pool.install(|| {
        slopes.par_iter().enumerate().for_each(|(slope_id, slope)| {
            if options.cancel.is_cancelled() {
                return;
            }

            let stability = resolver.resolve(slope);
            let outcomes = if aggregator.requires_detail(&stability) {
                let soil = slope.soil.key();
                pipes
                    .iter()
                    .enumerate()
                    .map(|(pipe_id, pipe)| PipeOutcome {
                        pipe_id,
                        pipe: pipe.clone(),
                        stress: stress_memo.get_or_insert_with((soil.clone(), pipe.key()), || {
                            evaluate_guarded(calculator, slope, pipe)
                        }),
                    })
                    .collect()
            } else {
                Vec::new()
            };

            debug!(slope_id, fos = ?stability.governing_fos(), pipes = outcomes.len(), "slope evaluated");
            aggregator.join(slope_id, slope, &stability, outcomes);
            completed.fetch_add(1, Ordering::SeqCst);
        });
    });

    // 3) Sort and summarise.
    let done = completed.load(Ordering::SeqCst);
    let cancelled = done < slopes.len();
    if cancelled {
        warn!(completed = done, total = slopes.len(), "run cancelled before all configurations were evaluated");
    }
    let matrix = aggregator.finish(cancelled);
    let elapsed = started.elapsed();
    info!(
        records = matrix.summary.records,
        skipped = matrix.summary.skipped,
        stability_cached = resolver.cached(),
        stress_cached = stress_memo.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "screening complete"
    );

    Ok(RunOutput {
        matrix,
        slope_count: slopes.len(),
        pipe_count: pipes.len(),
        elapsed,
    })
}

/// Run one stress evaluation, turning a panic in the force model into a skipped pipe.
fn evaluate_guarded(
    calculator: &SoilPipeInteractionCalculator,
    slope: &SlopeConfiguration,
    pipe: &PipeConfiguration,
) -> Result<StressResult, ScreenError> {
    panic::catch_unwind(AssertUnwindSafe(|| calculator.evaluate(slope, pipe)))
        .unwrap_or_else(|_| Err(ScreenError::StressComputation("force model panicked".to_string())))
}

/// Sets the cancel flag when the deadline passes; dropping it disarms the timer.
struct DeadlineGuard {
    _disarm: mpsc::Sender<()>,
}

impl DeadlineGuard {
    fn start(limit: Duration, cancel: CancelFlag) -> Self {
        let (tx, rx) = mpsc::channel::<()>();
        thread::spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) = rx.recv_timeout(limit) {
                warn!(limit_ms = limit.as_millis() as u64, "deadline reached; cancelling run");
                cancel.cancel();
            }
        });
        Self { _disarm: tx }
    }
}
