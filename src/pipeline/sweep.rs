//! Batch evaluation of many roll inputs, sequentially or across CPU cores.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;

use crate::pipeline::input::RollInput;
use crate::pipeline::ruleset::Ruleset;
use crate::pipeline::resolve;

/// One labeled input in a sweep.
#[derive(Debug, Clone)]
pub struct SweepCase {
    pub label: String,
    pub ruleset: Ruleset,
    pub input: RollInput,
}

/// Headline statistics for one evaluated case.
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub label: String,
    pub expected_damage: f64,
    pub expected_casualties: f64,
    /// Probability of killing at least one model.
    pub chance_of_any_casualty: f64,
}

/// Evaluates every case in order on the current thread.
pub fn run_sweep(cases: &[SweepCase]) -> Vec<SweepOutcome> {
    cases.iter().map(evaluate).collect()
}

/// Like [run_sweep] but distributes cases across worker threads. Output
/// order matches input order. `workers` of 0 uses the global Rayon pool
/// (all cores); otherwise a temporary pool with that many threads is built.
pub fn run_sweep_parallel(cases: &[SweepCase], workers: usize) -> Vec<SweepOutcome> {
    if workers == 0 {
        cases.par_iter().map(evaluate).collect()
    } else {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .expect("sweep thread pool");
        pool.install(|| cases.par_iter().map(evaluate).collect())
    }
}

fn evaluate(case: &SweepCase) -> SweepOutcome {
    let report = resolve(case.ruleset, &case.input);
    let expected_damage = report.stage("damage").map_or(0.0, |stage| stage.expected);
    let (expected_casualties, chance_of_any_casualty) = report
        .stage("killed")
        .map_or((0.0, 0.0), |stage| {
            (
                stage.expected,
                stage.ccdf.get(1).copied().unwrap_or(0.0),
            )
        });
    SweepOutcome {
        label: case.label.clone(),
        expected_damage,
        expected_casualties,
        chance_of_any_casualty,
    }
}
