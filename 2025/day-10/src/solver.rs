use indicatif::{ParallelProgressIterator, ProgressIterator, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{Engine, SolverConfig};
use crate::elimination;
use crate::enumerate;
use crate::error::SolveError;
use crate::schema::{JoltageSchema, Solution};
use crate::search;

/// Outcome for one machine: `Ok(None)` means no press counts reach the targets.
pub type Outcome = Result<Option<Solution>, SolveError>;

fn solve_by_elimination(schema: &JoltageSchema, config: &SolverConfig) -> Outcome {
    match elimination::reduce(schema)? {
        Some(reduction) => enumerate::minimize(&reduction, schema, &config.budget),
        None => Ok(None),
    }
}

/// Fewest presses reproducing the schema's targets, using the configured engine.
#[tracing::instrument(level = "debug", skip_all, fields(engine = ?config.engine))]
pub fn solve(schema: &JoltageSchema, config: &SolverConfig) -> Outcome {
    let solution = match config.engine {
        Engine::Elimination => solve_by_elimination(schema, config)?,
        Engine::BruteForce => search::minimize(schema, &config.budget)?,
        Engine::CrossCheck => {
            let eliminated = solve_by_elimination(schema, config)?;
            let searched = search::minimize(schema, &config.budget)?;
            let totals = (
                eliminated.as_ref().map(Solution::total),
                searched.as_ref().map(Solution::total),
            );
            if totals.0 != totals.1 {
                return Err(SolveError::EngineMismatch {
                    elimination: totals.0,
                    brute_force: totals.1,
                });
            }
            eliminated
        }
    };

    debug_assert!(solution.as_ref().map_or(true, |s| s.satisfies(schema)));
    if let Some(solution) = &solution {
        debug!(total = solution.total(), presses = ?solution.presses(), "solved");
    }
    Ok(solution)
}

/// Solves each schema independently; one failure does not stop the others.
pub fn solve_batch(schemas: &[JoltageSchema], config: &SolverConfig) -> Vec<Outcome> {
    match (config.parallel, config.progress) {
        (true, true) => schemas
            .par_iter()
            .progress_with_style(progress_style())
            .map(|s| solve(s, config))
            .collect(),
        (true, false) => schemas.par_iter().map(|s| solve(s, config)).collect(),
        (false, true) => schemas
            .iter()
            .progress_with_style(progress_style())
            .map(|s| solve(s, config))
            .collect(),
        (false, false) => schemas.iter().map(|s| solve(s, config)).collect(),
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{bar:40} {pos}/{len} machines ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Sum of minimal totals, logging and skipping machines that fail or have no
/// solution.
pub fn total_presses(outcomes: &[Outcome]) -> u64 {
    outcomes
        .iter()
        .enumerate()
        .filter_map(|(idx, outcome)| match outcome {
            Ok(Some(solution)) => Some(solution.total()),
            Ok(None) => {
                warn!(machine = idx + 1, "no combination of presses reaches the targets");
                None
            }
            Err(err) => {
                warn!(machine = idx + 1, error = %err, "solver failed");
                None
            }
        })
        .sum()
}
