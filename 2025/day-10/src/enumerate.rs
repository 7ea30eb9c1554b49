use tracing::{debug, trace};

use crate::config::Budget;
use crate::elimination::Reduction;
use crate::error::SolveError;
use crate::schema::{JoltageSchema, Solution};

/// Mixed-radix counter over `[0, bounds[0]] x [0, bounds[1]] x ...`.
///
/// Digit 0 is the least significant. With no digits there is exactly one
/// (empty) assignment.
#[derive(Debug, Clone)]
pub struct Odometer {
    digits: Vec<u64>,
    bounds: Vec<u64>,
}

impl Odometer {
    pub fn new(bounds: Vec<u64>) -> Self {
        Self {
            digits: vec![0; bounds.len()],
            bounds,
        }
    }

    pub fn current(&self) -> &[u64] {
        &self.digits
    }

    /// Steps to the next assignment. Returns `false` once the highest digit
    /// overflows, leaving the odometer back at all zeros.
    pub fn advance(&mut self) -> bool {
        for (digit, &bound) in self.digits.iter_mut().zip(&self.bounds) {
            if *digit < bound {
                *digit += 1;
                return true;
            }
            *digit = 0;
        }
        false
    }
}

/// Upper bound of each free variable, in free-variable order.
pub fn free_variable_bounds(reduction: &Reduction, schema: &JoltageSchema) -> Vec<u64> {
    (0..reduction.free_variables())
        .map(|j| schema.buttons()[reduction.free_button(j)].upper_bound(schema.targets()))
        .collect()
}

/// Solves every row for its basic variable given the free assignment.
///
/// Returns `false` when some basic variable would be fractional or negative.
fn solve_basic(
    reduction: &Reduction,
    free: &[u64],
    basic: &mut [u64],
) -> Result<bool, SolveError> {
    let m = reduction.matrix();
    let rank = reduction.rank();
    let rhs = reduction.buttons();

    for (r, slot) in basic.iter_mut().enumerate() {
        let mut numerator = i128::from(m.get(r, rhs));
        for (j, &f) in free.iter().enumerate() {
            numerator -= i128::from(m.get(r, rank + j)) * i128::from(f);
        }
        let pivot = i128::from(m.get(r, r));
        if numerator % pivot != 0 {
            return Ok(false);
        }
        let value = numerator / pivot;
        if value < 0 {
            return Ok(false);
        }
        *slot = u64::try_from(value)
            .map_err(|_| SolveError::overflow("solving a basic variable"))?;
    }
    Ok(true)
}

fn assemble(reduction: &Reduction, basic: &[u64], free: &[u64]) -> Solution {
    let mut presses = vec![0; reduction.buttons()];
    for (col, &value) in basic.iter().chain(free).enumerate() {
        presses[reduction.columns()[col]] = value;
    }
    Solution::new(presses)
}

/// Enumerates all free-variable assignments within their bounds and keeps the
/// one with the fewest total presses.
#[tracing::instrument(level = "debug", skip_all, fields(rank = reduction.rank(), free = reduction.free_variables()))]
pub fn minimize(
    reduction: &Reduction,
    schema: &JoltageSchema,
    budget: &Budget,
) -> Result<Option<Solution>, SolveError> {
    let bounds = free_variable_bounds(reduction, schema);
    debug!(?bounds, "free variable bounds");

    let mut meter = budget.start();
    let mut odometer = Odometer::new(bounds);
    let mut basic = vec![0; reduction.rank()];
    let mut best: Option<(u64, Vec<u64>, Vec<u64>)> = None;

    loop {
        meter.tick()?;
        let free = odometer.current();
        let free_total: u64 = free.iter().sum();

        let worth_trying = best.as_ref().map_or(true, |(total, _, _)| free_total < *total);
        if worth_trying && solve_basic(reduction, free, &mut basic)? {
            let total = basic
                .iter()
                .try_fold(free_total, |acc, &v| acc.checked_add(v))
                .ok_or_else(|| SolveError::overflow("summing presses"))?;
            if best.as_ref().map_or(true, |(best_total, _, _)| total < *best_total) {
                trace!(total, ?free, "improved");
                best = Some((total, basic.clone(), free.to_vec()));
            }
        }

        if !odometer.advance() {
            break;
        }
    }

    debug!(steps = meter.steps(), best = ?best.as_ref().map(|b| b.0), "enumeration finished");
    Ok(best.map(|(_, basic, free)| assemble(reduction, &basic, &free)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::elimination::reduce;

    fn solve(weights: &[Vec<u32>], targets: Vec<u64>) -> Result<Option<Solution>, SolveError> {
        let schema = JoltageSchema::from_weights(weights, targets);
        match reduce(&schema)? {
            Some(reduction) => minimize(&reduction, &schema, &Budget::unlimited()),
            None => Ok(None),
        }
    }

    #[test]
    fn odometer_covers_every_assignment_within_bounds() {
        let bounds = vec![2, 0, 3];
        let mut odometer = Odometer::new(bounds.clone());
        let mut seen = Vec::new();
        loop {
            seen.push(odometer.current().to_vec());
            if !odometer.advance() {
                break;
            }
        }
        assert_eq!(seen.len(), 12);
        assert_eq!(seen[0], vec![0, 0, 0]);
        assert_eq!(seen[1], vec![1, 0, 0]);
        assert_eq!(seen[3], vec![0, 0, 1]);
        assert!(seen
            .iter()
            .all(|a| a.iter().zip(&bounds).all(|(v, b)| v <= b)));
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn odometer_without_digits_yields_once() {
        let mut odometer = Odometer::new(Vec::new());
        assert!(odometer.current().is_empty());
        assert!(!odometer.advance());
    }

    #[rstest]
    #[case::overlapping_buttons(vec![vec![1, 0], vec![0, 1], vec![1, 1]], vec![2, 3], Some(3))]
    #[case::single_button_two_counters(vec![vec![1, 1]], vec![5, 5], Some(5))]
    #[case::all_zero_targets(vec![vec![1, 0], vec![0, 1]], vec![0, 0], Some(0))]
    #[case::indivisible_target(vec![vec![2]], vec![3], None)]
    #[case::example_machine(
        vec![
            vec![0, 0, 0, 1],
            vec![0, 1, 0, 1],
            vec![0, 0, 1, 0],
            vec![0, 0, 1, 1],
            vec![1, 0, 1, 0],
            vec![1, 1, 0, 0],
        ],
        vec![3, 5, 4, 7],
        Some(10)
    )]
    fn finds_minimal_total(
        #[case] weights: Vec<Vec<u32>>,
        #[case] targets: Vec<u64>,
        #[case] expected: Option<u64>,
    ) -> Result<(), SolveError> {
        let schema = JoltageSchema::from_weights(&weights, targets.clone());
        let solution = solve(&weights, targets)?;
        assert_eq!(solution.as_ref().map(Solution::total), expected);
        if let Some(solution) = solution {
            assert!(solution.satisfies(&schema));
        }
        Ok(())
    }

    #[test]
    fn bounds_follow_smallest_target() -> Result<(), SolveError> {
        let schema = JoltageSchema::from_weights(&[vec![1, 0], vec![0, 1], vec![1, 1]], vec![2, 3]);
        let reduction = reduce(&schema)?.expect("system is consistent");
        let bounds = free_variable_bounds(&reduction, &schema);
        assert_eq!(bounds.len(), 1);
        let free_button = reduction.free_button(0);
        assert_eq!(bounds[0], schema.buttons()[free_button].upper_bound(schema.targets()));
        Ok(())
    }

    #[test]
    fn respects_step_budget() -> Result<(), SolveError> {
        let schema = JoltageSchema::from_weights(
            &[vec![1, 0], vec![0, 1], vec![1, 1], vec![1, 1]],
            vec![40, 40],
        );
        let reduction = reduce(&schema)?.expect("system is consistent");
        let outcome = minimize(&reduction, &schema, &Budget::steps(5));
        assert!(matches!(outcome, Err(SolveError::BudgetExhausted { .. })));
        Ok(())
    }
}
