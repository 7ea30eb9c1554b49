use tracing::debug;

use crate::config::{Budget, Meter};
use crate::error::SolveError;
use crate::schema::{JoltageSchema, Solution};

/// State threaded through the depth-first search.
struct SearchContext<'a> {
    schema: &'a JoltageSchema,
    /// Button indices in search order, least constrained last.
    order: Vec<usize>,
    /// Upper bound of `order[d]`.
    bounds: Vec<u64>,
    /// `reach[d][c]`: most that buttons `order[d..]` can still add to counter `c`.
    reach: Vec<Vec<u64>>,
    sums: Vec<u64>,
    presses: Vec<u64>,
    pressed: u64,
    best: Option<(u64, Vec<u64>)>,
    meter: Meter<'a>,
}

impl<'a> SearchContext<'a> {
    fn new(schema: &'a JoltageSchema, budget: &'a Budget) -> Self {
        let upper = schema.upper_bounds();
        let mut order: Vec<usize> = (0..schema.buttons().len()).collect();
        order.sort_by_key(|&b| upper[b]);
        let bounds: Vec<u64> = order.iter().map(|&b| upper[b]).collect();

        let counters = schema.counters();
        let mut reach = vec![vec![0u64; counters]; order.len() + 1];
        for d in (0..order.len()).rev() {
            let button = &schema.buttons()[order[d]];
            for c in 0..counters {
                let own = u64::from(button.weight(c)).saturating_mul(bounds[d]);
                reach[d][c] = reach[d + 1][c].saturating_add(own);
            }
        }

        Self {
            schema,
            order,
            bounds,
            reach,
            sums: vec![0; counters],
            presses: vec![0; schema.buttons().len()],
            pressed: 0,
            best: None,
            meter: budget.start(),
        }
    }

    /// Whether the remaining buttons can still land every counter exactly.
    fn feasible(&self, depth: usize) -> bool {
        self.sums
            .iter()
            .zip(self.schema.targets())
            .zip(&self.reach[depth])
            .all(|((&sum, &target), &reach)| sum <= target && target - sum <= reach)
    }

    /// Presses of `order[depth]` before some counter it feeds would overshoot.
    fn local_bound(&self, depth: usize) -> u64 {
        let button = &self.schema.buttons()[self.order[depth]];
        button
            .weights()
            .iter()
            .zip(self.sums.iter().zip(self.schema.targets()))
            .filter(|&(&w, _)| w > 0)
            .map(|(&w, (&sum, &target))| (target - sum) / u64::from(w))
            .min()
            .unwrap_or(0)
            .min(self.bounds[depth])
    }

    fn press(&mut self, depth: usize, k: u64) {
        let b = self.order[depth];
        for (sum, &w) in self.sums.iter_mut().zip(self.schema.buttons()[b].weights()) {
            *sum += u64::from(w) * k;
        }
        self.presses[b] += k;
        self.pressed += k;
    }

    fn release(&mut self, depth: usize, k: u64) {
        let b = self.order[depth];
        for (sum, &w) in self.sums.iter_mut().zip(self.schema.buttons()[b].weights()) {
            *sum -= u64::from(w) * k;
        }
        self.presses[b] -= k;
        self.pressed -= k;
    }

    fn dfs(&mut self, depth: usize) -> Result<(), SolveError> {
        self.meter.tick()?;

        if self
            .best
            .as_ref()
            .is_some_and(|(total, _)| self.pressed >= *total)
        {
            return Ok(());
        }
        if !self.feasible(depth) {
            return Ok(());
        }
        if depth == self.order.len() {
            // reach is zero past the last button, so feasibility means an exact hit
            self.best = Some((self.pressed, self.presses.clone()));
            return Ok(());
        }

        for k in 0..=self.local_bound(depth) {
            self.press(depth, k);
            let outcome = self.dfs(depth + 1);
            self.release(depth, k);
            outcome?;
        }
        Ok(())
    }
}

/// Exhaustive depth-first search for the fewest presses.
///
/// Exponential in the number of buttons; meant for small machines and for
/// checking the elimination engine.
#[tracing::instrument(level = "debug", skip_all, fields(buttons = schema.buttons().len()))]
pub fn minimize(schema: &JoltageSchema, budget: &Budget) -> Result<Option<Solution>, SolveError> {
    let mut ctx = SearchContext::new(schema, budget);
    ctx.dfs(0)?;
    debug!(
        nodes = ctx.meter.steps(),
        best = ?ctx.best.as_ref().map(|b| b.0),
        "search finished"
    );
    Ok(ctx.best.map(|(_, presses)| Solution::new(presses)))
}
