use miette::*;
use tracing::warn;

use crate::parser::parse_machines;
use crate::schema::{LightSchema, Row};

/// Toggle system over GF(2).
struct LightSystem {
    /// Augmented matrix [A | b] in Reduced Row Echelon Form
    matrix: Vec<Row>,
    num_vars: usize,
    num_eqs: usize,
    /// Maps column index (variable) to pivot row index
    col_to_pivot: Vec<Option<usize>>,
    /// Indices of free variables (columns without pivots)
    free_vars: Vec<usize>,
}

impl LightSystem {
    fn new(schema: &LightSchema) -> Self {
        let num_eqs = schema.target.len();
        let num_vars = schema.buttons.len();

        let mut matrix = vec![Row::repeat(false, num_vars + 1); num_eqs];
        for (r, row) in matrix.iter_mut().enumerate() {
            for (c, button) in schema.buttons.iter().enumerate() {
                if button[r] {
                    row.set(c, true);
                }
            }
            if schema.target[r] {
                row.set(num_vars, true);
            }
        }

        Self {
            matrix,
            num_vars,
            num_eqs,
            col_to_pivot: vec![None; num_vars],
            free_vars: Vec::new(),
        }
    }

    /// Brings the matrix to RREF. Returns `false` when a row reads `0 = 1`.
    fn rref(&mut self) -> bool {
        let mut pivot_row = 0;

        for c in 0..self.num_vars {
            if pivot_row >= self.num_eqs {
                self.free_vars.push(c);
                continue;
            }

            let Some(r) = (pivot_row..self.num_eqs).find(|&r| self.matrix[r][c]) else {
                self.free_vars.push(c);
                continue;
            };

            self.matrix.swap(pivot_row, r);
            self.col_to_pivot[c] = Some(pivot_row);

            let pivot_vec = self.matrix[pivot_row].clone();
            for i in 0..self.num_eqs {
                if i != pivot_row && self.matrix[i][c] {
                    self.matrix[i] ^= &pivot_vec;
                }
            }
            pivot_row += 1;
        }

        (pivot_row..self.num_eqs).all(|r| !self.matrix[r][self.num_vars])
    }

    /// Particular solution (free variables at 0) and a null space basis.
    fn solution_space(&self) -> (Row, Vec<Row>) {
        let mut particular = Row::repeat(false, self.num_vars);
        for (c, pivot) in self.col_to_pivot.iter().enumerate() {
            if let Some(r) = *pivot {
                if self.matrix[r][self.num_vars] {
                    particular.set(c, true);
                }
            }
        }

        // x_f = 1 for one free variable; each pivot variable then equals its row's
        // coefficient in column f, since the other free variables are zero.
        let basis = self
            .free_vars
            .iter()
            .map(|&f| {
                let mut v = Row::repeat(false, self.num_vars);
                v.set(f, true);
                for (c, pivot) in self.col_to_pivot.iter().enumerate() {
                    if let Some(r) = *pivot {
                        if self.matrix[r][f] {
                            v.set(c, true);
                        }
                    }
                }
                v
            })
            .collect();

        (particular, basis)
    }

    /// Fewest presses, walking the null space in Gray code order so each step
    /// is a single XOR.
    fn min_presses(&mut self) -> Option<usize> {
        if !self.rref() {
            return None;
        }

        let (mut current, basis) = self.solution_space();
        let mut best = current.count_ones();

        let combinations: usize = 1 << basis.len();
        for i in 1..combinations {
            current ^= &basis[i.trailing_zeros() as usize];
            best = best.min(current.count_ones());
        }

        Some(best)
    }
}

/// Fewest button presses that leave exactly the target lights on.
pub fn min_light_presses(schema: &LightSchema) -> Option<usize> {
    LightSystem::new(schema).min_presses()
}

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let parsed = parse_machines(input);
    if let Some(failure) = parsed.failure {
        if parsed.machines.is_empty() {
            return Err(failure).wrap_err("no machines could be read");
        }
    }

    let total: usize = parsed
        .machines
        .iter()
        .enumerate()
        .filter_map(|(idx, machine)| {
            let presses = min_light_presses(&machine.light_schema());
            if presses.is_none() {
                warn!(machine = idx + 1, "lights cannot be reached");
            }
            presses
        })
        .sum();

    Ok(total.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::parser::parse_line;

    #[test]
    fn it_works() -> Result<()> {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";
        assert_eq!("7", process(input)?);
        Ok(())
    }

    #[rstest]
    #[case("[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}", Some(2))]
    #[case("[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}", Some(3))]
    #[case("[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}", Some(2))]
    #[case("[....] (0,1) {1,1,0,0}", Some(0))]
    #[case("[#.] (1) {1,1}", None)]
    fn min_presses_per_machine(#[case] line: &str, #[case] expected: Option<usize>) -> Result<()> {
        let machine = parse_line(line).map_err(|e| miette!("{}", e))?;
        assert_eq!(min_light_presses(&machine.light_schema()), expected);
        Ok(())
    }

    #[test]
    fn fails_when_nothing_parses() {
        assert!(process("not a machine").is_err());
    }
}
