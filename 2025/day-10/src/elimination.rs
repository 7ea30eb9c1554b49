use num_integer::Integer;
use tracing::debug;

use crate::error::SolveError;
use crate::matrix::Matrix;
use crate::schema::JoltageSchema;

/// Result of Gauss-Jordan reduction over the integers.
///
/// Row `r` has its basic variable in column `r`; columns `rank..buttons` hold
/// the free variables. The last column is the augmented target column.
#[derive(Debug, Clone)]
pub struct Reduction {
    matrix: Matrix,
    /// Original button index of each coefficient column.
    columns: Vec<usize>,
}

impl Reduction {
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn rank(&self) -> usize {
        self.matrix.rows()
    }

    pub fn buttons(&self) -> usize {
        self.columns.len()
    }

    pub fn free_variables(&self) -> usize {
        self.buttons() - self.rank()
    }

    /// Original button index behind free variable `j`.
    pub fn free_button(&self, j: usize) -> usize {
        self.columns[self.rank() + j]
    }
}

/// Augmented matrix together with the button order of its columns.
///
/// Columns only move through [`System::swap_button_columns`], which keeps the
/// two in step.
struct System {
    matrix: Matrix,
    columns: Vec<usize>,
}

impl System {
    fn new(schema: &JoltageSchema) -> Result<Self, SolveError> {
        let buttons = schema.buttons().len();
        let mut matrix = Matrix::new(schema.counters(), buttons + 1);

        for (r, &target) in schema.targets().iter().enumerate() {
            for (c, button) in schema.buttons().iter().enumerate() {
                matrix.set(r, c, i64::from(button.weight(r)));
            }
            let target =
                i64::try_from(target).map_err(|_| SolveError::overflow("loading targets"))?;
            matrix.set(r, buttons, target);
        }

        Ok(Self {
            matrix,
            columns: (0..buttons).collect(),
        })
    }

    fn buttons(&self) -> usize {
        self.columns.len()
    }

    fn swap_button_columns(&mut self, a: usize, b: usize) {
        self.matrix.swap_columns(a, b);
        self.columns.swap(a, b);
    }

    /// Finds the first column at or after `from` with a non-zero entry in some
    /// row `>= p`, and swaps that row up into position `p`.
    fn find_pivot(&mut self, p: usize, from: usize) -> Option<usize> {
        for col in from..self.buttons() {
            if let Some(r) = (p..self.matrix.rows()).find(|&r| self.matrix.get(r, col) != 0) {
                self.matrix.swap_rows(p, r);
                return Some(col);
            }
        }
        None
    }

    /// Clears `col` from every row except the pivot row `p`, staying in integers.
    fn eliminate(&mut self, p: usize, col: usize) -> Result<(), SolveError> {
        let v0 = self.matrix.get(p, col);

        for r in 0..self.matrix.rows() {
            if r == p {
                continue;
            }
            let v1 = self.matrix.get(r, col);
            if v1 == 0 {
                continue;
            }
            if v0.abs() != v1.abs() {
                // lcm(|v0|, |v1|) / |v1|
                let scale = (v0 / v0.gcd(&v1)).abs();
                self.matrix.scale_row(r, scale)?;
            }
            let k = self.matrix.get(r, col) / v0;
            self.matrix.subtract_scaled_row(r, p, k)?;
            debug_assert_eq!(self.matrix.get(r, col), 0);
        }
        Ok(())
    }

    /// Drops zero rows, reduces rows by their gcd and removes duplicates.
    ///
    /// Returns `false` when a row reads `0 = b` with `b != 0`.
    fn cleanup(&mut self) -> bool {
        let n = self.buttons();

        let mut r = 0;
        while r < self.matrix.rows() {
            let row = self.matrix.row(r);
            if row[..n].iter().all(|&v| v == 0) {
                if row[n] != 0 {
                    return false;
                }
                self.matrix.remove_row(r);
                continue;
            }
            let g = self.matrix.row_gcd(r);
            if g > 1 {
                self.matrix.divide_row(r, g);
            }
            r += 1;
        }

        let mut r = 1;
        while r < self.matrix.rows() {
            if (0..r).any(|q| self.matrix.row(q) == self.matrix.row(r)) {
                self.matrix.remove_row(r);
            } else {
                r += 1;
            }
        }
        true
    }

    /// Whether `col` has exactly one non-zero entry and it sits in `row`.
    fn is_basic_for(&self, col: usize, row: usize) -> bool {
        self.matrix.get(row, col) != 0
            && (0..self.matrix.rows()).all(|r| r == row || self.matrix.get(r, col) == 0)
    }

    /// Moves each row's basic variable onto the diagonal.
    fn fix_columns(&mut self) -> Result<(), SolveError> {
        for i in 0..self.matrix.rows() {
            if i < self.buttons() && self.is_basic_for(i, i) {
                continue;
            }
            let replacement = (i + 1..self.buttons())
                .find(|&c| self.is_basic_for(c, i))
                .ok_or(SolveError::NoBasicColumn { row: i })?;
            self.swap_button_columns(i, replacement);
        }
        Ok(())
    }
}

/// Reduces the schema's augmented system `[A | b]`.
///
/// Returns `Ok(None)` when the equations are inconsistent even over the
/// rationals, so no press counts can exist.
#[tracing::instrument(level = "debug", skip_all, fields(counters = schema.counters(), buttons = schema.buttons().len()))]
pub fn reduce(schema: &JoltageSchema) -> Result<Option<Reduction>, SolveError> {
    let mut system = System::new(schema)?;

    if !system.cleanup() {
        return Ok(None);
    }

    let mut p = 0;
    let mut next_col = 0;
    while p < system.matrix.rows() {
        let Some(col) = system.find_pivot(p, next_col.max(p)) else {
            break;
        };
        system.eliminate(p, col)?;
        if !system.cleanup() {
            debug!(pivot = p, "inconsistent row after elimination");
            return Ok(None);
        }
        next_col = col + 1;
        p += 1;
    }

    system.fix_columns()?;

    let reduction = Reduction {
        matrix: system.matrix,
        columns: system.columns,
    };
    debug!(
        rank = reduction.rank(),
        free = reduction.free_variables(),
        "reduced system"
    );
    Ok(Some(reduction))
}
