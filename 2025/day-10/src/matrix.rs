use std::fmt;

use num_integer::Integer;

use crate::error::SolveError;

/// Dense row-major matrix of signed integers.
///
/// Indices out of range are programming errors and panic.
#[derive(Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    pub fn from_rows(rows: &[Vec<i64>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "ragged rows passed to Matrix::from_rows"
        );
        Self {
            rows: rows.len(),
            cols,
            data: rows.concat(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of range for {}x{} matrix",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[self.index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: i64) {
        let i = self.index(row, col);
        self.data[i] = val;
    }

    pub fn row(&self, row: usize) -> &[i64] {
        assert!(row < self.rows, "row {row} out of range");
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    fn row_mut(&mut self, row: usize) -> &mut [i64] {
        assert!(row < self.rows, "row {row} out of range");
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            let (ia, ib) = (self.index(a, c), self.index(b, c));
            self.data.swap(ia, ib);
        }
    }

    pub fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for r in 0..self.rows {
            let (ia, ib) = (self.index(r, a), self.index(r, b));
            self.data.swap(ia, ib);
        }
    }

    /// Removes a row, shifting the following rows up. Row order is preserved.
    pub fn remove_row(&mut self, row: usize) {
        assert!(row < self.rows, "row {row} out of range");
        self.data.drain(row * self.cols..(row + 1) * self.cols);
        self.rows -= 1;
    }

    pub fn scale_row(&mut self, row: usize, k: i64) -> Result<(), SolveError> {
        for v in self.row_mut(row) {
            *v = v
                .checked_mul(k)
                .ok_or_else(|| SolveError::overflow("scaling a row"))?;
        }
        Ok(())
    }

    /// Divides every element of `row` by `k`.
    ///
    /// `k` must divide every element exactly, which holds for the row's gcd.
    pub fn divide_row(&mut self, row: usize, k: i64) {
        assert!(k != 0, "division of row {row} by zero");
        for v in self.row_mut(row) {
            debug_assert_eq!(*v % k, 0, "inexact row division");
            *v /= k;
        }
    }

    /// `target[*] -= k * source[*]`
    pub fn subtract_scaled_row(
        &mut self,
        target: usize,
        source: usize,
        k: i64,
    ) -> Result<(), SolveError> {
        for c in 0..self.cols {
            let delta = self
                .get(source, c)
                .checked_mul(k)
                .ok_or_else(|| SolveError::overflow("subtracting rows"))?;
            let v = self
                .get(target, c)
                .checked_sub(delta)
                .ok_or_else(|| SolveError::overflow("subtracting rows"))?;
            self.set(target, c, v);
        }
        Ok(())
    }

    /// Greatest common divisor of the absolute values in `row`, 0 for a zero row.
    pub fn row_gcd(&self, row: usize) -> i64 {
        self.row(row).iter().fold(0i64, |acc, &v| acc.gcd(&v))
    }

    pub fn is_zero_row(&self, row: usize) -> bool {
        self.row(row).iter().all(|&v| v == 0)
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix {}x{}", self.rows, self.cols)?;
        for r in 0..self.rows {
            writeln!(f, "  {:?}", self.row(r))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_rows(&[vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]])
    }

    #[test]
    fn new_is_zeroed() {
        let m = Matrix::new(2, 3);
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert!((0..2).all(|r| m.is_zero_row(r)));
    }

    #[test]
    fn swaps_rows_and_columns() {
        let mut m = sample();
        m.swap_rows(0, 2);
        assert_eq!(m.row(0), &[7, 8, 9]);
        assert_eq!(m.row(2), &[1, 2, 3]);
        m.swap_columns(0, 1);
        assert_eq!(m.row(0), &[8, 7, 9]);
        assert_eq!(m.row(1), &[5, 4, 6]);
    }

    #[test]
    fn remove_row_keeps_order() {
        let mut m = sample();
        m.remove_row(0);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.row(0), &[4, 5, 6]);
        assert_eq!(m.row(1), &[7, 8, 9]);
        m.remove_row(1);
        assert_eq!(m.rows(), 1);
        assert_eq!(m.row(0), &[4, 5, 6]);
    }

    #[test]
    fn row_arithmetic() -> Result<(), SolveError> {
        let mut m = sample();
        m.scale_row(0, 4)?;
        assert_eq!(m.row(0), &[4, 8, 12]);
        m.subtract_scaled_row(1, 0, 1)?;
        assert_eq!(m.row(1), &[0, -3, -6]);
        assert_eq!(m.row_gcd(1), 3);
        m.divide_row(1, 3);
        assert_eq!(m.row(1), &[0, -1, -2]);
        Ok(())
    }

    #[test]
    fn scale_overflow_is_reported() {
        let mut m = Matrix::from_rows(&[vec![i64::MAX, 1]]);
        assert!(matches!(
            m.scale_row(0, 2),
            Err(SolveError::Overflow { .. })
        ));
    }

    #[test]
    #[should_panic]
    fn out_of_range_access_panics() {
        sample().get(3, 0);
    }
}
