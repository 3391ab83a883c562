//! Dense square systems for the least-squares and kernel solvers.

use serde::{Deserialize, Serialize};

/// A 2D matrix of `f64` values (row-major storage).
///
/// # Examples
///
/// ```
/// use runpredict::primitives::Matrix;
///
/// let mut m = Matrix::zeros(2, 2);
/// m.set(0, 1, 3.0);
/// m.add_diagonal(1.0);
/// assert_eq!(m.shape(), (2, 2));
/// assert_eq!(m.get(0, 0), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Wraps row-major `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, &'static str> {
        if data.len() != rows * cols {
            return Err("Data length must equal rows * cols");
        }
        Ok(Self { data, rows, cols })
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Gets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Sets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Adds `value` to every diagonal element.
    pub fn add_diagonal(&mut self, value: f64) {
        for i in 0..self.rows.min(self.cols) {
            self.data[i * self.cols + i] += value;
        }
    }

    /// Lower triangular `L` with `A = L·Lᵀ`, row-major `n × n`.
    fn cholesky_factor(&self) -> Result<Vec<f64>, &'static str> {
        let n = self.rows;
        let mut l = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..=i {
                let dot: f64 = (0..j).map(|k| l[i * n + k] * l[j * n + k]).sum();
                let residual = self.get(i, j) - dot;
                if i == j {
                    if residual <= 0.0 || !residual.is_finite() {
                        return Err("Matrix is not positive definite");
                    }
                    l[i * n + i] = residual.sqrt();
                } else {
                    l[i * n + j] = residual / l[j * n + j];
                }
            }
        }
        Ok(l)
    }

    /// Solves `A·x = b` for a symmetric positive definite `A`.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not square, `b` has the wrong
    /// length, or the matrix is not positive definite.
    pub fn cholesky_solve(&self, b: &[f64]) -> Result<Vec<f64>, &'static str> {
        if self.rows != self.cols {
            return Err("Matrix must be square for Cholesky decomposition");
        }
        if self.rows != b.len() {
            return Err("Matrix rows must match vector length");
        }
        let n = self.rows;
        let l = self.cholesky_factor()?;

        // forward: L·y = b
        let mut y = vec![0.0; n];
        for i in 0..n {
            let dot: f64 = (0..i).map(|j| l[i * n + j] * y[j]).sum();
            y[i] = (b[i] - dot) / l[i * n + i];
        }
        // backward: Lᵀ·x = y
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let dot: f64 = (i + 1..n).map(|j| l[j * n + i] * x[j]).sum();
            x[i] = (y[i] - dot) / l[i * n + i];
        }
        Ok(x)
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
