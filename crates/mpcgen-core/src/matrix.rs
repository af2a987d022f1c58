use crate::error::{ReduceError, Result};
use crate::expr::{Expr, Symbol, diff_all};

/// Dense row-major matrix of expressions.
#[derive(Clone, Debug, PartialEq)]
pub struct ExprMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Expr>,
}

impl ExprMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Expr::zero(); rows * cols],
        }
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> Expr) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    /// Build from row vectors; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        for row in &rows {
            if row.len() != cols {
                return Err(ReduceError::ShapeMismatch {
                    expected: cols,
                    found: row.len(),
                    what: "matrix row",
                });
            }
        }
        let n = rows.len();
        Ok(Self {
            rows: n,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn get(&self, i: usize, j: usize) -> &Expr {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &self.data[i * self.cols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: Expr) {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        self.data[i * self.cols + j] = value;
    }

    /// Entry-wise partial derivative with respect to `var`.
    pub fn diff(&self, var: &Symbol) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: diff_all(&self.data, var),
        }
    }

    /// Entries in row-major order.
    pub fn as_slice(&self) -> &[Expr] {
        &self.data
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Jacobian `∂f_i/∂v_j` of a vector of expressions.
    pub fn jacobian(f: &[Expr], vars: &[Symbol]) -> Self {
        let columns: Vec<Vec<Expr>> = vars.iter().map(|v| diff_all(f, v)).collect();
        Self::from_fn(f.len(), vars.len(), |i, j| columns[j][i].clone())
    }
}

/// Element-wise `a - b`.
pub fn sub_vectors(a: &[Expr], b: &[Expr]) -> Result<Vec<Expr>> {
    if a.len() != b.len() {
        return Err(ReduceError::ShapeMismatch {
            expected: a.len(),
            found: b.len(),
            what: "vector difference",
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x - y).collect())
}

/// Solve `A x = b` by exact symbolic Gaussian elimination.
///
/// Pivoting is structural: the diagonal entry is kept unless it folded to
/// the constant zero, in which case the first lower row with a usable entry
/// is swapped in. Rows whose entry in the pivot column is already zero are
/// left untouched, so sparse systems stay small.
pub fn solve_linear(a: &ExprMatrix, b: &[Expr]) -> Result<Vec<Expr>> {
    let n = a.nrows();
    if !a.is_square() {
        return Err(ReduceError::ShapeMismatch {
            expected: n,
            found: a.ncols(),
            what: "linear system columns",
        });
    }
    if b.len() != n {
        return Err(ReduceError::ShapeMismatch {
            expected: n,
            found: b.len(),
            what: "linear system right-hand side",
        });
    }

    let mut m = a.clone();
    let mut rhs = b.to_vec();

    for k in 0..n {
        let pivot_row = (k..n)
            .find(|&r| !m.get(r, k).is_zero())
            .ok_or(ReduceError::Singular { column: k })?;
        m.swap_rows(k, pivot_row);
        rhs.swap(k, pivot_row);

        let pivot = m.get(k, k).clone();
        for r in k + 1..n {
            if m.get(r, k).is_zero() {
                continue;
            }
            let factor = m.get(r, k) / &pivot;
            for j in k + 1..n {
                let updated = m.get(r, j) - &factor * m.get(k, j);
                m.set(r, j, updated);
            }
            m.set(r, k, Expr::zero());
            rhs[r] = &rhs[r] - &factor * &rhs[k];
        }
    }

    let mut x = vec![Expr::zero(); n];
    for i in (0..n).rev() {
        let mut acc = rhs[i].clone();
        for j in i + 1..n {
            acc = acc - m.get(i, j) * &x[j];
        }
        x[i] = acc / m.get(i, i);
    }
    Ok(x)
}
