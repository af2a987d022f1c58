//! Active-DOF submatrix and subvector extraction.
//!
//! Row/column `i` of a reduced quantity is active-set element `i`; no
//! reordering beyond the selector's sort is applied.

use crate::error::{ReduceError, Result};
use crate::expr::Expr;
use crate::matrix::ExprMatrix;

fn check_range(active: &[usize], len: usize) -> Result<()> {
    match active.iter().find(|&&i| i >= len) {
        Some(&index) => Err(ReduceError::DofOutOfRange { index, dof: len }),
        None => Ok(()),
    }
}

/// `k×k` matrix with entry `(i, j) = full(active[i], active[j])`.
pub fn reduce_matrix(full: &ExprMatrix, active: &[usize]) -> Result<ExprMatrix> {
    if !full.is_square() {
        return Err(ReduceError::ShapeMismatch {
            expected: full.nrows(),
            found: full.ncols(),
            what: "full-order mass matrix columns",
        });
    }
    check_range(active, full.nrows())?;
    let k = active.len();
    Ok(ExprMatrix::from_fn(k, k, |i, j| {
        full.get(active[i], active[j]).clone()
    }))
}

/// Length-`k` vector with entry `i = full[active[i]]`.
pub fn reduce_vector(full: &[Expr], active: &[usize]) -> Result<Vec<Expr>> {
    check_range(active, full.len())?;
    Ok(active.iter().map(|&i| full[i].clone()).collect())
}
