use crate::dof::DofSelection;
use crate::dynamics::DynamicsModel;
use crate::error::{ReduceError, Result};
use crate::expr::{Expr, Symbol};
use crate::matrix::{ExprMatrix, solve_linear, sub_vectors};
use crate::reduce::{reduce_matrix, reduce_vector};

/// Reduced equations of motion `A q̈ = B` and their symbolic solution.
#[derive(Clone, Debug)]
pub struct AccelerationSolution {
    /// `k×k` active block of the mass matrix.
    pub mass_matrix: ExprMatrix,
    /// Active entries of `τ − V − G − F`.
    pub generalized_force: Vec<Expr>,
    /// `q̈` for the active joints, still in terms of every full-order symbol.
    pub accelerations: Vec<Expr>,
}

/// Solve the active-DOF block of the full-order dynamics for `q̈`.
///
/// `torques` is aligned with the full DOF ordering.
pub fn solve_accelerations(
    model: &dyn DynamicsModel,
    torques: &[Symbol],
    selection: &DofSelection,
) -> Result<AccelerationSolution> {
    let n = model.dof();
    if selection.dof() != n {
        return Err(ReduceError::ShapeMismatch {
            expected: n,
            found: selection.dof(),
            what: "DOF selection size",
        });
    }
    if torques.len() != n {
        return Err(ReduceError::ShapeMismatch {
            expected: n,
            found: torques.len(),
            what: "torque symbols",
        });
    }

    let tau: Vec<Expr> = torques.iter().map(Expr::from).collect();
    let mut b_full = tau;
    for forces in [
        model.velocity_forces(),
        model.gravity_forces(),
        model.friction_forces(),
    ] {
        b_full = sub_vectors(&b_full, &forces)?;
    }

    let active = selection.active();
    let generalized_force = reduce_vector(&b_full, active)?;
    let mass_matrix = reduce_matrix(&model.mass_matrix(), active)?;
    let accelerations = solve_linear(&mass_matrix, &generalized_force)?;

    Ok(AccelerationSolution {
        mass_matrix,
        generalized_force,
        accelerations,
    })
}
