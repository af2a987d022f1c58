//! Full-order dynamics provider contract and derivation helpers.

use crate::constants::{TORQUE_PREFIX, VELOCITY_SUFFIX};
use crate::error::Result;
use crate::expr::{Expr, Symbol};
use crate::matrix::ExprMatrix;

/// Source of the full-order equations of motion
/// `M(q) q̈ + V(q, q̇) + G(q) + F(q̇) = τ`.
pub trait DynamicsModel {
    /// Base name used for generated models.
    fn name(&self) -> &str;

    /// Full-order DOF count `N`.
    fn dof(&self) -> usize;

    fn position_symbols(&self) -> &[Symbol];

    fn velocity_symbols(&self) -> &[Symbol];

    /// Configure physical parameters. Order and meaning are model specific.
    fn set_user_params(&mut self, params: &[f64]) -> Result<()>;

    /// `N×N` mass/inertia matrix.
    fn mass_matrix(&self) -> ExprMatrix;

    /// Velocity-dependent (Coriolis/centripetal) forces.
    fn velocity_forces(&self) -> Vec<Expr>;

    fn gravity_forces(&self) -> Vec<Expr>;

    fn friction_forces(&self) -> Vec<Expr>;

    /// Positions followed by velocities (`2N` symbols).
    fn state_symbols(&self) -> Vec<Symbol> {
        let mut out = self.position_symbols().to_vec();
        out.extend_from_slice(self.velocity_symbols());
        out
    }
}

/// Actuator torque symbols `T0..T{n-1}`.
pub fn torque_symbols(n: usize) -> Vec<Symbol> {
    (0..n).map(|i| Symbol::indexed(TORQUE_PREFIX, i)).collect()
}

/// Position symbols `{prefix}0..` and the matching `_dot` velocity symbols.
pub fn joint_symbols(prefix: &str, n: usize) -> (Vec<Symbol>, Vec<Symbol>) {
    let q: Vec<Symbol> = (0..n).map(|i| Symbol::indexed(prefix, i)).collect();
    let qd = q
        .iter()
        .map(|s| Symbol::new(&format!("{}{VELOCITY_SUFFIX}", s.name())))
        .collect();
    (q, qd)
}

/// Coriolis and centripetal forces implied by `M(q)`.
///
/// `V_i = Σ_jk c_ijk q̇_j q̇_k` with the Christoffel symbols of the first
/// kind `c_ijk = ½ (∂M_ij/∂q_k + ∂M_ik/∂q_j − ∂M_jk/∂q_i)`.
pub fn coriolis_forces(mass: &ExprMatrix, q: &[Symbol], qd: &[Expr]) -> Vec<Expr> {
    let n = q.len();
    let dm: Vec<ExprMatrix> = q.iter().map(|s| mass.diff(s)).collect();

    (0..n)
        .map(|i| {
            let mut acc = Expr::zero();
            for j in 0..n {
                for k in 0..n {
                    let c = (dm[k].get(i, j) + dm[j].get(i, k) - dm[i].get(j, k)) * 0.5;
                    if c.is_zero() {
                        continue;
                    }
                    acc = acc + c * &qd[j] * &qd[k];
                }
            }
            acc
        })
        .collect()
}

/// Generalized forces `∂U/∂q_i` of a potential energy expression.
pub fn potential_forces(potential: &Expr, q: &[Symbol]) -> Vec<Expr> {
    q.iter().map(|s| potential.diff(s)).collect()
}
