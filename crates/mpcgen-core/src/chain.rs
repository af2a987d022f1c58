//! Symbolic N-link planar pendulum.
//!
//! Joint angles are absolute (measured from the downward vertical), so the
//! equations take the classic compact form:
//!
//! - `M_ij = L_i L_j cos(θ_i − θ_j) Σ_{k ≥ max(i,j)} m_k`
//! - `V_i  = Σ_j L_i L_j sin(θ_i − θ_j) ω_j² Σ_{k ≥ max(i,j)} m_k`
//! - `G_i  = g L_i sin(θ_i) Σ_{k ≥ i} m_k`
//! - `F_i  = b ω_i` (viscous joint damping)

use crate::constants::GRAVITY;
use crate::dynamics::{DynamicsModel, joint_symbols};
use crate::error::{ReduceError, Result};
use crate::expr::{Expr, Symbol};
use crate::matrix::ExprMatrix;

const DEFAULT_MASS: f64 = 1.0;
const DEFAULT_LENGTH: f64 = 1.0;
const DEFAULT_DAMPING: f64 = 0.01;

pub struct PendulumChain {
    links: usize,
    masses: Vec<f64>,
    lengths: Vec<f64>,
    damping: f64,
    q: Vec<Symbol>,
    qd: Vec<Symbol>,
    // One node per symbol so every derived expression shares it.
    q_expr: Vec<Expr>,
    qd_expr: Vec<Expr>,
}

impl PendulumChain {
    /// Chain of `links` unit-mass, unit-length links.
    pub fn new(links: usize) -> Self {
        let (q, qd) = joint_symbols("th", links);
        let q_expr = q.iter().map(Expr::from).collect();
        let qd_expr = qd.iter().map(Expr::from).collect();
        Self {
            links,
            masses: vec![DEFAULT_MASS; links],
            lengths: vec![DEFAULT_LENGTH; links],
            damping: DEFAULT_DAMPING,
            q,
            qd,
            q_expr,
            qd_expr,
        }
    }

    /// `Σ_{k ≥ from} m_k`
    fn tail_mass(&self, from: usize) -> f64 {
        self.masses[from..].iter().sum()
    }

    fn coupling(&self, i: usize, j: usize) -> f64 {
        self.tail_mass(i.max(j)) * self.lengths[i] * self.lengths[j]
    }
}

impl DynamicsModel for PendulumChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn dof(&self) -> usize {
        self.links
    }

    fn position_symbols(&self) -> &[Symbol] {
        &self.q
    }

    fn velocity_symbols(&self) -> &[Symbol] {
        &self.qd
    }

    /// `[m_1..m_N, L_1..L_N]`, optionally followed by the joint damping.
    fn set_user_params(&mut self, params: &[f64]) -> Result<()> {
        let n = self.links;
        if params.len() != 2 * n && params.len() != 2 * n + 1 {
            return Err(ReduceError::InvalidParams(format!(
                "a {n}-link chain takes {} or {} values, got {}",
                2 * n,
                2 * n + 1,
                params.len()
            )));
        }
        if let Some(bad) = params[..2 * n].iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(ReduceError::InvalidParams(format!(
                "masses and lengths must be positive and finite, got {bad}"
            )));
        }
        let damping = params.get(2 * n).copied().unwrap_or(self.damping);
        if !(damping.is_finite() && damping >= 0.0) {
            return Err(ReduceError::InvalidParams(format!(
                "damping must be non-negative and finite, got {damping}"
            )));
        }
        self.masses = params[..n].to_vec();
        self.lengths = params[n..2 * n].to_vec();
        self.damping = damping;
        Ok(())
    }

    fn mass_matrix(&self) -> ExprMatrix {
        ExprMatrix::from_fn(self.links, self.links, |i, j| {
            (&self.q_expr[i] - &self.q_expr[j]).cos() * self.coupling(i, j)
        })
    }

    fn velocity_forces(&self) -> Vec<Expr> {
        (0..self.links)
            .map(|i| {
                let mut acc = Expr::zero();
                for j in 0..self.links {
                    let s = (&self.q_expr[i] - &self.q_expr[j]).sin();
                    acc = acc + s * self.coupling(i, j) * self.qd_expr[j].powi(2);
                }
                acc
            })
            .collect()
    }

    fn gravity_forces(&self) -> Vec<Expr> {
        (0..self.links)
            .map(|i| self.q_expr[i].sin() * (GRAVITY * self.lengths[i] * self.tail_mass(i)))
            .collect()
    }

    fn friction_forces(&self) -> Vec<Expr> {
        self.qd_expr.iter().map(|w| w * self.damping).collect()
    }
}
