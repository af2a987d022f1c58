//! Reduced-order state-space model assembly.
//!
//! Pipeline: accelerations are solved on the active block, frozen symbols
//! are substituted with zero, and the results are packed into the first
//! order form `ẋ = f(x, u)` with `x = [q_a; q̇_a]`, `u = τ_a`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::accel::solve_accelerations;
use crate::constants::{
    DEFAULT_CONTROL_BOUND, DEFAULT_SHOOTING_NODES, DEFAULT_STATE_BOUND, DEFAULT_STEP_SIZE_MS,
    DOF_MARKER, LINEAR_PREFIX,
};
use crate::dof::DofSelection;
use crate::dynamics::{DynamicsModel, torque_symbols};
use crate::eliminate::{eliminate_frozen, frozen_symbols};
use crate::error::Result;
use crate::expr::{Expr, Symbol};
use crate::serde_compat::{duration_secs, lower_bounds, upper_bounds};

/// Immutable description handed to the code generator alongside `x`, `ẋ`, `u`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    name: String,
    num_x: usize,
    num_u: usize,
    #[serde(with = "duration_secs")]
    step_size: Duration,
    num_shooting_nodes: usize,
    is_linear: bool,
    #[serde(with = "lower_bounds")]
    x_min: Vec<f64>,
    #[serde(with = "upper_bounds")]
    x_max: Vec<f64>,
    #[serde(with = "lower_bounds")]
    u_min: Vec<f64>,
    #[serde(with = "upper_bounds")]
    u_max: Vec<f64>,
}

impl ModelParameters {
    /// Record with symmetric default bounds on every state and control.
    pub fn new(
        name: String,
        num_x: usize,
        num_u: usize,
        step_size: Duration,
        num_shooting_nodes: usize,
        is_linear: bool,
    ) -> Self {
        Self {
            name,
            num_x,
            num_u,
            step_size,
            num_shooting_nodes,
            is_linear,
            x_min: vec![-DEFAULT_STATE_BOUND; num_x],
            x_max: vec![DEFAULT_STATE_BOUND; num_x],
            u_min: vec![-DEFAULT_CONTROL_BOUND; num_u],
            u_max: vec![DEFAULT_CONTROL_BOUND; num_u],
        }
    }

    /// Replace the state bounds with `[-bound, bound]` on every entry.
    pub fn with_state_bound(mut self, bound: f64) -> Self {
        self.x_min = vec![-bound; self.num_x];
        self.x_max = vec![bound; self.num_x];
        self
    }

    /// Replace the control bounds with `[-bound, bound]` on every entry.
    pub fn with_control_bound(mut self, bound: f64) -> Self {
        self.u_min = vec![-bound; self.num_u];
        self.u_max = vec![bound; self.num_u];
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_x(&self) -> usize {
        self.num_x
    }

    pub fn num_u(&self) -> usize {
        self.num_u
    }

    pub fn step_size(&self) -> Duration {
        self.step_size
    }

    pub fn num_shooting_nodes(&self) -> usize {
        self.num_shooting_nodes
    }

    pub fn is_linear(&self) -> bool {
        self.is_linear
    }

    pub fn state_bounds(&self) -> (&[f64], &[f64]) {
        (&self.x_min, &self.x_max)
    }

    pub fn control_bounds(&self) -> (&[f64], &[f64]) {
        (&self.u_min, &self.u_max)
    }
}

/// Inputs to assembly that are not part of the dynamics.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelOptions {
    pub base_name: String,
    pub linear: bool,
    pub step_size: Duration,
    pub shooting_nodes: usize,
    pub state_bound: f64,
    pub control_bound: f64,
}

impl ModelOptions {
    pub fn new(base_name: &str, linear: bool) -> Self {
        Self {
            base_name: base_name.to_string(),
            linear,
            step_size: Duration::from_millis(DEFAULT_STEP_SIZE_MS),
            shooting_nodes: DEFAULT_SHOOTING_NODES,
            state_bound: DEFAULT_STATE_BOUND,
            control_bound: DEFAULT_CONTROL_BOUND,
        }
    }
}

/// `[linear_]{base}_j{active indices}`, e.g. `linear_moe_j13`.
pub fn model_name(base_name: &str, linear: bool, selection: &DofSelection) -> String {
    let prefix = if linear { LINEAR_PREFIX } else { "" };
    format!("{prefix}{base_name}{DOF_MARKER}{}", selection.suffix())
}

/// Active-DOF state-space model, ready for code generation.
#[derive(Clone, Debug)]
pub struct ReducedModel {
    pub selection: DofSelection,
    /// `[q_a; q̇_a]`, length `2k`.
    pub x: Vec<Expr>,
    /// `[q̇_a; q̈_a]`, length `2k`.
    pub x_dot: Vec<Expr>,
    /// `τ_a`, length `k`.
    pub u: Vec<Expr>,
    /// Symbols substituted with zero, positions first.
    pub frozen: Vec<Symbol>,
    pub params: ModelParameters,
}

impl ReducedModel {
    /// Whether zero substitution was skipped because every joint is active.
    pub fn is_full_order(&self) -> bool {
        self.selection.is_full()
    }
}

/// Run the whole reduction for one DOF selection.
pub fn assemble(
    model: &dyn DynamicsModel,
    selection: &DofSelection,
    options: &ModelOptions,
) -> Result<ReducedModel> {
    let torques = torque_symbols(model.dof());
    let solution = solve_accelerations(model, &torques, selection)?;

    let frozen = frozen_symbols(model, selection);
    let accelerations = eliminate_frozen(solution.accelerations, &frozen);

    let active = selection.active();
    let q = model.position_symbols();
    let qd = model.velocity_symbols();
    let q_a: Vec<Expr> = active.iter().map(|&i| Expr::from(&q[i])).collect();
    let qd_a: Vec<Expr> = active.iter().map(|&i| Expr::from(&qd[i])).collect();
    let u: Vec<Expr> = active.iter().map(|&i| Expr::from(&torques[i])).collect();

    let x: Vec<Expr> = q_a.into_iter().chain(qd_a.iter().cloned()).collect();
    let x_dot: Vec<Expr> = qd_a.into_iter().chain(accelerations).collect();

    let params = ModelParameters::new(
        model_name(&options.base_name, options.linear, selection),
        x.len(),
        u.len(),
        options.step_size,
        options.shooting_nodes,
        options.linear,
    )
    .with_state_bound(options.state_bound)
    .with_control_bound(options.control_bound);

    Ok(ReducedModel {
        selection: selection.clone(),
        x,
        x_dot,
        u,
        frozen,
        params,
    })
}
