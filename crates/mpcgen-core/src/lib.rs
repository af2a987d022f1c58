//! Reduced-order dynamics for MPC code generation.
//!
//! Takes a full-order symbolic multi-body model `M(q) q̈ + V + G + F = τ`,
//! keeps a chosen subset of its joints, freezes the rest at zero, and
//! assembles the first-order system `ẋ = f(x, u)` over the active joints.
//!
//! Zero I/O. Pure symbolic math with no opinions about code generation or
//! persistence.

pub mod accel;
pub mod assemble;
pub mod chain;
pub mod constants;
pub mod dof;
pub mod dynamics;
pub mod eliminate;
pub mod error;
pub mod expr;
pub mod matrix;
pub mod moe;
pub mod reduce;
pub mod serde_compat;
pub mod tape;

pub use accel::{AccelerationSolution, solve_accelerations};
pub use assemble::{ModelOptions, ModelParameters, ReducedModel, assemble, model_name};
pub use chain::PendulumChain;
pub use dof::DofSelection;
pub use dynamics::{DynamicsModel, torque_symbols};
pub use eliminate::{eliminate_frozen, frozen_symbols};
pub use error::{ReduceError, Result};
pub use expr::{Expr, Func, Node, Symbol, diff_all, substitute_all};
pub use matrix::{ExprMatrix, solve_linear};
pub use moe::{DEFAULT_USER_PARAMS, MOE_DOF, MoeDynamics};
pub use reduce::{reduce_matrix, reduce_vector};
pub use tape::{Op, Tape};
