//! Four-DOF upper-limb exoskeleton.
//!
//! Joints, in order: elbow flexion/extension, forearm pronation/supination,
//! wrist flexion/extension, wrist radial/ulnar deviation. The forearm and
//! counterweight slide along the elbow link in discrete notches; together
//! with the shoulder rotation they set the elbow inertia and gravity load.
//!
//! `V` is derived from `M(q)` and `G` from the potential energy, so the three
//! stay mutually consistent when parameters change.

use crate::constants::GRAVITY;
use crate::dynamics::{DynamicsModel, coriolis_forces, joint_symbols, potential_forces};
use crate::error::{ReduceError, Result};
use crate::expr::{Expr, Symbol};
use crate::matrix::ExprMatrix;

pub const MOE_DOF: usize = 4;

/// Forearm notch, counterweight notch, shoulder rotation (degrees).
pub const DEFAULT_USER_PARAMS: [f64; 3] = [7.0, 4.0, 30.0];

/// Slider notch spacing (m)
const NOTCH_SPACING: f64 = 0.0127;
const MAX_NOTCH: f64 = 12.0;

const FOREARM_MASS: f64 = 0.795;
/// Forearm COM distance from the elbow axis at notch 0 (m)
const FOREARM_OFFSET: f64 = 0.072;
const COUNTERWEIGHT_MASS: f64 = 0.265;
/// Counterweight distance behind the elbow axis at notch 0 (m)
const COUNTERWEIGHT_OFFSET: f64 = 0.042;
const WRIST_MASS: f64 = 0.3;
/// Wrist axis distance beyond the forearm COM (m)
const WRIST_REACH: f64 = 0.1;
/// Wrist handle COM offset from the wrist axes (m)
const HANDLE_OFFSET: f64 = 0.02;

/// Rotor and link inertias about each joint axis (kg·m²)
const JOINT_INERTIA: [f64; MOE_DOF] = [0.0237, 0.0012, 0.0045, 0.0031];
/// Pronation/deviation cross inertia (kg·m²)
const CROSS_INERTIA: f64 = 0.0005;

const VISCOUS: [f64; MOE_DOF] = [0.1215, 0.0252, 0.0019, 0.0029];
const COULOMB: [f64; MOE_DOF] = [0.4080, 0.0560, 0.0183, 0.0200];
/// Slope of the `tanh` approximation of Coulomb friction at zero velocity.
const COULOMB_SHARPNESS: f64 = 10.0;

/// Lumped geometry derived from the user parameters.
#[derive(Clone, Debug, PartialEq)]
struct Geometry {
    forearm: f64,
    counterweight: f64,
    wrist: f64,
    shoulder: f64,
}

impl Geometry {
    fn from_params(params: &[f64; 3]) -> Self {
        let forearm = FOREARM_OFFSET + NOTCH_SPACING * params[0];
        Self {
            forearm,
            counterweight: COUNTERWEIGHT_OFFSET + NOTCH_SPACING * params[1],
            wrist: forearm + WRIST_REACH,
            shoulder: params[2].to_radians(),
        }
    }
}

pub struct MoeDynamics {
    geometry: Geometry,
    q: Vec<Symbol>,
    qd: Vec<Symbol>,
    q_expr: Vec<Expr>,
    qd_expr: Vec<Expr>,
}

impl Default for MoeDynamics {
    fn default() -> Self {
        Self::new()
    }
}

impl MoeDynamics {
    pub fn new() -> Self {
        let (q, qd) = joint_symbols("q", MOE_DOF);
        let q_expr = q.iter().map(Expr::from).collect();
        let qd_expr = qd.iter().map(Expr::from).collect();
        Self {
            geometry: Geometry::from_params(&DEFAULT_USER_PARAMS),
            q,
            qd,
            q_expr,
            qd_expr,
        }
    }

    /// Potential energy of the forearm, counterweight and wrist handle.
    fn potential(&self) -> Expr {
        let g = &self.geometry;
        let [q0, q1, q2, q3] = [&self.q_expr[0], &self.q_expr[1], &self.q_expr[2], &self.q_expr[3]];
        let lever = FOREARM_MASS * g.forearm - COUNTERWEIGHT_MASS * g.counterweight
            + WRIST_MASS * g.wrist;
        let vertical = GRAVITY * g.shoulder.cos();
        let lateral = GRAVITY * g.shoulder.sin();

        let elbow = q0.sin() * (vertical * lever);
        let handle = (q0 + q2).sin() * q1.cos() * (vertical * WRIST_MASS * HANDLE_OFFSET);
        let deviation = q3.sin() * q1.sin() * (lateral * WRIST_MASS * HANDLE_OFFSET);
        elbow + handle + deviation
    }
}

impl DynamicsModel for MoeDynamics {
    fn name(&self) -> &str {
        "moe"
    }

    fn dof(&self) -> usize {
        MOE_DOF
    }

    fn position_symbols(&self) -> &[Symbol] {
        &self.q
    }

    fn velocity_symbols(&self) -> &[Symbol] {
        &self.qd
    }

    /// `[forearm notch, counterweight notch, shoulder rotation (deg)]`
    fn set_user_params(&mut self, params: &[f64]) -> Result<()> {
        let params: &[f64; 3] = params.try_into().map_err(|_| {
            ReduceError::InvalidParams(format!(
                "the exoskeleton takes 3 values (forearm, counterweight, shoulder), got {}",
                params.len()
            ))
        })?;
        if let Some(bad) = params.iter().find(|v| !v.is_finite()) {
            return Err(ReduceError::InvalidParams(format!(
                "exoskeleton parameters must be finite, got {bad}"
            )));
        }
        for (label, notch) in [("forearm", params[0]), ("counterweight", params[1])] {
            if !(0.0..=MAX_NOTCH).contains(&notch) {
                return Err(ReduceError::InvalidParams(format!(
                    "{label} notch must be within 0..={MAX_NOTCH}, got {notch}"
                )));
            }
        }
        self.geometry = Geometry::from_params(params);
        Ok(())
    }

    fn mass_matrix(&self) -> ExprMatrix {
        let g = &self.geometry;
        let [_, q1, q2, q3] = [&self.q_expr[0], &self.q_expr[1], &self.q_expr[2], &self.q_expr[3]];
        let mr2 = WRIST_MASS * HANDLE_OFFSET * HANDLE_OFFSET;
        let mdr = WRIST_MASS * g.wrist * HANDLE_OFFSET;

        let elbow = JOINT_INERTIA[0]
            + FOREARM_MASS * g.forearm * g.forearm
            + COUNTERWEIGHT_MASS * g.counterweight * g.counterweight
            + WRIST_MASS * (g.wrist * g.wrist + HANDLE_OFFSET * HANDLE_OFFSET);

        let m00 = Expr::constant(elbow) + q2.cos() * (2.0 * mdr);
        let m02 = (q2.cos() * mdr + mr2) * q1.cos();
        let m03 = q1.sin() * q3.sin() * mdr;
        let m11 = q2.sin().powi(2) * mr2 + JOINT_INERTIA[1];
        let m13 = q2.cos() * CROSS_INERTIA;
        let m22 = Expr::constant(JOINT_INERTIA[2] + mr2);
        let m33 = Expr::constant(JOINT_INERTIA[3] + mr2);

        ExprMatrix::from_fn(MOE_DOF, MOE_DOF, |i, j| match (i.min(j), i.max(j)) {
            (0, 0) => m00.clone(),
            (0, 2) => m02.clone(),
            (0, 3) => m03.clone(),
            (1, 1) => m11.clone(),
            (1, 3) => m13.clone(),
            (2, 2) => m22.clone(),
            (3, 3) => m33.clone(),
            _ => Expr::zero(),
        })
    }

    fn velocity_forces(&self) -> Vec<Expr> {
        coriolis_forces(&self.mass_matrix(), &self.q, &self.qd_expr)
    }

    fn gravity_forces(&self) -> Vec<Expr> {
        potential_forces(&self.potential(), &self.q)
    }

    fn friction_forces(&self) -> Vec<Expr> {
        self.qd_expr
            .iter()
            .enumerate()
            .map(|(i, w)| w * VISCOUS[i] + (w * COULOMB_SHARPNESS).tanh() * COULOMB[i])
            .collect()
    }
}
