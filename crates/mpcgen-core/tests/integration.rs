//! Integration tests exercising the full reduction pipeline:
//! select → reduce → solve → eliminate → assemble, across module boundaries.

use std::collections::{BTreeSet, HashMap};

use approx::assert_abs_diff_eq;
use mpcgen_core::{
    DofSelection, DynamicsModel, ModelOptions, MoeDynamics, PendulumChain, ReduceError, Symbol,
    Tape, assemble, reduce_matrix, solve_accelerations, torque_symbols,
};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

fn names(symbols: &[Symbol]) -> Vec<String> {
    symbols.iter().map(|s| s.name().to_string()).collect()
}

/// Random bindings for every state and torque symbol of `model`.
fn random_env(model: &dyn DynamicsModel, rng: &mut SmallRng) -> HashMap<Symbol, f64> {
    model
        .state_symbols()
        .into_iter()
        .chain(torque_symbols(model.dof()))
        .map(|s| (s, rng.random_range(-1.5..1.5)))
        .collect()
}

/// Scenario A: four joints, {1, 3} active, nonlinear.
#[test]
fn moe_two_active_joints() {
    let model = MoeDynamics::new();
    let sel = DofSelection::new(&[1, 3], 4).unwrap();
    let reduced = assemble(&model, &sel, &ModelOptions::new("moe", false)).unwrap();

    assert_eq!(reduced.params.name(), "moe_j13");
    assert_eq!(reduced.x.len(), 4);
    assert_eq!(reduced.x_dot.len(), 4);
    assert_eq!(reduced.u.len(), 2);
    assert!(!reduced.params.is_linear());

    assert_eq!(sel.frozen_positions(), &[0, 2]);
    assert_eq!(sel.frozen_velocities(), vec![4, 6]);
    assert_eq!(
        names(&reduced.frozen),
        vec!["q0", "q2", "q0_dot", "q2_dot"]
    );

    let allowed: BTreeSet<String> = ["q1", "q3", "q1_dot", "q3_dot", "T1", "T3"]
        .into_iter()
        .map(String::from)
        .collect();
    for e in &reduced.x_dot {
        for s in e.free_symbols() {
            assert!(allowed.contains(s.name()), "x_dot still depends on {s}");
        }
    }
}

/// Scenario B: every joint active, substitution skipped.
#[test]
fn moe_all_joints_active() {
    let model = MoeDynamics::new();
    let sel = DofSelection::new(&[0, 1, 2, 3], 4).unwrap();
    let reduced = assemble(&model, &sel, &ModelOptions::new("moe", false)).unwrap();

    assert_eq!(reduced.params.name(), "moe_j0123");
    assert!(reduced.is_full_order());
    assert_eq!(reduced.x.len(), 8);
    assert_eq!(reduced.u.len(), 4);

    // accelerations are exactly the solver output
    let solved = solve_accelerations(&model, &torque_symbols(4), &sel).unwrap();
    assert_eq!(
        Tape::new(&reduced.x_dot[4..]).listing("qdd"),
        Tape::new(&solved.accelerations).listing("qdd")
    );
}

/// Scenario D: linearized naming with a single active joint.
#[test]
fn moe_linear_single_joint() {
    let model = MoeDynamics::new();
    let sel = DofSelection::new(&[2], 4).unwrap();
    let reduced = assemble(&model, &sel, &ModelOptions::new("moe", true)).unwrap();

    assert_eq!(reduced.params.name(), "linear_moe_j2");
    assert!(reduced.params.name().starts_with("linear_"));
    assert!(reduced.params.is_linear());
    assert_eq!(reduced.params.num_x(), 2);
    assert_eq!(reduced.params.num_u(), 1);
}

#[test]
fn invalid_selections_are_rejected() {
    assert_eq!(DofSelection::new(&[], 4), Err(ReduceError::EmptyDofSet));
    assert_eq!(DofSelection::new(&[1, 1], 4), Err(ReduceError::DuplicateDof(1)));
    assert_eq!(
        DofSelection::new(&[4], 4),
        Err(ReduceError::DofOutOfRange { index: 4, dof: 4 })
    );
}

#[test]
fn identical_inputs_give_identical_models() {
    let build = || {
        let mut model = MoeDynamics::new();
        model.set_user_params(&[5.0, 2.0, 45.0]).unwrap();
        let sel = DofSelection::new(&[3, 0], 4).unwrap();
        assemble(&model, &sel, &ModelOptions::new("moe", true)).unwrap()
    };
    let a = build();
    let b = build();
    assert_eq!(a.params, b.params);
    assert_eq!(
        Tape::new(&a.x_dot).listing("x_dot"),
        Tape::new(&b.x_dot).listing("x_dot")
    );
}

/// `A q̈ = B` holds numerically at random states for the solver output.
#[test]
fn solved_accelerations_satisfy_reduced_system() {
    let mut rng = rng();
    let models: Vec<(Box<dyn DynamicsModel>, Vec<usize>)> = vec![
        (Box::new(MoeDynamics::new()), vec![0, 2, 3]),
        (Box::new(MoeDynamics::new()), vec![1]),
        (Box::new(PendulumChain::new(4)), vec![0, 1, 3]),
        (Box::new(PendulumChain::new(3)), vec![0, 1, 2]),
    ];

    for (model, active) in &models {
        let sel = DofSelection::new(active, model.dof()).unwrap();
        let sol = solve_accelerations(model.as_ref(), &torque_symbols(model.dof()), &sel).unwrap();

        for _ in 0..5 {
            let env = random_env(model.as_ref(), &mut rng);
            let qdd: Vec<f64> = sol
                .accelerations
                .iter()
                .map(|e| e.eval(&env).unwrap())
                .collect();
            for (i, b) in sol.generalized_force.iter().enumerate() {
                let lhs: f64 = (0..sel.len())
                    .map(|j| sol.mass_matrix.get(i, j).eval(&env).unwrap() * qdd[j])
                    .sum();
                assert_abs_diff_eq!(lhs, b.eval(&env).unwrap(), epsilon = 1e-9);
            }
        }
    }
}

/// The eliminated model agrees with the solver output evaluated at frozen = 0.
#[test]
fn elimination_matches_zeroed_evaluation() {
    let mut rng = rng();
    let model = PendulumChain::new(4);
    let sel = DofSelection::new(&[1, 2], 4).unwrap();
    let reduced = assemble(&model, &sel, &ModelOptions::new("chain", false)).unwrap();
    let solved = solve_accelerations(&model, &torque_symbols(4), &sel).unwrap();

    for _ in 0..5 {
        let mut env = random_env(&model, &mut rng);
        for s in &reduced.frozen {
            env.insert(s.clone(), 0.0);
        }
        let tape = Tape::new(&reduced.x_dot[2..]);
        let got = tape.eval(&env).unwrap();
        for (g, e) in got.iter().zip(&solved.accelerations) {
            assert_abs_diff_eq!(*g, e.eval(&env).unwrap(), epsilon = 1e-10);
        }
    }
}

fn selection_strategy() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..=5).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::btree_set(0..n, 1..=n)
                .prop_map(|s| s.into_iter().collect::<Vec<usize>>()),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn reduced_dimensions((n, active) in selection_strategy()) {
        let model = PendulumChain::new(n);
        let sel = DofSelection::new(&active, n).unwrap();
        let reduced = assemble(&model, &sel, &ModelOptions::new("chain", false)).unwrap();
        prop_assert_eq!(reduced.x.len(), 2 * active.len());
        prop_assert_eq!(reduced.x_dot.len(), 2 * active.len());
        prop_assert_eq!(reduced.u.len(), active.len());
        prop_assert_eq!(reduced.frozen.len(), 2 * (n - active.len()));
    }

    #[test]
    fn active_and_frozen_partition_the_range((n, active) in selection_strategy()) {
        let sel = DofSelection::new(&active, n).unwrap();
        let mut positions: Vec<usize> = sel.active().to_vec();
        positions.extend_from_slice(sel.frozen_positions());
        positions.sort_unstable();
        prop_assert_eq!(positions, (0..n).collect::<Vec<_>>());

        let mut velocities: Vec<usize> = sel.active().iter().map(|i| i + n).collect();
        velocities.extend(sel.frozen_velocities());
        velocities.sort_unstable();
        prop_assert_eq!(velocities, (n..2 * n).collect::<Vec<_>>());
    }

    #[test]
    fn reduced_matrix_indexes_active_entries((n, active) in selection_strategy()) {
        let full = PendulumChain::new(n).mass_matrix();
        let reduced = reduce_matrix(&full, &active).unwrap();
        for (i, &ai) in active.iter().enumerate() {
            for (j, &aj) in active.iter().enumerate() {
                prop_assert!(reduced.get(i, j).ptr_eq(full.get(ai, aj)));
            }
        }
    }

    #[test]
    fn unsorted_input_is_sorted(raw in prop::collection::btree_set(0usize..8, 1..=8)) {
        let sorted: Vec<usize> = raw.iter().copied().collect();
        let reversed: Vec<usize> = sorted.iter().rev().copied().collect();
        let sel = DofSelection::new(&reversed, 8).unwrap();
        prop_assert_eq!(sel.active(), sorted.as_slice());
    }
}
