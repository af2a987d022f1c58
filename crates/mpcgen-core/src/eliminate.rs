//! Removal of frozen-joint dependencies by zero substitution.

use std::collections::HashMap;

use crate::dof::DofSelection;
use crate::dynamics::DynamicsModel;
use crate::expr::{Expr, Symbol, substitute_all};

/// Position and velocity symbols of the frozen joints, positions first.
pub fn frozen_symbols(model: &dyn DynamicsModel, selection: &DofSelection) -> Vec<Symbol> {
    let state = model.state_symbols();
    selection
        .frozen_state_indices()
        .into_iter()
        .map(|i| state[i].clone())
        .collect()
}

/// Substitute zero for every frozen symbol in one batched pass.
///
/// With nothing frozen the expressions are returned untouched.
pub fn eliminate_frozen(exprs: Vec<Expr>, frozen: &[Symbol]) -> Vec<Expr> {
    if frozen.is_empty() {
        return exprs;
    }
    let bindings: HashMap<Symbol, Expr> = frozen
        .iter()
        .map(|s| (s.clone(), Expr::zero()))
        .collect();
    substitute_all(&exprs, &bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moe::MoeDynamics;

    #[test]
    fn test_frozen_symbols_order() {
        let model = MoeDynamics::new();
        let sel = DofSelection::new(&[1, 3], 4).unwrap();
        let names: Vec<String> = frozen_symbols(&model, &sel)
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["q0", "q2", "q0_dot", "q2_dot"]);
    }

    #[test]
    fn test_empty_frozen_set_is_identity() {
        let e = vec![Expr::symbol("q0").sin()];
        let out = eliminate_frozen(e.clone(), &[]);
        assert!(out[0].ptr_eq(&e[0]));
    }

    #[test]
    fn test_frozen_symbols_removed() {
        let q0 = Expr::symbol("q0");
        let q1 = Expr::symbol("q1");
        let e = vec![&q0.cos() * &q1 + q0.sin(), q1.clone() * 2.0];
        let frozen = [Symbol::new("q0")];
        let out = eliminate_frozen(e, &frozen);
        assert_eq!(out[0], q1);
        assert!(out.iter().all(|x| !x.depends_on(&frozen[0])));
    }
}
