//! Intermediate representation handed from `create_model` to the emitter.

use std::collections::HashMap;
use std::sync::LazyLock;

use mpcgen_core::{Expr, ExprMatrix, ModelParameters, ReduceError, Symbol, Tape};
use regex::Regex;

use crate::error::{CodegenError, Result};

static C_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Where a C function reads one of its input symbols from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    X(usize),
    U(usize),
}

/// One generated function `out = f(x, u)`, outputs row-major.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub tape: Tape,
}

#[derive(Clone, Debug)]
pub struct ModelIr {
    pub params: ModelParameters,
    pub states: Vec<Symbol>,
    pub controls: Vec<Symbol>,
    pub inputs: HashMap<Symbol, Slot>,
    pub functions: Vec<Function>,
}

pub fn is_c_identifier(name: &str) -> bool {
    C_IDENT.is_match(name)
}

fn bare_symbols(exprs: &[Expr], what: &str) -> Result<Vec<Symbol>> {
    exprs
        .iter()
        .enumerate()
        .map(|(i, e)| {
            e.as_symbol().cloned().ok_or_else(|| {
                CodegenError::InvalidModel(format!("{what}[{i}] is not a plain symbol: {e}"))
            })
        })
        .collect()
}

fn check_len(expected: usize, found: usize, what: &'static str) -> Result<()> {
    if expected != found {
        return Err(ReduceError::ShapeMismatch {
            expected,
            found,
            what,
        }
        .into());
    }
    Ok(())
}

impl ModelIr {
    /// Validate `(x, x_dot, u)` against `params` and build the function set:
    /// `ode` always, `jac_x` and `jac_u` for linearized models.
    pub fn build(
        x: &[Expr],
        x_dot: &[Expr],
        u: &[Expr],
        params: &ModelParameters,
    ) -> Result<Self> {
        if !is_c_identifier(params.name()) {
            return Err(CodegenError::InvalidName(params.name().to_string()));
        }
        check_len(params.num_x(), x.len(), "state vector")?;
        check_len(params.num_x(), x_dot.len(), "state derivative")?;
        check_len(params.num_u(), u.len(), "control vector")?;

        let states = bare_symbols(x, "x")?;
        let controls = bare_symbols(u, "u")?;

        let mut inputs = HashMap::new();
        let slots = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s, Slot::X(i)))
            .chain(controls.iter().enumerate().map(|(i, s)| (s, Slot::U(i))));
        for (s, slot) in slots {
            if inputs.insert(s.clone(), slot).is_some() {
                return Err(CodegenError::InvalidModel(format!(
                    "symbol '{s}' appears more than once in x and u"
                )));
            }
        }

        let n = x_dot.len();
        let mut functions = vec![Function {
            name: "ode",
            rows: n,
            cols: 1,
            tape: Tape::new(x_dot),
        }];
        if params.is_linear() {
            let jac_x = ExprMatrix::jacobian(x_dot, &states);
            let jac_u = ExprMatrix::jacobian(x_dot, &controls);
            functions.push(Function {
                name: "jac_x",
                rows: n,
                cols: states.len(),
                tape: Tape::new(jac_x.as_slice()),
            });
            functions.push(Function {
                name: "jac_u",
                rows: n,
                cols: controls.len(),
                tape: Tape::new(jac_u.as_slice()),
            });
        }

        for f in &functions {
            if let Some(s) = f.tape.inputs().into_iter().find(|s| !inputs.contains_key(s)) {
                return Err(CodegenError::UnboundSymbol(s.name().to_string()));
            }
        }

        Ok(Self {
            params: params.clone(),
            states,
            controls,
            inputs,
            functions,
        })
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}
