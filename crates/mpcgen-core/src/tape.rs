//! Single-assignment linearisation of an expression DAG.
//!
//! Every distinct node reachable from the outputs gets exactly one slot,
//! children before parents. Shared subexpressions are therefore evaluated
//! (or emitted) once.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{ReduceError, Result};
use crate::expr::{Expr, Func, Node, Symbol};

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Const(f64),
    Input(Symbol),
    Neg(usize),
    Add(usize, usize),
    Sub(usize, usize),
    Mul(usize, usize),
    Div(usize, usize),
    Pow(usize, i32),
    Call(Func, usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tape {
    ops: Vec<Op>,
    outputs: Vec<usize>,
}

impl Tape {
    pub fn new(outputs: &[Expr]) -> Self {
        let mut builder = Builder {
            ops: Vec::new(),
            slots: HashMap::new(),
        };
        let outputs = outputs.iter().map(|e| builder.visit(e)).collect();
        Self {
            ops: builder.ops,
            outputs,
        }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Slot index of each output, in output order.
    pub fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Symbols read by the tape.
    pub fn inputs(&self) -> BTreeSet<Symbol> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Input(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn eval(&self, env: &HashMap<Symbol, f64>) -> Result<Vec<f64>> {
        let mut w: Vec<f64> = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            let v = match op {
                Op::Const(c) => *c,
                Op::Input(s) => *env
                    .get(s)
                    .ok_or_else(|| ReduceError::UnboundSymbol(s.name().to_string()))?,
                Op::Neg(a) => -w[*a],
                Op::Add(a, b) => w[*a] + w[*b],
                Op::Sub(a, b) => w[*a] - w[*b],
                Op::Mul(a, b) => w[*a] * w[*b],
                Op::Div(a, b) => w[*a] / w[*b],
                Op::Pow(a, n) => w[*a].powi(*n),
                Op::Call(func, a) => func.apply(w[*a]),
            };
            w.push(v);
        }
        Ok(self.outputs.iter().map(|&slot| w[slot]).collect())
    }

    /// Human-readable listing, outputs labelled `label[i]`.
    pub fn listing(&self, label: &str) -> String {
        let mut out = self.to_string();
        for (i, slot) in self.outputs.iter().enumerate() {
            out.push_str(&format!("{label}[{i}] = @{slot}\n"));
        }
        out
    }
}

struct Builder {
    ops: Vec<Op>,
    slots: HashMap<*const Node, usize>,
}

impl Builder {
    fn visit(&mut self, e: &Expr) -> usize {
        let key: *const Node = e.node();
        if let Some(&slot) = self.slots.get(&key) {
            return slot;
        }
        let op = match e.node() {
            Node::Const(c) => Op::Const(*c),
            Node::Sym(s) => Op::Input(s.clone()),
            Node::Neg(a) => Op::Neg(self.visit(a)),
            Node::Add(a, b) => Op::Add(self.visit(a), self.visit(b)),
            Node::Sub(a, b) => Op::Sub(self.visit(a), self.visit(b)),
            Node::Mul(a, b) => Op::Mul(self.visit(a), self.visit(b)),
            Node::Div(a, b) => Op::Div(self.visit(a), self.visit(b)),
            Node::Pow(a, n) => Op::Pow(self.visit(a), *n),
            Node::Call(func, a) => Op::Call(*func, self.visit(a)),
        };
        let slot = self.ops.len();
        self.ops.push(op);
        self.slots.insert(key, slot);
        slot
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            write!(f, "@{i} = ")?;
            match op {
                Op::Const(c) => write!(f, "{c}")?,
                Op::Input(s) => write!(f, "{s}")?,
                Op::Neg(a) => write!(f, "-@{a}")?,
                Op::Add(a, b) => write!(f, "@{a} + @{b}")?,
                Op::Sub(a, b) => write!(f, "@{a} - @{b}")?,
                Op::Mul(a, b) => write!(f, "@{a}*@{b}")?,
                Op::Div(a, b) => write!(f, "@{a}/@{b}")?,
                Op::Pow(a, n) => write!(f, "@{a}^{n}")?,
                Op::Call(func, a) => write!(f, "{}(@{a})", func.name())?,
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
