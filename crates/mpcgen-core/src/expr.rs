//! Immutable symbolic scalar expressions.
//!
//! An [`Expr`] is a reference-counted node in an expression DAG. Expressions
//! are built through folding constructors, so trivially simplifiable forms
//! (`0 * x`, `x + 0`, `cos(0)`, constant arithmetic) never materialise as
//! nodes. Traversals (`substitute`, `diff`, `eval`) are memoised on node
//! identity, which keeps them linear in the number of distinct nodes even
//! when subexpressions are heavily shared.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use crate::error::{ReduceError, Result};

/// Named scalar variable. Two symbols are the same variable iff their names match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// `prefix` followed by a decimal index, e.g. `T3`.
    pub fn indexed(prefix: &str, index: usize) -> Self {
        Self::new(&format!("{prefix}{index}"))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Elementary unary functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Func {
    Sin,
    Cos,
    Tanh,
    Sqrt,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tanh => "tanh",
            Func::Sqrt => "sqrt",
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tanh => x.tanh(),
            Func::Sqrt => x.sqrt(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Node {
    Const(f64),
    Sym(Symbol),
    Neg(Expr),
    Add(Expr, Expr),
    Sub(Expr, Expr),
    Mul(Expr, Expr),
    Div(Expr, Expr),
    Pow(Expr, i32),
    Call(Func, Expr),
}

#[derive(Clone, Debug)]
pub struct Expr(Arc<Node>);

/// Structural equality, short-circuiting on shared nodes.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl From<Symbol> for Expr {
    fn from(s: Symbol) -> Self {
        Expr::new(Node::Sym(s))
    }
}

impl From<&Symbol> for Expr {
    fn from(s: &Symbol) -> Self {
        Expr::new(Node::Sym(s.clone()))
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::constant(v)
    }
}

type NodeKey = *const Node;

impl Expr {
    fn new(node: Node) -> Self {
        Self(Arc::new(node))
    }

    pub fn constant(v: f64) -> Self {
        Self::new(Node::Const(v))
    }

    pub fn zero() -> Self {
        Self::constant(0.0)
    }

    pub fn one() -> Self {
        Self::constant(1.0)
    }

    pub fn symbol(name: &str) -> Self {
        Symbol::new(name).into()
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    fn key(&self) -> NodeKey {
        Arc::as_ptr(&self.0)
    }

    /// True when both handles point at the same node.
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_const(&self) -> Option<f64> {
        match *self.0 {
            Node::Const(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match &*self.0 {
            Node::Sym(s) => Some(s),
            _ => None,
        }
    }

    /// Structurally zero: folded to the constant 0.
    pub fn is_zero(&self) -> bool {
        self.as_const() == Some(0.0)
    }

    // --- Folding constructors ---

    fn sum(a: &Expr, b: &Expr) -> Expr {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => Expr::constant(x + y),
            (Some(x), _) if x == 0.0 => b.clone(),
            (_, Some(y)) if y == 0.0 => a.clone(),
            _ => Expr::new(Node::Add(a.clone(), b.clone())),
        }
    }

    fn difference(a: &Expr, b: &Expr) -> Expr {
        if a.ptr_eq(b) {
            return Expr::zero();
        }
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => Expr::constant(x - y),
            (Some(x), _) if x == 0.0 => Expr::negate(b),
            (_, Some(y)) if y == 0.0 => a.clone(),
            _ => Expr::new(Node::Sub(a.clone(), b.clone())),
        }
    }

    fn product(a: &Expr, b: &Expr) -> Expr {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => Expr::constant(x * y),
            (Some(x), _) if x == 0.0 => Expr::zero(),
            (_, Some(y)) if y == 0.0 => Expr::zero(),
            (Some(x), _) if x == 1.0 => b.clone(),
            (_, Some(y)) if y == 1.0 => a.clone(),
            (Some(x), _) if x == -1.0 => Expr::negate(b),
            (_, Some(y)) if y == -1.0 => Expr::negate(a),
            _ => Expr::new(Node::Mul(a.clone(), b.clone())),
        }
    }

    fn quotient(a: &Expr, b: &Expr) -> Expr {
        match (a.as_const(), b.as_const()) {
            // Division by a literal zero is left unfolded so the failure stays visible.
            (_, Some(y)) if y == 0.0 => Expr::new(Node::Div(a.clone(), b.clone())),
            (Some(x), Some(y)) => Expr::constant(x / y),
            (Some(x), _) if x == 0.0 => Expr::zero(),
            (_, Some(y)) if y == 1.0 => a.clone(),
            _ if a.ptr_eq(b) => Expr::one(),
            _ => Expr::new(Node::Div(a.clone(), b.clone())),
        }
    }

    fn negate(a: &Expr) -> Expr {
        match &*a.0 {
            Node::Const(x) => Expr::constant(-x),
            Node::Neg(inner) => inner.clone(),
            _ => Expr::new(Node::Neg(a.clone())),
        }
    }

    pub fn powi(&self, n: i32) -> Expr {
        match (n, self.as_const()) {
            (0, _) => Expr::one(),
            (1, _) => self.clone(),
            (_, Some(x)) => Expr::constant(x.powi(n)),
            _ => Expr::new(Node::Pow(self.clone(), n)),
        }
    }

    pub fn call(func: Func, arg: &Expr) -> Expr {
        match arg.as_const() {
            Some(x) => Expr::constant(func.apply(x)),
            None => Expr::new(Node::Call(func, arg.clone())),
        }
    }

    pub fn sin(&self) -> Expr {
        Expr::call(Func::Sin, self)
    }

    pub fn cos(&self) -> Expr {
        Expr::call(Func::Cos, self)
    }

    pub fn tanh(&self) -> Expr {
        Expr::call(Func::Tanh, self)
    }

    pub fn sqrt(&self) -> Expr {
        Expr::call(Func::Sqrt, self)
    }

    // --- Traversals ---

    /// Rebuild this node with each child mapped through `f`.
    /// Returns `self` unchanged (same node) when no child changed.
    fn map_children(&self, f: &mut impl FnMut(&Expr) -> Expr) -> Expr {
        fn same(pairs: &[(&Expr, &Expr)]) -> bool {
            pairs.iter().all(|(old, new)| old.ptr_eq(new))
        }

        match &*self.0 {
            Node::Const(_) | Node::Sym(_) => self.clone(),
            Node::Neg(a) => {
                let na = f(a);
                if same(&[(a, &na)]) { self.clone() } else { -na }
            }
            Node::Pow(a, n) => {
                let na = f(a);
                if same(&[(a, &na)]) { self.clone() } else { na.powi(*n) }
            }
            Node::Call(func, a) => {
                let na = f(a);
                if same(&[(a, &na)]) {
                    self.clone()
                } else {
                    Expr::call(*func, &na)
                }
            }
            Node::Add(a, b) | Node::Sub(a, b) | Node::Mul(a, b) | Node::Div(a, b) => {
                let na = f(a);
                let nb = f(b);
                if same(&[(a, &na), (b, &nb)]) {
                    return self.clone();
                }
                match &*self.0 {
                    Node::Add(..) => Expr::sum(&na, &nb),
                    Node::Sub(..) => Expr::difference(&na, &nb),
                    Node::Mul(..) => Expr::product(&na, &nb),
                    _ => Expr::quotient(&na, &nb),
                }
            }
        }
    }

    /// Replace every occurrence of the bound symbols, simultaneously.
    ///
    /// Replacement expressions are inserted as-is and never traversed, so
    /// a binding whose value mentions another bound symbol does not chain.
    pub fn substitute(&self, bindings: &HashMap<Symbol, Expr>) -> Expr {
        let mut cache = HashMap::new();
        substitute_node(self, bindings, &mut cache)
    }

    /// Symbolic partial derivative with respect to `var`.
    pub fn diff(&self, var: &Symbol) -> Expr {
        let mut cache = HashMap::new();
        diff_node(self, var, &mut cache)
    }

    /// Numeric value under `env`. Fails on the first unbound symbol.
    pub fn eval(&self, env: &HashMap<Symbol, f64>) -> Result<f64> {
        let mut cache = HashMap::new();
        eval_node(self, env, &mut cache)
    }

    /// Every symbol this expression mentions.
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        let mut seen = HashSet::new();
        collect_symbols(self, &mut seen, &mut out);
        out
    }

    pub fn depends_on(&self, var: &Symbol) -> bool {
        self.free_symbols().contains(var)
    }

    /// Direct children, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match &*self.0 {
            Node::Const(_) | Node::Sym(_) => Vec::new(),
            Node::Neg(a) | Node::Pow(a, _) | Node::Call(_, a) => vec![a],
            Node::Add(a, b) | Node::Sub(a, b) | Node::Mul(a, b) | Node::Div(a, b) => vec![a, b],
        }
    }
}

/// Apply one batched substitution to every expression, sharing the cache so
/// nodes common to several outputs are rewritten once.
pub fn substitute_all(exprs: &[Expr], bindings: &HashMap<Symbol, Expr>) -> Vec<Expr> {
    let mut cache = HashMap::new();
    exprs
        .iter()
        .map(|e| substitute_node(e, bindings, &mut cache))
        .collect()
}

/// Differentiate every expression with respect to `var`, sharing one cache
/// so entries built from a common node yield a common derivative node.
pub fn diff_all(exprs: &[Expr], var: &Symbol) -> Vec<Expr> {
    let mut cache = HashMap::new();
    exprs.iter().map(|e| diff_node(e, var, &mut cache)).collect()
}

fn substitute_node(
    e: &Expr,
    bindings: &HashMap<Symbol, Expr>,
    cache: &mut HashMap<NodeKey, Expr>,
) -> Expr {
    if let Some(done) = cache.get(&e.key()) {
        return done.clone();
    }
    let out = match e.node() {
        Node::Sym(s) => bindings.get(s).cloned().unwrap_or_else(|| e.clone()),
        _ => e.map_children(&mut |child| substitute_node(child, bindings, cache)),
    };
    cache.insert(e.key(), out.clone());
    out
}

fn diff_node(e: &Expr, var: &Symbol, cache: &mut HashMap<NodeKey, Expr>) -> Expr {
    if let Some(done) = cache.get(&e.key()) {
        return done.clone();
    }
    let out = match e.node() {
        Node::Const(_) => Expr::zero(),
        Node::Sym(s) => {
            if s == var {
                Expr::one()
            } else {
                Expr::zero()
            }
        }
        Node::Neg(a) => -diff_node(a, var, cache),
        Node::Add(a, b) => diff_node(a, var, cache) + diff_node(b, var, cache),
        Node::Sub(a, b) => diff_node(a, var, cache) - diff_node(b, var, cache),
        Node::Mul(a, b) => {
            let da = diff_node(a, var, cache);
            let db = diff_node(b, var, cache);
            &da * b + a * &db
        }
        Node::Div(a, b) => {
            let da = diff_node(a, var, cache);
            let db = diff_node(b, var, cache);
            (&da * b - a * &db) / b.powi(2)
        }
        Node::Pow(a, n) => {
            let da = diff_node(a, var, cache);
            Expr::constant(f64::from(*n)) * a.powi(n - 1) * da
        }
        Node::Call(func, a) => {
            let da = diff_node(a, var, cache);
            let outer = match func {
                Func::Sin => a.cos(),
                Func::Cos => -a.sin(),
                Func::Tanh => Expr::one() - a.tanh().powi(2),
                Func::Sqrt => Expr::one() / (Expr::constant(2.0) * a.sqrt()),
            };
            outer * da
        }
    };
    cache.insert(e.key(), out.clone());
    out
}

fn eval_node(
    e: &Expr,
    env: &HashMap<Symbol, f64>,
    cache: &mut HashMap<NodeKey, f64>,
) -> Result<f64> {
    if let Some(&v) = cache.get(&e.key()) {
        return Ok(v);
    }
    let v = match e.node() {
        Node::Const(c) => *c,
        Node::Sym(s) => *env
            .get(s)
            .ok_or_else(|| ReduceError::UnboundSymbol(s.name().to_string()))?,
        Node::Neg(a) => -eval_node(a, env, cache)?,
        Node::Add(a, b) => eval_node(a, env, cache)? + eval_node(b, env, cache)?,
        Node::Sub(a, b) => eval_node(a, env, cache)? - eval_node(b, env, cache)?,
        Node::Mul(a, b) => eval_node(a, env, cache)? * eval_node(b, env, cache)?,
        Node::Div(a, b) => eval_node(a, env, cache)? / eval_node(b, env, cache)?,
        Node::Pow(a, n) => eval_node(a, env, cache)?.powi(*n),
        Node::Call(func, a) => func.apply(eval_node(a, env, cache)?),
    };
    cache.insert(e.key(), v);
    Ok(v)
}

fn collect_symbols(e: &Expr, seen: &mut HashSet<NodeKey>, out: &mut BTreeSet<Symbol>) {
    if !seen.insert(e.key()) {
        return;
    }
    if let Node::Sym(s) = e.node() {
        out.insert(s.clone());
    }
    for child in e.children() {
        collect_symbols(child, seen, out);
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $build:ident) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$build(&self, &rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::$build(&self, rhs)
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$build(self, &rhs)
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::$build(self, rhs)
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::$build(&self, &Expr::constant(rhs))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::$build(self, &Expr::constant(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, sum);
impl_binary_op!(Sub, sub, difference);
impl_binary_op!(Mul, mul, product);
impl_binary_op!(Div, div, quotient);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::negate(&self)
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::negate(self)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_POWER: u8 = 4;
const PREC_ATOM: u8 = 5;

fn precedence(node: &Node) -> u8 {
    match node {
        Node::Const(c) if *c < 0.0 => PREC_UNARY,
        Node::Const(_) | Node::Sym(_) | Node::Call(..) => PREC_ATOM,
        Node::Pow(..) => PREC_POWER,
        Node::Neg(_) => PREC_UNARY,
        Node::Mul(..) | Node::Div(..) => PREC_PRODUCT,
        Node::Add(..) | Node::Sub(..) => PREC_SUM,
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, e: &Expr, min_prec: u8) -> fmt::Result {
    let prec = precedence(e.node());
    let parens = prec < min_prec;
    if parens {
        f.write_str("(")?;
    }
    match e.node() {
        Node::Const(c) => write!(f, "{c}")?,
        Node::Sym(s) => write!(f, "{s}")?,
        Node::Neg(a) => {
            f.write_str("-")?;
            write_expr(f, a, PREC_POWER)?;
        }
        Node::Add(a, b) => {
            write_expr(f, a, PREC_SUM)?;
            f.write_str(" + ")?;
            write_expr(f, b, PREC_SUM)?;
        }
        Node::Sub(a, b) => {
            write_expr(f, a, PREC_SUM)?;
            f.write_str(" - ")?;
            write_expr(f, b, PREC_PRODUCT)?;
        }
        Node::Mul(a, b) => {
            write_expr(f, a, PREC_PRODUCT)?;
            f.write_str("*")?;
            write_expr(f, b, PREC_UNARY)?;
        }
        Node::Div(a, b) => {
            write_expr(f, a, PREC_PRODUCT)?;
            f.write_str("/")?;
            write_expr(f, b, PREC_UNARY)?;
        }
        Node::Pow(a, n) => {
            write_expr(f, a, PREC_ATOM)?;
            write!(f, "^{n}")?;
        }
        Node::Call(func, a) => {
            write!(f, "{}(", func.name())?;
            write_expr(f, a, 0)?;
            f.write_str(")")?;
        }
    }
    if parens {
        f.write_str(")")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, f64)]) -> HashMap<Symbol, f64> {
        pairs.iter().map(|(n, v)| (Symbol::new(n), *v)).collect()
    }

    #[test]
    fn test_folding_identities() {
        let x = Expr::symbol("x");
        assert!((Expr::zero() * &x).is_zero());
        assert!((&x + Expr::zero()).ptr_eq(&x));
        assert!((&x * Expr::one()).ptr_eq(&x));
        assert!((&x - &x).is_zero());
        assert_eq!(Expr::zero().cos().as_const(), Some(1.0));
        assert_eq!(Expr::zero().sin().as_const(), Some(0.0));
        assert_eq!((Expr::constant(2.0) * 3.0).as_const(), Some(6.0));
    }

    #[test]
    fn test_double_negation_collapses() {
        let x = Expr::symbol("x");
        assert!((-(-x.clone())).ptr_eq(&x));
    }

    #[test]
    fn test_division_by_literal_zero_not_folded() {
        let e = Expr::one() / Expr::zero();
        assert!(e.as_const().is_none());
    }

    #[test]
    fn test_display_precedence() {
        let a = Expr::symbol("a");
        let b = Expr::symbol("b");
        let c = Expr::symbol("c");
        assert_eq!(((&a + &b) * &c).to_string(), "(a + b)*c");
        assert_eq!((&a - (&b - &c)).to_string(), "a - (b - c)");
        assert_eq!((&a * b.sin()).to_string(), "a*sin(b)");
        assert_eq!((&a + &b).powi(2).to_string(), "(a + b)^2");
        assert_eq!((-(&a * &b)).to_string(), "-(a*b)");
    }

    #[test]
    fn test_eval() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let e = &x * y.cos() + x.powi(2) / 4.0;
        let v = e.eval(&env(&[("x", 2.0), ("y", 0.0)])).unwrap();
        assert!((v - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_eval_unbound_symbol() {
        let e = Expr::symbol("x") + Expr::symbol("y");
        let err = e.eval(&env(&[("x", 1.0)])).unwrap_err();
        assert_eq!(err, ReduceError::UnboundSymbol("y".into()));
    }

    #[test]
    fn test_substitute_zero_folds_away() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let e = &x * y.sin() + y.cos() * 3.0;
        let bindings = HashMap::from([(Symbol::new("y"), Expr::zero())]);
        let s = e.substitute(&bindings);
        assert_eq!(s.as_const(), Some(3.0));
        assert!(!s.depends_on(&Symbol::new("y")));
    }

    #[test]
    fn test_substitute_is_simultaneous() {
        // x -> y, y -> x swaps rather than collapsing
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let e = &x - &y * 2.0;
        let bindings = HashMap::from([
            (Symbol::new("x"), y.clone()),
            (Symbol::new("y"), x.clone()),
        ]);
        assert_eq!(e.substitute(&bindings).to_string(), "y - x*2");
    }

    #[test]
    fn test_substitute_untouched_returns_same_node() {
        let e = Expr::symbol("x").sin() * Expr::symbol("z");
        let bindings = HashMap::from([(Symbol::new("y"), Expr::zero())]);
        assert!(e.substitute(&bindings).ptr_eq(&e));
    }

    #[test]
    fn test_diff_product_and_chain_rule() {
        let x = Symbol::new("x");
        let xe = Expr::from(&x);
        // d/dx [x^2 * sin(x)] = 2x sin(x) + x^2 cos(x)
        let e = xe.powi(2) * xe.sin();
        let d = e.diff(&x);
        let at = 0.7_f64;
        let expected = 2.0 * at * at.sin() + at * at * at.cos();
        let got = d.eval(&env(&[("x", at)])).unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn test_diff_quotient_and_tanh() {
        let x = Symbol::new("x");
        let xe = Expr::from(&x);
        let e = xe.tanh() / (&xe + 2.0);
        let at = 0.3_f64;
        let h = 1e-6;
        let f = |v: f64| v.tanh() / (v + 2.0);
        let numeric = (f(at + h) - f(at - h)) / (2.0 * h);
        let got = e.diff(&x).eval(&env(&[("x", at)])).unwrap();
        assert!((got - numeric).abs() < 1e-6);
    }

    #[test]
    fn test_diff_of_unrelated_symbol_is_zero() {
        let e = Expr::symbol("y").cos() * 4.0;
        assert!(e.diff(&Symbol::new("x")).is_zero());
    }

    #[test]
    fn test_free_symbols() {
        let e = Expr::symbol("b") * Expr::symbol("a").sin() + Expr::symbol("b");
        let names: Vec<String> = e.free_symbols().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_shared_dag_traversal_stays_linear() {
        // 64 doublings: a tree walk would never finish, the memoised one is instant
        let x = Symbol::new("x");
        let mut e = Expr::from(&x);
        for _ in 0..64 {
            e = &e + &e;
        }
        assert!(e.depends_on(&x));
        let bindings = HashMap::from([(x.clone(), Expr::constant(1.0))]);
        let v = e.substitute(&bindings).as_const().unwrap();
        assert!((v - 2f64.powi(64)).abs() / v < 1e-12);
        assert_eq!(e.diff(&x).as_const(), Some(2f64.powi(64)));
    }
}
