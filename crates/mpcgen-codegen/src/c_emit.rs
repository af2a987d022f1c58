//! C99 emission of a [`ModelIr`].
//!
//! Each function becomes `void <model>_<fn>(const double *x, const double *u,
//! double *out)` with one `const double` per tape slot, so shared
//! subexpressions are computed once.

use mpcgen_core::Op;
use serde::Serialize;

use crate::error::{CodegenError, Result};
use crate::ir::{Function, ModelIr, Slot};

/// C literal for a double, including the non-finite values from `<math.h>`.
fn c_double(v: f64) -> String {
    if v.is_nan() {
        "NAN".to_string()
    } else if v == f64::INFINITY {
        "INFINITY".to_string()
    } else if v == f64::NEG_INFINITY {
        "-INFINITY".to_string()
    } else {
        format!("{v:?}")
    }
}

fn c_array(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| c_double(*v)).collect();
    format!("{{{}}}", items.join(", "))
}

fn signature(model: &str, f: &Function) -> String {
    format!(
        "void {model}_{}(const double *x, const double *u, double *out)",
        f.name
    )
}

fn guard(model: &str) -> String {
    model.to_uppercase()
}

pub fn header(ir: &ModelIr) -> String {
    let p = &ir.params;
    let name = p.name();
    let g = guard(name);

    let mut out = String::from("/* Generated by mpcgen. Do not edit. */\n");
    out.push_str(&format!("#ifndef {g}_H\n#define {g}_H\n\n"));
    out.push_str(&format!("#define {g}_NX {}\n", p.num_x()));
    out.push_str(&format!("#define {g}_NU {}\n", p.num_u()));
    out.push_str(&format!("#define {g}_N_SHOOTING {}\n", p.num_shooting_nodes()));
    out.push_str(&format!(
        "#define {g}_STEP_SIZE {}\n",
        c_double(p.step_size().as_secs_f64())
    ));
    out.push_str(&format!("#define {g}_IS_LINEAR {}\n\n", u8::from(p.is_linear())));

    for bound in ["x_min", "x_max"] {
        out.push_str(&format!("extern const double {name}_{bound}[{g}_NX];\n"));
    }
    for bound in ["u_min", "u_max"] {
        out.push_str(&format!("extern const double {name}_{bound}[{g}_NU];\n"));
    }
    out.push('\n');

    for f in &ir.functions {
        out.push_str(&format!("/* {}: {}x{}, row-major */\n", f.name, f.rows, f.cols));
        out.push_str(&format!("{};\n\n", signature(name, f)));
    }
    out.push_str(&format!("#endif /* {g}_H */\n"));
    out
}

pub fn source(ir: &ModelIr) -> Result<String> {
    let p = &ir.params;
    let name = p.name();
    let g = guard(name);

    let mut out = String::from("/* Generated by mpcgen. Do not edit. */\n");
    out.push_str(&format!("#include <math.h>\n\n#include \"{name}.h\"\n\n"));

    let (x_min, x_max) = p.state_bounds();
    let (u_min, u_max) = p.control_bounds();
    for (bound, values, dim) in [
        ("x_min", x_min, "NX"),
        ("x_max", x_max, "NX"),
        ("u_min", u_min, "NU"),
        ("u_max", u_max, "NU"),
    ] {
        out.push_str(&format!(
            "const double {name}_{bound}[{g}_{dim}] = {};\n",
            c_array(values)
        ));
    }

    for f in &ir.functions {
        out.push('\n');
        out.push_str(&function_body(ir, f)?);
    }
    Ok(out)
}

fn function_body(ir: &ModelIr, f: &Function) -> Result<String> {
    let mut out = format!("{}\n{{\n    (void)x;\n    (void)u;\n", signature(ir.params.name(), f));
    for (i, op) in f.tape.ops().iter().enumerate() {
        let rhs = match op {
            Op::Const(c) => c_double(*c),
            Op::Input(s) => match ir.inputs.get(s) {
                Some(Slot::X(k)) => format!("x[{k}]"),
                Some(Slot::U(k)) => format!("u[{k}]"),
                None => return Err(CodegenError::UnboundSymbol(s.name().to_string())),
            },
            Op::Neg(a) => format!("-w{a}"),
            Op::Add(a, b) => format!("w{a} + w{b}"),
            Op::Sub(a, b) => format!("w{a} - w{b}"),
            Op::Mul(a, b) => format!("w{a} * w{b}"),
            Op::Div(a, b) => format!("w{a} / w{b}"),
            Op::Pow(a, 2) => format!("w{a} * w{a}"),
            Op::Pow(a, n) => format!("pow(w{a}, {n})"),
            Op::Call(func, a) => format!("{}(w{a})", func.name()),
        };
        out.push_str(&format!("    const double w{i} = {rhs};\n"));
    }
    for (k, slot) in f.tape.outputs().iter().enumerate() {
        out.push_str(&format!("    out[{k}] = w{slot};\n"));
    }
    out.push_str("}\n");
    Ok(out)
}

#[derive(Serialize)]
struct Manifest<'a> {
    params: &'a mpcgen_core::ModelParameters,
    states: Vec<&'a str>,
    controls: Vec<&'a str>,
    functions: Vec<FunctionShape<'a>>,
}

#[derive(Serialize)]
struct FunctionShape<'a> {
    name: &'a str,
    symbol: String,
    rows: usize,
    cols: usize,
    instructions: usize,
}

/// JSON description of the generated artifacts for downstream tooling.
pub fn manifest(ir: &ModelIr) -> Result<String> {
    let name = ir.params.name();
    let manifest = Manifest {
        params: &ir.params,
        states: ir.states.iter().map(|s| s.name()).collect(),
        controls: ir.controls.iter().map(|s| s.name()).collect(),
        functions: ir
            .functions
            .iter()
            .map(|f| FunctionShape {
                name: f.name,
                symbol: format!("{name}_{}", f.name),
                rows: f.rows,
                cols: f.cols,
                instructions: f.tape.len(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&manifest)?)
}
