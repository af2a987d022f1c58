use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReduceError {
    /// No active DOF was designated.
    EmptyDofSet,
    DuplicateDof(usize),
    DofOutOfRange { index: usize, dof: usize },
    ShapeMismatch { expected: usize, found: usize, what: &'static str },
    /// No structurally non-zero pivot exists in this column.
    Singular { column: usize },
    UnboundSymbol(String),
    InvalidParams(String),
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceError::EmptyDofSet => write!(f, "at least one active DOF is required"),
            ReduceError::DuplicateDof(i) => write!(f, "DOF {i} is listed more than once"),
            ReduceError::DofOutOfRange { index, dof } => {
                write!(f, "DOF {index} is out of range for a {dof}-DOF model")
            }
            ReduceError::ShapeMismatch {
                expected,
                found,
                what,
            } => write!(f, "shape mismatch in {what}: expected {expected}, found {found}"),
            ReduceError::Singular { column } => {
                write!(f, "singular mass matrix: no usable pivot in column {column}")
            }
            ReduceError::UnboundSymbol(name) => write!(f, "no value bound for symbol '{name}'"),
            ReduceError::InvalidParams(msg) => write!(f, "invalid user parameters: {msg}"),
        }
    }
}

impl std::error::Error for ReduceError {}

pub type Result<T> = std::result::Result<T, ReduceError>;
