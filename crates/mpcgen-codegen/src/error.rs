use std::fmt;
use std::time::Duration;

use mpcgen_core::ReduceError;

#[derive(Debug)]
pub enum CodegenError {
    Io(std::io::Error),
    Config(toml::de::Error),
    Json(serde_json::Error),
    Reduce(ReduceError),
    InvalidConfig(String),
    /// Model name is not usable as a C identifier.
    InvalidName(String),
    InvalidModel(String),
    /// `x_dot` reads a symbol that is neither a state nor a control.
    UnboundSymbol(String),
    NotCreated,
    NotGenerated,
    CompileFailed { status: Option<i32>, stderr: String },
    Timeout(Duration),
    Cancelled,
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::Io(e) => write!(f, "I/O error: {e}"),
            CodegenError::Config(e) => write!(f, "invalid config file: {e}"),
            CodegenError::Json(e) => write!(f, "JSON error: {e}"),
            CodegenError::Reduce(e) => write!(f, "{e}"),
            CodegenError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            CodegenError::InvalidName(name) => {
                write!(f, "model name '{name}' is not a valid C identifier")
            }
            CodegenError::InvalidModel(msg) => write!(f, "invalid model: {msg}"),
            CodegenError::UnboundSymbol(name) => {
                write!(f, "x_dot depends on '{name}', which is neither a state nor a control")
            }
            CodegenError::NotCreated => write!(f, "create_model must run before code generation"),
            CodegenError::NotGenerated => {
                write!(f, "generate_c_code must run before compilation")
            }
            CodegenError::CompileFailed { status, stderr } => {
                match status {
                    Some(code) => write!(f, "compiler exited with status {code}")?,
                    None => write!(f, "compiler terminated by signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            CodegenError::Timeout(limit) => {
                write!(f, "compilation timed out after {}s", limit.as_secs_f64())
            }
            CodegenError::Cancelled => write!(f, "compilation cancelled"),
        }
    }
}

impl std::error::Error for CodegenError {}

impl From<std::io::Error> for CodegenError {
    fn from(e: std::io::Error) -> Self {
        CodegenError::Io(e)
    }
}

impl From<toml::de::Error> for CodegenError {
    fn from(e: toml::de::Error) -> Self {
        CodegenError::Config(e)
    }
}

impl From<serde_json::Error> for CodegenError {
    fn from(e: serde_json::Error) -> Self {
        CodegenError::Json(e)
    }
}

impl From<ReduceError> for CodegenError {
    fn from(e: ReduceError) -> Self {
        CodegenError::Reduce(e)
    }
}

pub type Result<T> = std::result::Result<T, CodegenError>;
