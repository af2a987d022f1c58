//! Turns a reduced-order model into C sources and a shared library.
//!
//! The I/O side of mpcgen: configuration files, generated artifacts and the
//! native compiler process all live here, keeping `mpcgen-core` pure.

pub mod c_emit;
pub mod compile;
pub mod config;
pub mod error;
pub mod generator;
pub mod ir;

pub use compile::CompileJob;
pub use config::{Config, OUT_DIR_ENV};
pub use error::{CodegenError, Result};
pub use generator::{Artifacts, GeneratorSettings, ModelGenerator};
pub use ir::{Function, ModelIr, Slot, is_c_identifier};
