//! Optional TOML configuration for a generation run.
//!
//! Every field has a default, so an absent file and an empty file are
//! equivalent.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mpcgen_core::ModelOptions;
use mpcgen_core::constants::{
    DEFAULT_CONTROL_BOUND, DEFAULT_SHOOTING_NODES, DEFAULT_STATE_BOUND, DEFAULT_STEP_SIZE_MS,
};
use serde::Deserialize;

use crate::error::{CodegenError, Result};

/// Environment override for the output directory.
pub const OUT_DIR_ENV: &str = "MPCGEN_OUT_DIR";
pub const DEFAULT_OUTPUT_DIR: &str = "generated";
pub const DEFAULT_COMPILER: &str = "cc";
pub const DEFAULT_COMPILE_TIMEOUT_SECS: u64 = 600;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub model: ModelSection,
    pub plant: PlantSection,
    pub generator: GeneratorSection,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    /// Falls back to the plant's own name.
    pub base_name: Option<String>,
    pub step_size_ms: u64,
    pub shooting_nodes: usize,
    pub state_bound: f64,
    pub control_bound: f64,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            base_name: None,
            step_size_ms: DEFAULT_STEP_SIZE_MS,
            shooting_nodes: DEFAULT_SHOOTING_NODES,
            state_bound: DEFAULT_STATE_BOUND,
            control_bound: DEFAULT_CONTROL_BOUND,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantSection {
    pub user_params: Option<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorSection {
    pub output_dir: Option<PathBuf>,
    pub compiler: String,
    pub cflags: Vec<String>,
    pub compile_timeout_secs: u64,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            output_dir: None,
            compiler: DEFAULT_COMPILER.to_string(),
            cflags: vec!["-O2".into(), "-fPIC".into(), "-shared".into()],
            compile_timeout_secs: DEFAULT_COMPILE_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let m = &self.model;
        if m.step_size_ms == 0 {
            return Err(CodegenError::InvalidConfig("step_size_ms must be positive".into()));
        }
        if m.shooting_nodes == 0 {
            return Err(CodegenError::InvalidConfig(
                "shooting_nodes must be positive".into(),
            ));
        }
        for (label, bound) in [("state_bound", m.state_bound), ("control_bound", m.control_bound)]
        {
            if bound.is_nan() || bound < 0.0 {
                return Err(CodegenError::InvalidConfig(format!(
                    "{label} must be a non-negative magnitude, got {bound}"
                )));
            }
        }
        if self.generator.compiler.trim().is_empty() {
            return Err(CodegenError::InvalidConfig("compiler must not be empty".into()));
        }
        if self.generator.compile_timeout_secs == 0 {
            return Err(CodegenError::InvalidConfig(
                "compile_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Assembly options; `plant_name` is used when no base name is configured.
    pub fn model_options(&self, plant_name: &str, linear: bool) -> ModelOptions {
        let m = &self.model;
        let mut options = ModelOptions::new(m.base_name.as_deref().unwrap_or(plant_name), linear);
        options.step_size = Duration::from_millis(m.step_size_ms);
        options.shooting_nodes = m.shooting_nodes;
        options.state_bound = m.state_bound;
        options.control_bound = m.control_bound;
        options
    }

    pub fn compile_timeout(&self) -> Duration {
        Duration::from_secs(self.generator.compile_timeout_secs)
    }

    /// Output directory: explicit flag > `MPCGEN_OUT_DIR` > config > `./generated`.
    pub fn output_dir(&self, flag: Option<&Path>) -> PathBuf {
        let env = std::env::var_os(OUT_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.resolve_output_dir(flag, env)
    }

    fn resolve_output_dir(&self, flag: Option<&Path>, env: Option<PathBuf>) -> PathBuf {
        if let Some(dir) = flag {
            return dir.to_path_buf();
        }
        env.or_else(|| self.generator.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}
