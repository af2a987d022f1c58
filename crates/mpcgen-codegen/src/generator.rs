//! Three-stage model generator: build the IR, emit C, compile it.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mpcgen_core::{Expr, ModelParameters};

use crate::c_emit;
use crate::compile::CompileJob;
use crate::config::Config;
use crate::error::{CodegenError, Result};
use crate::ir::ModelIr;

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorSettings {
    pub output_dir: PathBuf,
    pub compiler: String,
    pub cflags: Vec<String>,
    pub compile_timeout: Duration,
}

impl GeneratorSettings {
    /// Settings from `config`, with the output directory resolved against
    /// `out_dir_flag` and the environment.
    pub fn from_config(config: &Config, out_dir_flag: Option<&Path>) -> Self {
        Self {
            output_dir: config.output_dir(out_dir_flag),
            compiler: config.generator.compiler.clone(),
            cflags: config.generator.cflags.clone(),
            compile_timeout: config.compile_timeout(),
        }
    }
}

/// Files written by [`ModelGenerator::generate_c_code`].
#[derive(Clone, Debug, PartialEq)]
pub struct Artifacts {
    pub header: PathBuf,
    pub source: PathBuf,
    pub manifest: PathBuf,
}

pub struct ModelGenerator {
    settings: GeneratorSettings,
    ir: Option<ModelIr>,
    artifacts: Option<Artifacts>,
}

impl ModelGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            ir: None,
            artifacts: None,
        }
    }

    pub fn ir(&self) -> Option<&ModelIr> {
        self.ir.as_ref()
    }

    /// Validate the model and build its internal representation.
    ///
    /// Replaces any previously created model and invalidates its artifacts.
    pub fn create_model(
        &mut self,
        x: &[Expr],
        x_dot: &[Expr],
        u: &[Expr],
        params: &ModelParameters,
    ) -> Result<&ModelIr> {
        self.artifacts = None;
        self.ir = None;
        let ir = ModelIr::build(x, x_dot, u, params)?;
        for f in &ir.functions {
            tracing::debug!(
                "{}: {}x{} in {} instructions",
                f.name,
                f.rows,
                f.cols,
                f.tape.len()
            );
        }
        tracing::info!("created model {}", params.name());
        Ok(self.ir.insert(ir))
    }

    /// Write `<name>.h`, `<name>.c` and `<name>.json` into the output directory.
    pub fn generate_c_code(&mut self) -> Result<&Artifacts> {
        let ir = self.ir.as_ref().ok_or(CodegenError::NotCreated)?;
        let dir = &self.settings.output_dir;
        std::fs::create_dir_all(dir)?;

        let name = ir.params.name();
        let artifacts = Artifacts {
            header: dir.join(format!("{name}.h")),
            source: dir.join(format!("{name}.c")),
            manifest: dir.join(format!("{name}.json")),
        };
        std::fs::write(&artifacts.header, c_emit::header(ir))?;
        std::fs::write(&artifacts.source, c_emit::source(ir)?)?;
        std::fs::write(&artifacts.manifest, c_emit::manifest(ir)?)?;
        tracing::info!("wrote C sources for {name} to {}", dir.display());
        Ok(self.artifacts.insert(artifacts))
    }

    /// Compile the generated sources into `lib<name>.so`, cancelled by Ctrl-C.
    pub async fn compile_model(&mut self) -> Result<PathBuf> {
        self.compile_model_until(async {
            // If the handler cannot be installed, only the timeout applies.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Compile, giving up when `cancel` resolves or the timeout elapses.
    pub async fn compile_model_until<F>(&mut self, cancel: F) -> Result<PathBuf>
    where
        F: Future<Output = ()>,
    {
        let ir = self.ir.as_ref().ok_or(CodegenError::NotCreated)?;
        let artifacts = self.artifacts.as_ref().ok_or(CodegenError::NotGenerated)?;
        let name = ir.params.name();
        let job = CompileJob {
            compiler: self.settings.compiler.clone(),
            cflags: self.settings.cflags.clone(),
            source: artifacts.source.clone(),
            output: CompileJob::shared_library_path(&self.settings.output_dir, name),
            timeout: self.settings.compile_timeout,
        };
        tracing::info!("compiling {name} with {}", job.compiler);
        job.run(cancel).await?;
        tracing::info!("built {}", job.output.display());
        Ok(job.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpcgen_core::{DofSelection, ModelOptions, MoeDynamics, assemble};

    fn settings(dir: &Path, compiler: &str) -> GeneratorSettings {
        GeneratorSettings {
            output_dir: dir.to_path_buf(),
            compiler: compiler.into(),
            cflags: vec![],
            compile_timeout: Duration::from_secs(30),
        }
    }

    fn create(generator: &mut ModelGenerator, active: &[usize], linear: bool) {
        let model = MoeDynamics::new();
        let sel = DofSelection::new(active, 4).unwrap();
        let reduced = assemble(&model, &sel, &ModelOptions::new("moe", linear)).unwrap();
        generator
            .create_model(&reduced.x, &reduced.x_dot, &reduced.u, &reduced.params)
            .unwrap();
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.generator.compiler = "clang".into();
        let s = GeneratorSettings::from_config(&config, Some(Path::new("out")));
        assert_eq!(s.output_dir, PathBuf::from("out"));
        assert_eq!(s.compiler, "clang");
        assert_eq!(s.compile_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_generate_before_create() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = ModelGenerator::new(settings(dir.path(), "true"));
        assert!(matches!(
            generator.generate_c_code(),
            Err(CodegenError::NotCreated)
        ));
    }

    #[tokio::test]
    async fn test_compile_before_generate() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = ModelGenerator::new(settings(dir.path(), "true"));
        let err = generator
            .compile_model_until(std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, CodegenError::NotCreated));

        create(&mut generator, &[1, 3], false);
        let err = generator
            .compile_model_until(std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, CodegenError::NotGenerated));
    }

    #[test]
    fn test_generate_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let mut generator = ModelGenerator::new(settings(&out, "true"));
        create(&mut generator, &[1, 3], false);
        let artifacts = generator.generate_c_code().unwrap().clone();

        assert_eq!(artifacts.source, out.join("moe_j13.c"));
        let c = std::fs::read_to_string(&artifacts.source).unwrap();
        assert!(c.contains("void moe_j13_ode("));
        let h = std::fs::read_to_string(&artifacts.header).unwrap();
        assert!(h.contains("#define MOE_J13_NX 4"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&artifacts.manifest).unwrap()).unwrap();
        assert_eq!(
            json["states"],
            serde_json::json!(["q1", "q3", "q1_dot", "q3_dot"])
        );
    }

    #[tokio::test]
    async fn test_recreate_invalidates_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = ModelGenerator::new(settings(dir.path(), "true"));
        create(&mut generator, &[0], false);
        generator.generate_c_code().unwrap();
        create(&mut generator, &[2], true);
        assert_eq!(generator.ir().unwrap().functions.len(), 3);
        let err = generator
            .compile_model_until(std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, CodegenError::NotGenerated));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_full_pipeline_with_stand_in_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = ModelGenerator::new(settings(dir.path(), "true"));
        create(&mut generator, &[2], true);
        generator.generate_c_code().unwrap();
        let lib = generator
            .compile_model_until(std::future::pending())
            .await
            .unwrap();
        assert_eq!(lib, dir.path().join("liblinear_moe_j2.so"));
    }
}
