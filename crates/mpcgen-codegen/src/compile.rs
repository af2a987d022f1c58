//! Native compilation of generated sources.
//!
//! The compiler runs as a child process under a deadline and a caller
//! supplied cancellation future. Whichever fires first wins; the child is
//! killed when its future is dropped.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{CodegenError, Result};

/// Fully resolved compiler invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct CompileJob {
    pub compiler: String,
    pub cflags: Vec<String>,
    pub source: PathBuf,
    pub output: PathBuf,
    pub timeout: Duration,
}

impl CompileJob {
    /// `lib<name>.so` next to the source file.
    pub fn shared_library_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("lib{name}.so"))
    }

    /// `<compiler> <cflags...> -o <output> <source>`, plus `-lm`.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.cflags.clone();
        args.push("-o".into());
        args.push(self.output.display().to_string());
        args.push(self.source.display().to_string());
        args.push("-lm".into());
        args
    }

    pub async fn run<F>(&self, cancel: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::debug!("running {} {}", self.compiler, self.args().join(" "));
        let child = Command::new(&self.compiler)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::select! {
            res = tokio::time::timeout(self.timeout, child.wait_with_output()) => match res {
                Ok(output) => output?,
                Err(_) => {
                    tracing::warn!("compiler exceeded {:?}, killing it", self.timeout);
                    return Err(CodegenError::Timeout(self.timeout));
                }
            },
            _ = cancel => {
                tracing::warn!("compilation cancelled, killing compiler");
                return Err(CodegenError::Cancelled);
            }
        };

        if output.status.success() {
            Ok(())
        } else {
            Err(CodegenError::CompileFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Instant;

    use super::*;

    fn job(compiler: &str, dir: &Path, timeout: Duration) -> CompileJob {
        CompileJob {
            compiler: compiler.into(),
            cflags: vec![],
            source: dir.join("m.c"),
            output: CompileJob::shared_library_path(dir, "m"),
            timeout,
        }
    }

    fn script(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-cc.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_args_layout() {
        let j = job("cc", Path::new("/tmp/out"), Duration::from_secs(1));
        assert_eq!(
            j.args(),
            vec!["-o", "/tmp/out/libm.so", "/tmp/out/m.c", "-lm"]
        );
    }

    #[tokio::test]
    async fn test_success() {
        let dir = tempfile::tempdir().unwrap();
        let j = job("true", dir.path(), Duration::from_secs(10));
        j.run(std::future::pending()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let cc = script(dir.path(), "echo 'm.c:1: error' >&2\nexit 3");
        let err = job(&cc, dir.path(), Duration::from_secs(10))
            .run(std::future::pending())
            .await
            .unwrap_err();
        match err {
            CodegenError::CompileFailed { status, stderr } => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "m.c:1: error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let err = job("mpcgen-no-such-compiler", dir.path(), Duration::from_secs(1))
            .run(std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, CodegenError::Io(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let cc = script(dir.path(), "exec sleep 30");
        let start = Instant::now();
        let err = job(&cc, dir.path(), Duration::from_millis(200))
            .run(std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, CodegenError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let cc = script(dir.path(), "exec sleep 30");
        let start = Instant::now();
        let err = job(&cc, dir.path(), Duration::from_secs(60))
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, CodegenError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
