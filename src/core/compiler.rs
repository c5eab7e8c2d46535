// src/core/compiler.rs
//! Typesetting toolchain invocation: rendered source in, PDF bytes out

use crate::core::config_manager::ToolchainConfig;
use crate::core::deadline::{run_with_deadline, DeadlineExceeded};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

const SOURCE_FILE: &str = "resume.tex";
const ARTIFACT_FILE: &str = "resume.pdf";
const PASSES: u8 = 2;

/// Install locations checked after the search path, in order
const WELL_KNOWN_DIRS: &[&str] = &[
    "/Library/TeX/texbin",
    "/usr/local/texlive/2025/bin/universal-darwin",
    "/usr/local/texlive/2024/bin/universal-darwin",
    "/usr/local/texlive/2023/bin/universal-darwin",
    "/usr/local/texlive/2025/bin/x86_64-linux",
    "/usr/local/texlive/2024/bin/x86_64-linux",
    "/usr/local/texlive/2023/bin/x86_64-linux",
    "/usr/bin",
];

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{binary} not found. Install LaTeX (e.g., 'brew install --cask mactex' on macOS)")]
    ToolchainNotFound { binary: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{toolchain} failed on pass {pass} ({status})\nOutput: {output}")]
    PassFailed {
        toolchain: String,
        pass: u8,
        status: String,
        output: String,
    },

    #[error("toolchain reported success but {} was not produced", path.display())]
    MissingArtifact { path: PathBuf },

    #[error(transparent)]
    DeadlineExceeded(#[from] DeadlineExceeded),
}

impl CompileError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CompileError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Locate `binary`: an explicit path is taken as-is, otherwise the entries of
/// `path_var` are searched before `fallback_dirs`. First existing match wins.
pub fn find_toolchain_in(
    binary: &str,
    path_var: Option<&OsStr>,
    fallback_dirs: &[PathBuf],
) -> Option<PathBuf> {
    let direct = Path::new(binary);
    if direct.components().count() > 1 {
        return is_executable(direct).then(|| direct.to_path_buf());
    }

    let search = path_var
        .map(|paths| std::env::split_paths(paths).collect::<Vec<_>>())
        .unwrap_or_default();

    search
        .iter()
        .chain(fallback_dirs)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Scratch directory removed when dropped, including on cancellation
struct BuildDir(PathBuf);

impl BuildDir {
    async fn create() -> Result<Self, CompileError> {
        let path = std::env::temp_dir().join(format!("resume-build-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&path).await.map_err(|e| {
            CompileError::io(format!("failed to create build directory {}", path.display()), e)
        })?;
        Ok(Self(path))
    }
}

impl Drop for BuildDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            warn!("Failed to clean up {}: {}", self.0.display(), e);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactCompiler {
    toolchain: PathBuf,
    timeout: Option<Duration>,
}

impl ArtifactCompiler {
    pub fn new(toolchain: PathBuf, timeout: Option<Duration>) -> Self {
        Self { toolchain, timeout }
    }

    /// Resolve the configured toolchain against PATH and the well-known install locations
    pub fn locate(config: &ToolchainConfig) -> Result<Self, CompileError> {
        let fallbacks: Vec<PathBuf> = WELL_KNOWN_DIRS.iter().map(PathBuf::from).collect();
        let path_var = std::env::var_os("PATH");

        let toolchain = find_toolchain_in(&config.binary, path_var.as_deref(), &fallbacks)
            .ok_or_else(|| CompileError::ToolchainNotFound {
                binary: config.binary.clone(),
            })?;

        debug!("Using toolchain at {}", toolchain.display());
        Ok(Self::new(toolchain, config.timeout))
    }

    pub fn toolchain(&self) -> &Path {
        &self.toolchain
    }

    /// Typeset `document`, running the toolchain exactly twice.
    /// A failing pass aborts immediately with the toolchain's combined output.
    pub async fn compile(&self, document: &str) -> Result<Vec<u8>, CompileError> {
        run_with_deadline(self.timeout, self.compile_in_build_dir(document)).await?
    }

    async fn compile_in_build_dir(&self, document: &str) -> Result<Vec<u8>, CompileError> {
        let build_dir = BuildDir::create().await?;
        let source_path = build_dir.0.join(SOURCE_FILE);

        tokio::fs::write(&source_path, document)
            .await
            .map_err(|e| CompileError::io("failed to write LaTeX source", e))?;

        for pass in 1..=PASSES {
            self.run_pass(pass, &build_dir.0, &source_path).await?;
        }

        let artifact_path = build_dir.0.join(ARTIFACT_FILE);
        let bytes = match tokio::fs::read(&artifact_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CompileError::MissingArtifact {
                    path: artifact_path,
                })
            }
            Err(e) => return Err(CompileError::io("failed to read PDF", e)),
        };

        info!("Compiled document ({} bytes)", bytes.len());
        Ok(bytes)
    }

    async fn run_pass(&self, pass: u8, out_dir: &Path, source: &Path) -> Result<(), CompileError> {
        debug!("Running {} pass {}/{}", self.toolchain.display(), pass, PASSES);

        let output = Command::new(&self.toolchain)
            .arg("-interaction=nonstopmode")
            .arg(format!("-output-directory={}", out_dir.display()))
            .arg(source)
            .current_dir(out_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                CompileError::io(format!("failed to execute {}", self.toolchain.display()), e)
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(CompileError::PassFailed {
                toolchain: self.toolchain.display().to_string(),
                pass,
                status: output.status.to_string(),
                output: combined,
            });
        }

        Ok(())
    }
}
