use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::engine::manifest::MANIFEST;
use crate::error::{GocreteError, Result};

/// External tools run after files are written.
pub trait Toolchain {
    /// Create the module manifest. Fatal on failure.
    fn init_module(&self, project: &Path, module_path: &str) -> Result<()>;

    /// Resolve dependencies. Fatal on failure.
    fn resolve_dependencies(&self, project: &Path) -> Result<()>;

    /// Format generated sources. Callers downgrade failures to warnings.
    fn format(&self, project: &Path) -> Result<()>;
}

/// Runs the `go` command line tool.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    binary: PathBuf,
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self::new("go")
    }
}

impl GoToolchain {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, project: &Path, step: &str, args: &[&str]) -> Result<()> {
        info!(step, "running post step");
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(project)
            .output()
            .map_err(|e| GocreteError::PostStep {
                step: step.to_string(),
                message: format!("failed to execute {}: {e}", self.binary.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("exited with status {}", output.status),
                detail => detail.to_string(),
            };
            return Err(GocreteError::PostStep {
                step: step.to_string(),
                message,
            });
        }
        Ok(())
    }
}

impl Toolchain for GoToolchain {
    fn init_module(&self, project: &Path, module_path: &str) -> Result<()> {
        if project.join(MANIFEST).exists() {
            debug!("go.mod already present, skipping go mod init");
            return Ok(());
        }
        self.run(project, "go mod init", &["mod", "init", module_path])
    }

    fn resolve_dependencies(&self, project: &Path) -> Result<()> {
        self.run(project, "go mod tidy", &["mod", "tidy"])
    }

    fn format(&self, project: &Path) -> Result<()> {
        self.run(project, "go fmt", &["fmt", "./..."])
    }
}

/// Skips every post step.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipToolchain;

impl Toolchain for SkipToolchain {
    fn init_module(&self, _project: &Path, _module_path: &str) -> Result<()> {
        Ok(())
    }

    fn resolve_dependencies(&self, _project: &Path) -> Result<()> {
        Ok(())
    }

    fn format(&self, _project: &Path) -> Result<()> {
        Ok(())
    }
}
