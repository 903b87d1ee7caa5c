use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Selection;
use crate::engine::{apply_module, manifest, Engine};
use crate::error::{GocreteError, Result};
use crate::modules::registry::{DB, DOCKER, OPENAPI};
use crate::modules::{Module, ModuleContext, ModuleOutcome};
use crate::render::RenderContext;

/// A request to add one capability to an existing project.
#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    /// `db`, `openapi` or `docker`.
    pub category: String,
    /// Database type, required for `db`.
    pub kind: Option<String>,
    /// OpenAPI mode, required for `openapi`.
    pub mode: Option<String>,
    pub spec_path: Option<String>,
}

impl AddRequest {
    /// The registry key this request names. Fails before any lookup when the
    /// category is unknown or its sub-selector is missing.
    pub fn key(&self) -> Result<(&'static str, &str)> {
        match self.category.as_str() {
            DB => Ok((DB, required(DB, "type", self.kind.as_deref())?)),
            OPENAPI => Ok((OPENAPI, required(OPENAPI, "mode", self.mode.as_deref())?)),
            DOCKER => Ok((DOCKER, "")),
            _ => Err(GocreteError::UnknownModule {
                name: self.category.clone(),
            }),
        }
    }
}

fn required<'a>(module: &str, flag: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(GocreteError::MissingSelector {
            module: module.to_string(),
            flag: flag.to_string(),
        }),
    }
}

/// What adding a module wrote.
#[derive(Debug)]
pub struct AddReport {
    pub project_path: PathBuf,
    pub module: Module,
    pub module_path: String,
    pub outcome: ModuleOutcome,
}

impl Engine {
    /// Apply one module to the project at `project`, then resolve its
    /// dependencies. Formatting is never run on this path.
    pub fn add_module(&self, request: &AddRequest, project: &Path) -> Result<AddReport> {
        let (category, name) = request.key()?;
        let (module_path, router) = manifest::read_module_path(project)?;
        let module = self.registry.resolve(category, name)?;

        let mut selection = Selection::for_existing(&module_path, router);
        module.enable(&mut selection);
        selection.spec_path = request.spec_path.clone().filter(|p| !p.is_empty());
        let variables = RenderContext::from_selection(&selection);

        info!(module = module.name(), project = %project.display(), %router, "adding module");
        let outcome = apply_module(
            module,
            &ModuleContext {
                store: self.store(),
                project_path: project,
                selection: &selection,
                variables: &variables,
            },
        )?;

        self.toolchain.resolve_dependencies(project)?;

        Ok(AddReport {
            project_path: project.to_path_buf(),
            module,
            module_path,
            outcome,
        })
    }
}
