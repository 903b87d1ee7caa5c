mod add;
pub mod manifest;
pub mod post;
mod stage;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{Choice, Database, InitOptions, OpenApiMode, Selection};
use crate::error::{GocreteError, Result};
use crate::modules::registry::{DB, DOCKER, OPENAPI};
use crate::modules::{Module, ModuleContext, ModuleOutcome, Registry};
use crate::overlay::{apply_bundle, AppliedBundle};
use crate::render::RenderContext;
use crate::store::{EmbeddedStore, TemplateStore};

pub use add::{AddReport, AddRequest};
pub use post::{GoToolchain, SkipToolchain, Toolchain};
pub use stage::Stage;

/// Bundle applied to every new project before any module.
pub const BASE_BUNDLE: &str = "base";

/// The template store, module registry and toolchain shared by every run.
pub struct Engine {
    store: Box<dyn TemplateStore>,
    registry: Registry,
    toolchain: Box<dyn Toolchain>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            store: Box::new(EmbeddedStore),
            registry: Registry::builtin(),
            toolchain: Box::new(GoToolchain::default()),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: impl TemplateStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_toolchain(mut self, toolchain: impl Toolchain + 'static) -> Self {
        self.toolchain = Box::new(toolchain);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &dyn TemplateStore {
        self.store.as_ref()
    }

    /// A generation of a new project at `destination`, not yet started.
    pub fn generation(&self, options: InitOptions, destination: impl Into<PathBuf>) -> Generation<'_> {
        Generation {
            engine: self,
            options,
            destination: destination.into(),
            history: vec![Stage::Validating],
        }
    }

    /// Generate a new project at `destination`.
    pub fn init_project(
        &self,
        options: InitOptions,
        destination: impl Into<PathBuf>,
    ) -> Result<GenerationReport> {
        self.generation(options, destination).run()
    }
}

/// A cross-bundle write to a path an earlier bundle already wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overwrite {
    pub path: PathBuf,
    pub replaced: String,
    pub by: String,
}

/// What a finished generation wrote.
#[derive(Debug)]
pub struct GenerationReport {
    pub project_path: PathBuf,
    pub stage: Stage,
    /// Every bundle applied, in order.
    pub applied: Vec<AppliedBundle>,
    /// Modules applied, in order.
    pub modules: Vec<Module>,
    pub extra_files: Vec<PathBuf>,
    pub overwrites: Vec<Overwrite>,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

impl GenerationReport {
    /// Every distinct file written, relative to the project root.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .applied
            .iter()
            .flat_map(AppliedBundle::files)
            .chain(self.extra_files.iter())
            .cloned()
            .collect();
        files.sort();
        files.dedup();
        files
    }
}

/// Tracks which bundle last wrote each path.
#[derive(Default)]
struct WriteLedger {
    owners: BTreeMap<PathBuf, String>,
    overwrites: Vec<Overwrite>,
}

impl WriteLedger {
    fn record(&mut self, owner: &str, files: impl IntoIterator<Item = PathBuf>) {
        for path in files {
            if let Some(previous) = self.owners.insert(path.clone(), owner.to_string()) {
                if previous != owner {
                    info!(path = %path.display(), replaced = %previous, by = owner, "file overwritten");
                    self.overwrites.push(Overwrite {
                        path,
                        replaced: previous,
                        by: owner.to_string(),
                    });
                }
            }
        }
    }

    fn record_bundle(&mut self, applied: &AppliedBundle) {
        self.record(&applied.bundle, applied.files().cloned());
    }
}

/// One run of the new-project pipeline.
///
/// A generation runs at most once; a `Done` or `Failed` generation rejects
/// further runs and a fresh one must be started.
pub struct Generation<'e> {
    engine: &'e Engine,
    options: InitOptions,
    destination: PathBuf,
    history: Vec<Stage>,
}

impl Generation<'_> {
    pub fn stage(&self) -> Stage {
        self.history.last().copied().unwrap_or(Stage::Validating)
    }

    /// Every stage entered so far, in order.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn run(&mut self) -> Result<GenerationReport> {
        let stage = self.stage();
        if stage.is_terminal() {
            return Err(GocreteError::RunFinished { stage });
        }

        match self.execute() {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!(stage = %self.stage(), error = %e, "generation failed");
                self.enter(Stage::Failed);
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: Stage) {
        info!(%stage, "entering stage");
        self.history.push(stage);
    }

    fn execute(&mut self) -> Result<GenerationReport> {
        let engine = self.engine;
        let selection = self.options.validate()?;

        self.enter(Stage::DirectoryPrep);
        prepare_destination(&self.destination, selection.force)?;

        let variables = RenderContext::from_selection(&selection);
        let mut ledger = WriteLedger::default();
        let mut applied = Vec::new();

        self.enter(Stage::BaseApplied);
        let base = apply_bundle(engine.store(), BASE_BUNDLE, &self.destination, &variables)?;
        ledger.record_bundle(&base);
        applied.push(base);

        self.enter(Stage::ModulesApplied);
        let cx = ModuleContext {
            store: engine.store(),
            project_path: &self.destination,
            selection: &selection,
            variables: &variables,
        };
        let mut modules = Vec::new();
        let mut extra_files = Vec::new();
        let mut notes = Vec::new();
        for (category, name) in selected_modules(&selection) {
            let module = engine.registry.resolve(category, name)?;
            let outcome = apply_module(module, &cx)?;
            for bundle in &outcome.applied {
                ledger.record_bundle(bundle);
            }
            ledger.record(module.name(), outcome.extra_files.iter().cloned());
            modules.push(module);
            applied.extend(outcome.applied);
            extra_files.extend(outcome.extra_files);
            notes.extend(outcome.notes);
        }

        self.enter(Stage::PostStepsRun);
        let toolchain = engine.toolchain.as_ref();
        toolchain.init_module(&self.destination, &selection.module_path)?;
        toolchain.resolve_dependencies(&self.destination)?;
        let mut warnings = Vec::new();
        if let Err(e) = toolchain.format(&self.destination) {
            warn!(error = %e, "formatting failed");
            warnings.push(e.to_string());
        }

        self.enter(Stage::Done);
        Ok(GenerationReport {
            project_path: self.destination.clone(),
            stage: Stage::Done,
            applied,
            modules,
            extra_files,
            overwrites: ledger.overwrites,
            notes,
            warnings,
        })
    }
}

/// Registry keys for the enabled capabilities, in application order:
/// database, then OpenAPI, then Docker.
fn selected_modules(selection: &Selection) -> Vec<(&'static str, &'static str)> {
    let mut keys = Vec::new();
    if selection.database != Database::None {
        keys.push((DB, selection.database.as_str()));
    }
    if selection.openapi != OpenApiMode::None {
        keys.push((OPENAPI, selection.openapi.as_str()));
    }
    if selection.docker {
        keys.push((DOCKER, ""));
    }
    keys
}

pub(crate) fn apply_module(module: Module, cx: &ModuleContext<'_>) -> Result<ModuleOutcome> {
    info!(module = module.name(), "applying module");
    module.apply(cx).map_err(|e| GocreteError::Module {
        module: module.name().to_string(),
        source: Box::new(e),
    })
}

fn prepare_destination(destination: &Path, force: bool) -> Result<()> {
    if destination.exists() {
        if force {
            guard_removal(destination)?;
            info!(path = %destination.display(), "removing existing destination");
            remove(destination)?;
        } else if has_contents(destination) {
            return Err(GocreteError::OutputExists {
                path: destination.to_path_buf(),
            });
        }
    }

    std::fs::create_dir_all(destination).map_err(|e| GocreteError::Io {
        context: format!("creating project directory {}", destination.display()),
        source: e,
    })
}

fn has_contents(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut d| d.next().is_some())
        .unwrap_or(true)
}

/// Refuse to remove a filesystem root, the working directory, or any of its
/// ancestors.
fn guard_removal(destination: &Path) -> Result<()> {
    let canonical = |path: &Path| {
        path.canonicalize().map_err(|e| GocreteError::Io {
            context: format!("resolving {}", path.display()),
            source: e,
        })
    };
    let target = canonical(destination)?;
    let cwd = std::env::current_dir().map_err(|e| GocreteError::Io {
        context: "getting current directory".into(),
        source: e,
    })?;
    let cwd = canonical(&cwd)?;

    if target.parent().is_none() || cwd.starts_with(&target) {
        return Err(GocreteError::UnsafeOverwrite {
            path: destination.to_path_buf(),
        });
    }
    Ok(())
}

fn remove(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|e| GocreteError::Io {
        context: format!("removing {}", path.display()),
        source: e,
    })
}
