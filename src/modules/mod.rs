mod database;
mod openapi;
pub mod registry;

use std::path::{Path, PathBuf};

use crate::config::{Database, OpenApiMode, Selection};
use crate::error::Result;
use crate::overlay::{apply_bundle, AppliedBundle};
use crate::render::RenderContext;
use crate::store::TemplateStore;

pub use registry::Registry;

/// Everything a module needs for one application.
pub struct ModuleContext<'a> {
    pub store: &'a dyn TemplateStore,
    pub project_path: &'a Path,
    pub selection: &'a Selection,
    pub variables: &'a RenderContext,
}

/// What a module wrote.
#[derive(Debug, Default)]
pub struct ModuleOutcome {
    /// The module's own bundle first, then any conditional extras.
    pub applied: Vec<AppliedBundle>,
    /// Files written outside any bundle, relative to the project root.
    pub extra_files: Vec<PathBuf>,
    pub notes: Vec<String>,
}

impl ModuleOutcome {
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.applied
            .iter()
            .flat_map(AppliedBundle::files)
            .chain(self.extra_files.iter())
    }
}

/// A named capability backed by one template bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Postgres,
    Mongo,
    OpenApiGen,
    OpenApiManual,
    Docker,
}

impl Module {
    pub const ALL: [Module; 5] = [
        Self::Postgres,
        Self::Mongo,
        Self::OpenApiGen,
        Self::OpenApiManual,
        Self::Docker,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mongo => "mongo",
            Self::OpenApiGen => "openapi-gen",
            Self::OpenApiManual => "openapi-manual",
            Self::Docker => "docker",
        }
    }

    pub fn bundle(self) -> &'static str {
        match self {
            Self::Postgres => "db/postgres",
            Self::Mongo => "db/mongo",
            Self::OpenApiGen => "openapi/gen",
            Self::OpenApiManual => "openapi/manual",
            Self::Docker => "docker",
        }
    }

    /// Apply the module's bundle, then its conditional extras.
    ///
    /// Bundle failures are returned unchanged.
    pub fn apply(self, cx: &ModuleContext<'_>) -> Result<ModuleOutcome> {
        let mut outcome = ModuleOutcome::default();
        outcome.applied.push(apply_bundle(
            cx.store,
            self.bundle(),
            cx.project_path,
            cx.variables,
        )?);

        match self {
            Self::Postgres => database::postgres_extras(cx, &mut outcome)?,
            Self::Mongo => database::mongo_extras(cx, &mut outcome),
            Self::OpenApiGen => openapi::gen_extras(cx, &mut outcome)?,
            Self::OpenApiManual | Self::Docker => {}
        }

        Ok(outcome)
    }

    /// Mark this module's capability as selected.
    pub fn enable(self, selection: &mut Selection) {
        match self {
            Self::Postgres => selection.database = Database::Postgres,
            Self::Mongo => selection.database = Database::Mongo,
            Self::OpenApiGen => selection.openapi = OpenApiMode::Gen,
            Self::OpenApiManual => selection.openapi = OpenApiMode::Manual,
            Self::Docker => selection.docker = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InitOptions, Router};
    use crate::store::EmbeddedStore;

    fn selection() -> Selection {
        InitOptions {
            project_name: "svc".into(),
            module_path: "github.com/acme/svc".into(),
            ..InitOptions::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn module_names() {
        let names: Vec<_> = Module::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            ["postgres", "mongo", "openapi-gen", "openapi-manual", "docker"]
        );
    }

    #[test]
    fn enable_sets_the_matching_capability() {
        let mut selection = Selection::for_existing("github.com/acme/svc", Router::Chi);
        Module::Mongo.enable(&mut selection);
        Module::OpenApiManual.enable(&mut selection);
        Module::Docker.enable(&mut selection);
        assert_eq!(selection.database, Database::Mongo);
        assert_eq!(selection.openapi, OpenApiMode::Manual);
        assert!(selection.docker);
    }

    #[test]
    fn every_module_applies_its_embedded_bundle() {
        for module in Module::ALL {
            let mut selection = selection();
            module.enable(&mut selection);
            let variables = RenderContext::from_selection(&selection);
            let dest = tempfile::tempdir().unwrap();
            let cx = ModuleContext {
                store: &EmbeddedStore,
                project_path: dest.path(),
                selection: &selection,
                variables: &variables,
            };

            let outcome = module.apply(&cx).unwrap();
            assert_eq!(outcome.applied[0].bundle, module.bundle());
            assert!(outcome.files().count() > 0, "{} wrote nothing", module.name());
            for file in outcome.files() {
                assert!(dest.path().join(file).is_file());
            }
        }
    }
}
