use std::collections::HashMap;

use crate::error::{GocreteError, Result};
use crate::modules::Module;

pub const DB: &str = "db";
pub const OPENAPI: &str = "openapi";
pub const DOCKER: &str = "docker";

/// Two-level lookup from category and name to a module.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    modules: HashMap<String, HashMap<String, Module>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in modules. Docker has no variants and is registered under
    /// the empty name.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(DB, "postgres", Module::Postgres);
        registry.register(DB, "mongo", Module::Mongo);
        registry.register(OPENAPI, "gen", Module::OpenApiGen);
        registry.register(OPENAPI, "manual", Module::OpenApiManual);
        registry.register(DOCKER, "", Module::Docker);
        registry
    }

    /// Register a module, replacing any existing entry at the same key.
    pub fn register(&mut self, category: &str, name: &str, module: Module) {
        self.modules
            .entry(category.to_string())
            .or_default()
            .insert(name.to_string(), module);
    }

    pub fn get(&self, category: &str, name: &str) -> Option<Module> {
        self.modules.get(category)?.get(name).copied()
    }

    /// Like [`Registry::get`], reporting a miss as an error.
    pub fn resolve(&self, category: &str, name: &str) -> Result<Module> {
        self.get(category, name)
            .ok_or_else(|| GocreteError::ModuleNotFound {
                category: category.to_string(),
                name: name.to_string(),
            })
    }

    /// Every registration, sorted by category then name.
    pub fn entries(&self) -> Vec<(&str, &str, Module)> {
        let mut entries: Vec<_> = self
            .modules
            .iter()
            .flat_map(|(category, names)| {
                names
                    .iter()
                    .map(move |(name, module)| (category.as_str(), name.as_str(), *module))
            })
            .collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        entries
    }
}
