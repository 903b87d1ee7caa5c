#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::engine::Stage;
use crate::render::RenderFault;

#[derive(Debug, Error, Diagnostic)]
pub enum GocreteError {
    #[error("Invalid {field}: '{value}' (must be one of: {allowed})")]
    #[diagnostic(help("Choose one of the allowed values and run the command again"))]
    InvalidChoice {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("{field} must not be empty")]
    EmptyField { field: String },

    #[error("--{flag} is required for the {module} module")]
    MissingSelector { module: String, flag: String },

    #[error("Unknown module: {name}")]
    #[diagnostic(help("Available modules: db, openapi, docker"))]
    UnknownModule { name: String },

    #[error("Output directory already exists: {path}")]
    #[diagnostic(help("Use --force to replace the existing directory"))]
    OutputExists { path: PathBuf },

    #[error("Refusing to remove {path}")]
    #[diagnostic(help("Generate into a named subdirectory instead of the working directory"))]
    UnsafeOverwrite { path: PathBuf },

    #[error("Template bundle not found: {bundle}")]
    #[diagnostic(help("The template store is incomplete; reinstall gocrete or check --templates"))]
    BundleNotFound { bundle: String },

    #[error("Template file not found: {path}")]
    TemplateNotFound { path: String },

    #[error("Failed to render template {template}")]
    RenderError {
        template: String,
        #[source]
        source: RenderFault,
    },

    #[error("Failed to apply {bundle} at {}", path.display())]
    Apply {
        bundle: String,
        path: PathBuf,
        #[source]
        source: Box<GocreteError>,
    },

    #[error("Module not found: {category}/{name}")]
    ModuleNotFound { category: String, name: String },

    #[error("Failed to apply {module} module")]
    Module {
        module: String,
        #[source]
        source: Box<GocreteError>,
    },

    #[error("{step} failed: {message}")]
    PostStep { step: String, message: String },

    #[error("go.mod not found in {path}")]
    #[diagnostic(help("Run this command from the root of a generated project"))]
    ManifestMissing { path: PathBuf },

    #[error("Module path not found in {path}")]
    #[diagnostic(help("go.mod must contain a `module <path>` line"))]
    ModulePathMissing { path: PathBuf },

    #[error("Generation already finished in stage {stage}")]
    #[diagnostic(help("Start a fresh run, optionally with --force"))]
    RunFinished { stage: Stage },

    #[error("Failed to parse {path}")]
    #[diagnostic(help("Check the TOML syntax in your gocrete config file"))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl GocreteError {
    /// Bad user input caught before anything touched the filesystem.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidChoice { .. }
                | Self::EmptyField { .. }
                | Self::MissingSelector { .. }
                | Self::UnknownModule { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GocreteError>;
