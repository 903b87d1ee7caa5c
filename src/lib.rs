pub mod config;
pub mod engine;
pub mod error;
pub mod modules;
pub mod overlay;
pub mod render;
pub mod store;

pub use config::{InitOptions, Selection, UserConfig};
pub use engine::{
    AddReport, AddRequest, Engine, Generation, GenerationReport, GoToolchain, SkipToolchain,
    Stage, Toolchain,
};
pub use error::{GocreteError, Result};
pub use modules::{Module, Registry};
pub use overlay::apply_bundle;
pub use render::{render, RenderContext};
pub use store::{DirStore, EmbeddedStore, MemoryStore, TemplateStore};
