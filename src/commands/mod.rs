pub mod add;
pub mod init;
pub mod modules;

use std::path::PathBuf;

use console::style;
use gocrete::{DirStore, Engine, GoToolchain, SkipToolchain, UserConfig};

use crate::cli::EngineArgs;

/// Build an engine from command line flags, falling back to user config.
pub fn build_engine(args: &EngineArgs, config: &UserConfig) -> Engine {
    let mut engine = Engine::new();

    let templates = args
        .templates
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| config.templates.dir.clone());
    if let Some(dir) = templates {
        engine = engine.with_store(DirStore::new(dir));
    }

    if args.skip_post_steps || config.toolchain.skip_post_steps {
        engine.with_toolchain(SkipToolchain)
    } else {
        engine.with_toolchain(GoToolchain::new(&config.toolchain.go))
    }
}

pub fn print_notes(notes: &[String], warnings: &[String]) {
    for note in notes {
        eprintln!("{} {}", style("note:").cyan().bold(), note);
    }
    for warning in warnings {
        eprintln!(
            "{} {}",
            style("warning:").yellow().bold(),
            style(warning).yellow()
        );
    }
}
