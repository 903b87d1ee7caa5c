mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env("GOCRETE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init {
            project_name,
            module_path,
            router,
            db,
            openapi,
            spec,
            docker,
            migrations,
            force,
            engine,
        } => commands::init::run(commands::init::InitArgs {
            project_name,
            module_path,
            router,
            db,
            openapi,
            spec,
            docker,
            migrations,
            force,
            engine,
        }),
        Commands::Add {
            module,
            kind,
            mode,
            spec,
            path,
            engine,
        } => commands::add::run(module, kind, mode, spec, path, engine),
        Commands::Modules => commands::modules::run(),
    }
}
