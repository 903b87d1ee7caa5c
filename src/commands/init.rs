use std::path::PathBuf;

use console::style;
use gocrete::config::load_user_config;
use gocrete::{GocreteError, InitOptions};
use miette::Result;

use crate::cli::EngineArgs;
use crate::commands::{build_engine, print_notes};

pub struct InitArgs {
    pub project_name: String,
    pub module_path: String,
    pub router: Option<String>,
    pub db: Option<String>,
    pub openapi: Option<String>,
    pub spec: Option<String>,
    pub docker: bool,
    pub migrations: Option<String>,
    pub force: bool,
    pub engine: EngineArgs,
}

pub fn run(args: InitArgs) -> Result<()> {
    let config = load_user_config()?.unwrap_or_default();
    let defaults = &config.defaults;
    let fallback = InitOptions::default();

    let options = InitOptions {
        project_name: args.project_name.clone(),
        module_path: args.module_path,
        router: args
            .router
            .or_else(|| defaults.router.clone())
            .unwrap_or(fallback.router),
        database: args
            .db
            .or_else(|| defaults.db.clone())
            .unwrap_or(fallback.database),
        openapi: args
            .openapi
            .or_else(|| defaults.openapi.clone())
            .unwrap_or(fallback.openapi),
        spec_path: args.spec,
        docker: args.docker || defaults.docker.unwrap_or(false),
        migrations: args
            .migrations
            .or_else(|| defaults.migrations.clone())
            .unwrap_or(fallback.migrations),
        force: args.force,
    };

    if options.openapi == "gen" && options.spec_path.as_deref().unwrap_or("").is_empty() {
        return Err(GocreteError::MissingSelector {
            module: "openapi gen".into(),
            flag: "spec".into(),
        }
        .into());
    }

    let engine = build_engine(&args.engine, &config);
    let destination = PathBuf::from(&args.project_name);

    println!(
        "{} Initializing {} ({})",
        style("==>").cyan().bold(),
        style(&options.project_name).cyan(),
        options.module_path
    );

    let report = engine.init_project(options, &destination)?;

    print_notes(&report.notes, &report.warnings);

    println!(
        "\n{} Project {} created at {}",
        style("✓").green().bold(),
        style(&args.project_name).cyan(),
        style(report.project_path.display()).cyan()
    );
    println!(
        "  {} files written from {} bundles",
        report.files().len(),
        report.applied.len()
    );
    println!("\nNext steps:");
    println!("  cd {}", args.project_name);
    println!("  go mod download");
    println!("  go run cmd/server/main.go");

    Ok(())
}
