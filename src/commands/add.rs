use std::path::PathBuf;

use console::style;
use gocrete::config::load_user_config;
use gocrete::AddRequest;
use miette::Result;

use crate::cli::EngineArgs;
use crate::commands::{build_engine, print_notes};

pub fn run(
    module: String,
    kind: Option<String>,
    mode: Option<String>,
    spec: Option<String>,
    path: String,
    engine_args: EngineArgs,
) -> Result<()> {
    let config = load_user_config()?.unwrap_or_default();
    let engine = build_engine(&engine_args, &config);
    let project = PathBuf::from(path);

    let request = AddRequest {
        category: module,
        kind,
        mode,
        spec_path: spec,
    };

    println!(
        "{} Adding {} to {}",
        style("==>").cyan().bold(),
        style(&request.category).cyan(),
        project.display()
    );

    let report = engine.add_module(&request, &project)?;

    print_notes(&report.outcome.notes, &[]);

    println!(
        "\n{} Module {} added to {}",
        style("✓").green().bold(),
        style(report.module.name()).cyan(),
        report.module_path
    );
    for file in report.outcome.files() {
        println!("  {} {}", style("write").green(), file.display());
    }

    Ok(())
}
