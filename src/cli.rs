use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gocrete",
    about = "Modular Go backend project scaffolding",
    version
)]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by commands that write files.
#[derive(Args, Clone, Default)]
pub struct EngineArgs {
    /// Read template bundles from this directory instead of the built-in ones
    #[arg(long, value_name = "DIR")]
    pub templates: Option<String>,

    /// Skip go mod init/tidy and go fmt
    #[arg(long)]
    pub skip_post_steps: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new Go backend project
    Init {
        /// Project name, also the output directory
        project_name: String,

        /// Go module path (e.g. github.com/acme/billing)
        #[arg(long = "module", value_name = "PATH")]
        module_path: String,

        /// HTTP router: chi, gin or fiber
        #[arg(long)]
        router: Option<String>,

        /// Database: none, postgres or mongo
        #[arg(long)]
        db: Option<String>,

        /// OpenAPI mode: none, gen or manual
        #[arg(long)]
        openapi: Option<String>,

        /// OpenAPI spec file (required with --openapi gen)
        #[arg(long)]
        spec: Option<String>,

        /// Add Dockerfile and docker-compose.yml
        #[arg(long)]
        docker: bool,

        /// Migrations tool: none or goose
        #[arg(long)]
        migrations: Option<String>,

        /// Replace the output directory if it exists
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Add a module to an existing project
    Add {
        /// Module to add: db, openapi or docker
        module: String,

        /// Database type for the db module
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Mode for the openapi module
        #[arg(long)]
        mode: Option<String>,

        /// OpenAPI spec file
        #[arg(long)]
        spec: Option<String>,

        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        path: String,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// List available modules
    Modules,
}
