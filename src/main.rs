//! Artifact Transfer CLI
//!
//! Entry point for the `artifact` command-line tool.

use clap::{Args, Parser, Subcommand};
use std::process;

use artifact_transfer::{
    HubConfig, Orchestrator, PullOptions, PushOptions, ResourceScope, ScopeKind, TransferStats,
};

#[derive(Parser)]
#[command(name = "artifact")]
#[command(about = "Store, retrieve and delete build artifacts via the hub", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScopeArgs {
    /// Scope to a project (identifier optional if ARTIFACT_PROJECT_ID is set)
    #[arg(long, short = 'p', conflicts_with_all = ["workflow", "job"], num_args = 0..=1, default_missing_value = "")]
    project: Option<String>,

    /// Scope to a workflow (identifier optional if ARTIFACT_WORKFLOW_ID is set)
    #[arg(long, short = 'w', conflicts_with = "job", num_args = 0..=1, default_missing_value = "")]
    workflow: Option<String>,

    /// Scope to a job (identifier optional if ARTIFACT_JOB_ID is set)
    #[arg(long, short = 'j', num_args = 0..=1, default_missing_value = "")]
    job: Option<String>,
}

impl ScopeArgs {
    /// Default scope is the current job.
    fn resolve(&self) -> Result<ResourceScope, artifact_transfer::scope::ScopeError> {
        if let Some(id) = &self.project {
            ResourceScope::resolve(ScopeKind::Project, Some(id))
        } else if let Some(id) = &self.workflow {
            ResourceScope::resolve(ScopeKind::Workflow, Some(id))
        } else {
            ResourceScope::resolve(ScopeKind::Job, self.job.as_deref())
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file or directory into the scope's artifact space
    Push {
        /// Local file or directory to upload
        source: String,

        /// Remote destination path (default: basename of the source)
        #[arg(long, short = 'd')]
        destination: Option<String>,

        /// Overwrite an existing remote artifact
        #[arg(long, short = 'f')]
        force: bool,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Download a remote artifact or prefix
    Pull {
        /// Remote path or prefix to download
        source: String,

        /// Local destination path (default: basename of the source)
        #[arg(long, short = 'd')]
        destination: Option<String>,

        /// Overwrite existing local files
        #[arg(long, short = 'f')]
        force: bool,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Delete a remote artifact or prefix
    Yank {
        /// Remote path or prefix to delete
        path: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(message) = run(cli).await {
        eprintln!("Error: {message}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = HubConfig::from_env().map_err(|e| e.to_string())?;
    let orchestrator = Orchestrator::new(&config).map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Push {
            source,
            destination,
            force,
            scope,
        } => {
            let scope = scope.resolve().map_err(|e| e.to_string())?;
            let options = PushOptions {
                source,
                destination,
                force,
            };
            let stats = orchestrator
                .push(&scope, &options)
                .await
                .map_err(|e| e.to_string())?;
            report("Pushed", &stats);
        }
        Commands::Pull {
            source,
            destination,
            force,
            scope,
        } => {
            let scope = scope.resolve().map_err(|e| e.to_string())?;
            let options = PullOptions {
                source,
                destination,
                force,
            };
            let stats = orchestrator
                .pull(&scope, &options)
                .await
                .map_err(|e| e.to_string())?;
            report("Pulled", &stats);
        }
        Commands::Yank { path, scope } => {
            let scope = scope.resolve().map_err(|e| e.to_string())?;
            let stats = orchestrator
                .yank(&scope, &path)
                .await
                .map_err(|e| e.to_string())?;
            println!("Yanked {} object(s)", stats.file_count);
        }
    }
    Ok(())
}

fn report(verb: &str, stats: &TransferStats) {
    println!(
        "{verb} {} file(s), {} byte(s)",
        stats.file_count, stats.total_bytes
    );
}
