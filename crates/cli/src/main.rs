use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use taskgraph_core::provider::ReaderConfig;
use taskgraph_core::reader::TaskfileReader;
use taskgraph_core::taskfile_manager::{TaskfileManager, TaskfileManagerConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

const DEFAULT_TASKFILE: &str =
    "https://raw.githubusercontent.com/gkwa/ringgem/refs/heads/master/Taskfile.yaml";

/// taskgraph - Inspect the include graph and task dependencies of a Taskfile
#[derive(Parser)]
#[command(name = "taskgraph")]
#[command(about = "Inspect the include graph and task dependencies of a Taskfile")]
#[command(version)]
struct Cli {
    /// Path, URL or Git reference of the root Taskfile
    #[arg(long, env = "TASKGRAPH_TASKFILE", default_value = DEFAULT_TASKFILE, global = true)]
    taskfile: String,

    /// Task the dependency tree starts from
    #[arg(long, env = "TASKGRAPH_START", default_value = "default", global = true)]
    start: String,

    /// Re-fetch remote Taskfiles even when a cached copy is fresh
    #[arg(long, env = "TASKGRAPH_NO_CACHE", global = true)]
    no_cache: bool,

    /// Allow plain http:// Taskfiles
    #[arg(long, env = "TASKGRAPH_INSECURE", global = true)]
    insecure: bool,

    /// Only use cached copies of remote Taskfiles
    #[arg(long, env = "TASKGRAPH_OFFLINE", global = true)]
    offline: bool,

    /// Directory the remote cache lives under (defaults to the system temp dir)
    #[arg(long, env = "TASKGRAPH_TEMP_DIR", global = true)]
    temp_dir: Option<PathBuf>,

    /// Age after which cached remote Taskfiles are fetched again
    #[arg(long, env = "TASKGRAPH_CACHE_EXPIRY_HOURS", default_value_t = 24, global = true)]
    cache_expiry_hours: u64,

    /// Network timeout for each remote fetch
    #[arg(long, env = "TASKGRAPH_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the summary, inclusion graph, task listing and dependency tree
    Report,
    /// Show Taskfiles in inclusion order
    Includes,
    /// List every task with its dependencies and commands
    Tasks,
    /// Show the dependency tree of a task
    Tree {
        /// Task to start from (defaults to --start)
        task: Option<String>,
    },
    /// Manage cached remote Taskfiles
    Cache {
        #[command(subcommand)]
        cache_command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum CacheCommands {
    /// List cached Taskfiles
    List,
    /// Remove every cached Taskfile
    Clear,
}

impl Cli {
    fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            insecure: self.insecure,
            download: self.no_cache,
            offline: self.offline,
            temp_dir: self.temp_dir.clone().unwrap_or_else(std::env::temp_dir),
            cache_expiry: Duration::from_secs(
                self.cache_expiry_hours.saturating_mul(60 * 60),
            ),
            timeout: Duration::from_secs(self.timeout_secs),
            debug: Some(Arc::new(|message: &str| tracing::debug!("{}", message))),
            prompt: Some(Arc::new(|message: &str| -> Result<()> {
                eprintln!("PROMPT: {}", message);
                Ok(())
            })),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let reader = TaskfileReader::new(cli.reader_config())?;

    match cli.command.unwrap_or(Commands::Report) {
        Commands::Report => {
            let manager = load(&reader, &cli.taskfile).await?;
            commands::report::execute(&manager, &cli.start)
        }
        Commands::Includes => commands::includes::execute(&load(&reader, &cli.taskfile).await?),
        Commands::Tasks => commands::tasks::execute(&load(&reader, &cli.taskfile).await?),
        Commands::Tree { task } => {
            let manager = load(&reader, &cli.taskfile).await?;
            commands::tree::execute(&manager, task.as_deref().unwrap_or(&cli.start))
        }
        Commands::Cache { cache_command } => commands::cache::execute(&reader, cache_command).await,
    }
}

async fn load(reader: &TaskfileReader, locator: &str) -> Result<TaskfileManager> {
    let manager = TaskfileManager::new(
        reader,
        TaskfileManagerConfig {
            locator: locator.to_string(),
        },
    )
    .await?;
    Ok(manager)
}
