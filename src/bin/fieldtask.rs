//! Operator command line for the task store.
//!
//! ```text
//! fieldtask migrate
//! fieldtask projects --author <actor>
//! fieldtask states --project <uuid>
//! fieldtask pending --author <actor>
//! fieldtask history --project <uuid> --task <uuid>
//! ```
//!
//! Query results are written to stdout as JSON. Diagnostics go to stderr and
//! honour `RUST_LOG`.

use clap::{Parser, Subcommand};
use fieldtask::{
    config::{ConfigError, DATABASE_URL_VAR, StoreConfig},
    migrations,
    task::{
        adapters::postgres::PostgresTaskRepository,
        domain::{ActorId, ProjectId, TaskDomainError, TaskId},
        services::{TaskLifecycleError, TaskLifecycleService},
    },
};
use mockable::DefaultClock;
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "fieldtask", version, about = "Inspect and migrate the task store")]
struct Cli {
    /// `PostgreSQL` connection URL.
    #[arg(long, global = true, env = DATABASE_URL_VAR, hide_env_values = true)]
    database_url: Option<String>,

    /// Maximum pooled connections.
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pool_size: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply the embedded schema migrations.
    Migrate,
    /// Print the projects authored by an actor.
    Projects {
        /// Author actor identifier.
        #[arg(long)]
        author: String,
    },
    /// Print the resolved state of every task in a project.
    States {
        /// Project identifier.
        #[arg(long)]
        project: Uuid,
    },
    /// Print tasks awaiting the author's approval.
    Pending {
        /// Author actor identifier.
        #[arg(long)]
        author: String,
    },
    /// Print the event log of a task, oldest first.
    History {
        /// Project identifier.
        #[arg(long)]
        project: Uuid,
        /// Task identifier.
        #[arg(long)]
        task: Uuid,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid argument: {0}")]
    Argument(#[from] TaskDomainError),
    #[error("migration failed: {0}")]
    Migration(#[source] diesel::result::Error),
    #[error("failed to acquire a connection: {0}")]
    Connection(#[from] diesel::r2d2::PoolError),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Task(#[from] TaskLifecycleError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

type Service = TaskLifecycleService<PostgresTaskRepository, DefaultClock>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.database_url, cli.pool_size)?;
    let pool = config.build_pool()?;

    match cli.command {
        Command::Migrate => {
            tokio::task::spawn_blocking(move || {
                let mut connection = pool.get()?;
                migrations::apply_all(&mut connection).map_err(CliError::Migration)
            })
            .await??;
            info!(count = migrations::MIGRATIONS.len(), "migrations applied");
            Ok(())
        }
        Command::Projects { author } => {
            let lifecycle = lifecycle_service(pool);
            let projects = lifecycle
                .projects_by_author(&ActorId::new(author)?)
                .await?;
            emit(&projects)
        }
        Command::States { project } => {
            let lifecycle = lifecycle_service(pool);
            let states = lifecycle
                .all_task_states(ProjectId::from_uuid(project))
                .await?;
            emit(&states)
        }
        Command::Pending { author } => {
            let lifecycle = lifecycle_service(pool);
            let pending = lifecycle
                .list_pending_tasks_for_author(&ActorId::new(author)?)
                .await?;
            emit(&pending)
        }
        Command::History { project, task } => {
            let lifecycle = lifecycle_service(pool);
            let history = lifecycle
                .task_history(ProjectId::from_uuid(project), TaskId::from_uuid(task))
                .await?;
            emit(&history)
        }
    }
}

fn load_config(
    database_url: Option<String>,
    pool_size: Option<u32>,
) -> Result<StoreConfig, ConfigError> {
    let mut config = StoreConfig::from_lookup(|name| {
        if name == DATABASE_URL_VAR && database_url.is_some() {
            return database_url.clone();
        }
        std::env::var(name).ok()
    })?;
    if let Some(size) = pool_size {
        config = config.with_max_connections(size)?;
    }
    Ok(config)
}

fn lifecycle_service(pool: fieldtask::task::adapters::postgres::TaskPgPool) -> Service {
    TaskLifecycleService::new(
        Arc::new(PostgresTaskRepository::new(pool)),
        Arc::new(DefaultClock),
    )
}

fn emit<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
