mod config;
mod employees;
mod http;
mod openapi;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{
    DatabaseSettings, DbEmployeeStore, DbPool, EmployeeStore, MemoryEmployeeStore, connect,
};
use platform_obs::{ObsConfig, init_tracing};
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "employee-server", version, about = "Employee records service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Run database migrations.
    Migrate {
        #[command(subcommand)]
        action: MigrateCommand,
        #[command(flatten)]
        db: DbArgs,
    },
    /// Print the OpenAPI document.
    #[command(name = "openapi:print")]
    OpenapiPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
    /// Rollback every migration.
    Reset,
}

#[derive(Args, Debug)]
struct DbArgs {
    /// Database URL; defaults to a private in-memory SQLite database.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

impl DbArgs {
    fn settings(&self) -> DatabaseSettings {
        match &self.database_url {
            Some(url) => DatabaseSettings::default().with_url(url),
            None => DatabaseSettings::from_env(),
        }
    }

    /// Settings for commands that are pointless against a throwaway in-memory database.
    fn required_settings(&self) -> Result<DatabaseSettings> {
        let settings = self.settings();
        if self.database_url.is_none() || settings.is_in_memory() {
            anyhow::bail!(
                "no persistent database configured; set DATABASE_URL or pass --database-url"
            );
        }
        Ok(settings)
    }
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "BIND", default_value = "127.0.0.1:7192")]
    bind: SocketAddr,
    #[arg(long, help = "Keep records in process memory instead of a database")]
    in_memory: bool,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
    #[command(flatten)]
    db: DbArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => {
            let app_config = Arc::new(AppConfig::load()?);
            run_server(cmd, app_config).await
        }
        Command::Migrate { action, db } => {
            let pool = setup_pool(&db.required_settings()?).await?;
            match action {
                MigrateCommand::Up => migrate_up(&pool).await,
                MigrateCommand::Down => migrate_down(&pool).await,
                MigrateCommand::Reset => migrate_reset(&pool).await,
            }
        }
        Command::OpenapiPrint { output } => openapi_print(output),
    }
}

fn openapi_print(path: Option<PathBuf>) -> Result<()> {
    let document = openapi::render_pretty()?;
    match path {
        Some(target) => {
            std::fs::write(&target, document)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(path = %target.display(), "OpenAPI document written");
        }
        None => println!("{document}"),
    }
    Ok(())
}

async fn setup_pool(settings: &DatabaseSettings) -> Result<DbPool> {
    connect(settings).await.map_err(Into::into)
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let store: Arc<dyn EmployeeStore> = if cmd.in_memory {
        info!("using process-local employee store");
        Arc::new(MemoryEmployeeStore::new())
    } else {
        let settings = cmd.db.settings();
        let pool = setup_pool(&settings).await?;
        if settings.is_in_memory() {
            Migrator::up(&pool, None).await?;
            info!("in-memory database migrated");
        } else {
            ensure_migrations(&pool, cmd.allow_dirty).await?;
        }
        Arc::new(DbEmployeeStore::new(pool))
    };
    info!(environment = %config.environment, api_docs = config.api_docs, "configuration loaded");
    let state = AppState { store, config };
    http::serve(ServeConfig::new(cmd.bind), state).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `employee-server migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn migrate_up(pool: &DbPool) -> Result<()> {
    Migrator::up(pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down(pool: &DbPool) -> Result<()> {
    Migrator::down(pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}

async fn migrate_reset(pool: &DbPool) -> Result<()> {
    Migrator::reset(pool).await?;
    info!("all migrations rolled back");
    Ok(())
}
