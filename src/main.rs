//! Kreditflow service binary.
//!
//! `serve` (the default) runs the HTTP API; `rules` writes the transition
//! registry as JSON to standard output.

use std::io::Write;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use kreditflow::api::{WorkflowApi, views::RulesView, workflow_router};
use kreditflow::config::{AppConfig, ConfigError};
use kreditflow::telemetry::{self, TelemetryError};
use kreditflow::workflow::{
    adapters::memory::{InMemoryUserDirectory, InMemoryWorkflowStore},
    domain::{Role, User},
    ports::{ApplicationRepository, AuditLog, UserDirectory},
};
use mockable::DefaultClock;
use thiserror::Error;
use tracing::info;
#[cfg(not(feature = "postgres"))]
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "kreditflow", about = "Loan-origination workflow service", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the status and transition registry as JSON
    Rules,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialisation error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(String),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command.unwrap_or_else(|| Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(args).await,
        Command::Rules => print_rules(),
    }
}

fn print_rules() -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &RulesView::current())?;
    writeln!(stdout)?;
    Ok(())
}

async fn serve(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    telemetry::init(&config.telemetry)?;

    let users = config.configured_users()?.unwrap_or_else(demo_users);

    #[cfg(feature = "postgres")]
    if let Some(url) = config.storage.database_url.clone() {
        let store = Arc::new(postgres_store(&url, &users).await?);
        return listen(&config, Arc::clone(&store), store).await;
    }
    #[cfg(not(feature = "postgres"))]
    if config.storage.database_url.is_some() {
        warn!("DATABASE_URL is set but PostgreSQL support is not compiled in; using memory");
    }

    let store = Arc::new(InMemoryWorkflowStore::new());
    let directory = Arc::new(InMemoryUserDirectory::with_users(users));
    listen(&config, store, directory).await
}

#[cfg(feature = "postgres")]
async fn postgres_store(
    url: &str,
    users: &[User],
) -> Result<kreditflow::workflow::adapters::postgres::PostgresWorkflowStore, AppError> {
    use diesel::r2d2::{ConnectionManager, Pool};
    use kreditflow::workflow::adapters::postgres::PostgresWorkflowStore;

    let pool = Pool::builder()
        .build(ConnectionManager::new(url))
        .map_err(|err| AppError::Database(err.to_string()))?;
    let store = PostgresWorkflowStore::new(pool);
    for user in users {
        store
            .upsert_user(user)
            .await
            .map_err(|err| AppError::Database(err.to_string()))?;
    }
    Ok(store)
}

async fn listen<R, D>(config: &AppConfig, store: Arc<R>, directory: Arc<D>) -> Result<(), AppError>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
{
    let api = Arc::new(WorkflowApi::new(store, directory, Arc::new(DefaultClock)));
    let app = workflow_router(api);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(?config.environment, %addr, "loan workflow service ready");
    axum::serve(listener, app).await?;
    Ok(())
}

fn demo_users() -> Vec<User> {
    let users: Vec<User> = Role::ALL
        .into_iter()
        .map(|role| User::new(format!("Demo {}", role.label()), role))
        .collect();
    for user in &users {
        info!(user = %user.id(), role = %user.role(), "seeded demo user");
    }
    users
}
