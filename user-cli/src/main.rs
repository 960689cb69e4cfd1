mod menu;

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use menu::Console;
use tracing::info;
use user_server::application::user_service::UserService;
use user_server::data::memory_repository::InMemoryUserRepository;
use user_server::data::user_repository::{PostgresUserRepository, UserRepository};
use user_server::infrastructure::config::database_url_from_env;
use user_server::infrastructure::database::{close_pool, create_pool, run_migrations};
use user_server::infrastructure::events::LogEventPublisher;
use user_server::infrastructure::logging::init_console_logging;

#[derive(Parser, Debug)]
#[clap(about = "Interactive console for managing users")]
struct Cli {
    /// Overrides DATABASE_URL.
    #[clap(short, long)]
    database_url: Option<String>,

    /// Keep users in memory for this session instead of PostgreSQL.
    #[clap(long, conflicts_with = "database_url")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_console_logging();
    let args = Cli::parse();
    info!("console starting");

    if args.in_memory {
        run_console(Arc::new(InMemoryUserRepository::new())).await?;
        return Ok(());
    }

    let database_url = match args.database_url {
        Some(url) => url,
        None => database_url_from_env()?,
    };
    let pool = create_pool(&database_url, 2)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let result = run_console(Arc::new(PostgresUserRepository::new(pool.clone()))).await;
    close_pool(pool).await;
    info!("console stopped");
    result
}

async fn run_console<R: UserRepository + 'static>(repo: Arc<R>) -> anyhow::Result<()> {
    let service = UserService::new(repo, Arc::new(LogEventPublisher));
    let stdin = io::stdin();
    let mut console = Console::new(service, stdin.lock(), io::stdout());
    console.run().await.context("console I/O failed")?;
    Ok(())
}
