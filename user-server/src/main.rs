use std::sync::Arc;

use anyhow::Context;
use reqwest::Client;
use tracing::info;
use user_server::application::user_service::UserService;
use user_server::data::user_repository::PostgresUserRepository;
use user_server::infrastructure::config::AppConfig;
use user_server::infrastructure::database::{close_pool, create_pool, run_migrations};
use user_server::infrastructure::events::{EventPublisher, KafkaRestPublisher, LogEventPublisher};
use user_server::infrastructure::logging::init_logging;
use user_server::utils::start_rest_server;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let pool = create_pool(&config.database_url, config.max_connections)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let events: Arc<dyn EventPublisher> = match &config.events_url {
        Some(url) => {
            info!(url = %url, topic = %config.events_topic, "publishing user events");
            Arc::new(KafkaRestPublisher::new(
                Client::new(),
                url,
                config.events_topic.clone(),
            ))
        }
        None => Arc::new(LogEventPublisher),
    };

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let user_service = UserService::new(user_repo, events);

    let result = start_rest_server(config, user_service).await;
    close_pool(pool).await;
    result
}
