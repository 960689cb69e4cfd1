pub const DEFAULT_EVENTS_TOPIC: &str = "user-events";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub cors_origins: Vec<String>,
    /// Kafka REST proxy base URL; events are only logged when unset.
    pub events_url: Option<String>,
    pub events_topic: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take their defaults.
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = var("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let max_connections = var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "20".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid DB_MAX_CONNECTIONS: {}", e))?;
        let cors_origins = split_origins(&var("CORS_ORIGINS").unwrap_or_else(|| "*".into()));
        let events_url = var("EVENTS_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let events_topic = var("EVENTS_TOPIC").unwrap_or_else(|| DEFAULT_EVENTS_TOPIC.into());

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            cors_origins,
            events_url,
            events_topic,
        })
    }
}

/// Reads `DATABASE_URL`, loading `.env` first.
pub fn database_url_from_env() -> anyhow::Result<String> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_empty_entries_dropped() {
        assert_eq!(
            split_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn unset_keys_fall_back_to_defaults() {
        let config =
            AppConfig::from_vars(lookup(&[("DATABASE_URL", "postgres://db/users")])).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.events_url, None);
        assert_eq!(config.events_topic, DEFAULT_EVENTS_TOPIC);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = AppConfig::from_vars(lookup(&[
            ("DATABASE_URL", "postgres://db/users"),
            ("PORT", "9090"),
            ("CORS_ORIGINS", "http://a.test,http://b.test"),
            ("EVENTS_URL", " http://proxy:8082 "),
            ("EVENTS_TOPIC", "audit"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.events_url.as_deref(), Some("http://proxy:8082"));
        assert_eq!(config.events_topic, "audit");
    }

    #[test]
    fn missing_database_url_or_bad_port_is_an_error() {
        assert!(AppConfig::from_vars(lookup(&[])).is_err());
        assert!(
            AppConfig::from_vars(lookup(&[("DATABASE_URL", "postgres://db"), ("PORT", "http")]))
                .is_err()
        );
    }
}
