use std::fmt;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{error, info};

const KAFKA_JSON_CONTENT_TYPE: &str = "application/vnd.kafka.json.v2+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserOperation {
    Create,
    Delete,
}

impl fmt::Display for UserOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserOperation::Create => f.write_str("CREATE"),
            UserOperation::Delete => f.write_str("DELETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEvent {
    pub email: String,
    pub operation: UserOperation,
}

impl UserEvent {
    pub fn new(email: impl Into<String>, operation: UserOperation) -> Self {
        Self {
            email: email.into(),
            operation,
        }
    }
}

/// Fire-and-forget sink for user lifecycle events.
///
/// Implementations must not block the caller and must swallow their own
/// failures after logging them.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: UserEvent);
}

/// Publishes nothing; only records the event in the log.
#[derive(Debug, Clone, Default)]
pub struct LogEventPublisher;

impl EventPublisher for LogEventPublisher {
    fn publish(&self, event: UserEvent) {
        info!(email = %event.email, operation = %event.operation, "user event (not published)");
    }
}

/// Publishes to a topic through a Kafka REST proxy.
#[derive(Clone)]
pub struct KafkaRestPublisher {
    client: Client,
    endpoint: String,
    topic: String,
}

impl KafkaRestPublisher {
    pub fn new(client: Client, base_url: &str, topic: impl Into<String>) -> Self {
        let topic = topic.into();
        let endpoint = format!("{}/topics/{}", base_url.trim_end_matches('/'), topic);
        Self {
            client,
            endpoint,
            topic,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(client: Client, endpoint: String, event: UserEvent) -> Result<(), reqwest::Error> {
        client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, KAFKA_JSON_CONTENT_TYPE)
            .json(&json!({ "records": [{ "value": event }] }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl KafkaRestPublisher {
    /// Sends on a background task; the handle resolves to whether the
    /// proxy accepted the record.
    fn dispatch(&self, event: UserEvent) -> JoinHandle<bool> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let topic = self.topic.clone();

        tokio::spawn(async move {
            let email = event.email.clone();
            let operation = event.operation;
            match Self::send(client, endpoint, event).await {
                Ok(()) => {
                    info!(%topic, %email, %operation, "user event published");
                    true
                }
                Err(e) => {
                    error!(%topic, %email, %operation, "failed to publish user event: {}", e);
                    false
                }
            }
        })
    }
}

impl EventPublisher for KafkaRestPublisher {
    fn publish(&self, event: UserEvent) {
        drop(self.dispatch(event));
    }
}
