//! NATS event publisher.

use async_trait::async_trait;

use crate::domain::events::AccountEvent;
use crate::ports::{ClientError, EventPublisher};

pub const DEFAULT_SUBJECT_PREFIX: &str = "account.events";

#[derive(Clone)]
pub struct NatsPublisher {
    client: async_nats::Client,
    prefix: String,
}

impl NatsPublisher {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = async_nats::connect(url).await?;
        Ok(Self::new(client, DEFAULT_SUBJECT_PREFIX))
    }

    pub fn new(client: async_nats::Client, prefix: impl Into<String>) -> Self {
        Self { client, prefix: prefix.into() }
    }

    pub fn subject_for(&self, event: &AccountEvent) -> String { format!("{}.{}", self.prefix, event.kind()) }
}

#[async_trait]
impl EventPublisher for NatsPublisher {
    async fn publish(&self, event: &AccountEvent) -> Result<(), ClientError> {
        let payload = serde_json::to_vec(event).map_err(|e| ClientError::Messaging(e.to_string()))?;
        self.client.publish(self.subject_for(event), payload.into()).await
            .map_err(|e| ClientError::Messaging(e.to_string()))
    }
}
