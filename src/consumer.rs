//! NATS subscriptions for incoming assessment and option requests

use anyhow::Result;
use async_nats::{Client, Subscriber};
use tracing::info;

/// Consumer for receiving churn requests from NATS
pub struct RequestConsumer {
    client: Client,
    request_subject: String,
    options_subject: String,
}

impl RequestConsumer {
    pub fn new(client: Client, request_subject: &str, options_subject: &str) -> Self {
        Self {
            client,
            request_subject: request_subject.to_string(),
            options_subject: options_subject.to_string(),
        }
    }

    /// Subscribe to the assessment request subject
    pub async fn subscribe_requests(&self) -> Result<Subscriber> {
        let subscriber = self.client.subscribe(self.request_subject.clone()).await?;
        info!(subject = %self.request_subject, "Subscribed to assessment requests");
        Ok(subscriber)
    }

    /// Subscribe to the selectable-options subject
    pub async fn subscribe_options(&self) -> Result<Subscriber> {
        let subscriber = self.client.subscribe(self.options_subject.clone()).await?;
        info!(subject = %self.options_subject, "Subscribed to option requests");
        Ok(subscriber)
    }

    pub fn request_subject(&self) -> &str {
        &self.request_subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
