//! NATS replies for assessments and selectable options

use crate::types::message::{AssessmentResponse, SelectableOptions};
use anyhow::Result;
use async_nats::{Client, Subject};
use tracing::debug;

/// Sends replies to the requester, or to the result subject when the
/// request carried no reply subject
#[derive(Clone)]
pub struct AssessmentResponder {
    client: Client,
    result_subject: String,
}

impl AssessmentResponder {
    pub fn new(client: Client, result_subject: &str) -> Self {
        Self {
            client,
            result_subject: result_subject.to_string(),
        }
    }

    /// Publish an assessment reply
    pub async fn respond(&self, reply: Option<Subject>, response: &AssessmentResponse) -> Result<()> {
        let payload = serde_json::to_vec(response)?;
        let subject = reply.unwrap_or_else(|| Subject::from(self.result_subject.as_str()));

        self.client.publish(subject.clone(), payload.into()).await?;

        debug!(
            request_id = %response.request_id,
            subject = ?subject,
            success = response.is_success(),
            "Published assessment reply"
        );

        Ok(())
    }

    /// Answer an options request. Requests without a reply subject are ignored.
    pub async fn respond_options(&self, reply: Option<Subject>, options: &SelectableOptions) -> Result<()> {
        let Some(subject) = reply else {
            debug!("Options request without reply subject, ignoring");
            return Ok(());
        };

        let payload = serde_json::to_vec(options)?;
        self.client.publish(subject, payload.into()).await?;
        Ok(())
    }

    pub fn result_subject(&self) -> &str {
        &self.result_subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
