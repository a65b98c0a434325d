use crate::adapters::notify::Notifier;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_sns::Client;

#[derive(Clone, Debug)]
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    #[must_use]
    pub const fn new(client: Client, topic_arn: String) -> Self {
        Self { client, topic_arn }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    #[tracing::instrument(skip(self, body), fields(topic_arn = %self.topic_arn))]
    async fn notify(&self, body: &str) -> Result<()> {
        let output = self.client.publish().topic_arn(&self.topic_arn).message(body).send().await.map_err(|e| {
            tracing::error!(error = ?e, "SNS Publish failed");
            AppError::Notification("publish failed".into())
        })?;

        tracing::debug!(sns_message_id = ?output.message_id(), "Notification published");
        Ok(())
    }
}
