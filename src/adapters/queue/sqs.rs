use crate::adapters::queue::MessageQueue;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::types::QueueAttributeName;

#[derive(Clone, Debug)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    #[must_use]
    pub const fn new(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    #[tracing::instrument(skip(self, body), fields(queue_url = %self.queue_url))]
    async fn send(&self, body: String) -> Result<()> {
        let output =
            self.client.send_message().queue_url(&self.queue_url).message_body(body).send().await.map_err(|e| {
                tracing::error!(error = ?e, "SQS SendMessage failed");
                AppError::Queue("send failed".into())
            })?;

        tracing::debug!(sqs_message_id = ?output.message_id(), "Message enqueued");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(queue_url = %self.queue_url))]
    async fn approximate_depth(&self) -> Result<u64> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "SQS GetQueueAttributes failed");
                AppError::Queue("attribute lookup failed".into())
            })?;

        let raw = output
            .attributes()
            .and_then(|attrs| attrs.get(&QueueAttributeName::ApproximateNumberOfMessages))
            .ok_or_else(|| AppError::Queue("ApproximateNumberOfMessages missing".into()))?;

        raw.parse::<u64>().map_err(|_| AppError::Queue(format!("ApproximateNumberOfMessages is not a number: {raw}")))
    }
}
