use crate::adapters::notify::Notifier;
use crate::error::Result;
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, body: &str) -> Result<()> {
        tracing::info!(body = %body, "Notification (channel disabled)");
        Ok(())
    }
}
