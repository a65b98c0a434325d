use crate::error::Result;
use async_trait::async_trait;

pub mod log;
pub mod sns;
pub mod twilio;

pub use log::LogNotifier;
pub use sns::SnsNotifier;
pub use twilio::TwilioSmsNotifier;

/// Side channel that tells the administrator a submission arrived.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug + 'static {
    async fn notify(&self, body: &str) -> Result<()>;
}
