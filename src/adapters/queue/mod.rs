use crate::error::Result;
use async_trait::async_trait;

pub mod sqs;

pub use sqs::SqsQueue;

/// The queue the LED player polls.
#[async_trait]
pub trait MessageQueue: Send + Sync + std::fmt::Debug + 'static {
    async fn send(&self, body: String) -> Result<()>;

    /// Point-in-time estimate of messages waiting, not an exact count.
    async fn approximate_depth(&self) -> Result<u64>;
}
