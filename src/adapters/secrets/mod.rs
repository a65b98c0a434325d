use crate::domain::credentials::TwilioCredentials;
use crate::error::Result;
use async_trait::async_trait;

pub mod cache;
pub mod file;
pub mod ssm;

pub use cache::CredentialCache;
pub use file::FileCredentialSource;
pub use ssm::SsmCredentialSource;

/// Somewhere Twilio credentials can be loaded from.
#[async_trait]
pub trait CredentialSource: Send + Sync + std::fmt::Debug + 'static {
    async fn load(&self) -> Result<TwilioCredentials>;
}
