use crate::adapters::secrets::CredentialSource;
use crate::domain::credentials::TwilioCredentials;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_ssm::Client;

/// Reads a SecureString parameter whose value is the credentials JSON.
#[derive(Clone, Debug)]
pub struct SsmCredentialSource {
    client: Client,
    parameter_name: String,
}

impl SsmCredentialSource {
    #[must_use]
    pub const fn new(client: Client, parameter_name: String) -> Self {
        Self { client, parameter_name }
    }
}

#[async_trait]
impl CredentialSource for SsmCredentialSource {
    #[tracing::instrument(skip(self), fields(parameter = %self.parameter_name))]
    async fn load(&self) -> Result<TwilioCredentials> {
        let output =
            self.client.get_parameter().name(&self.parameter_name).with_decryption(true).send().await.map_err(|e| {
                tracing::error!(error = ?e, "SSM GetParameter failed");
                AppError::Credentials(format!("parameter {} unavailable", self.parameter_name))
            })?;

        let value = output
            .parameter()
            .and_then(|p| p.value())
            .ok_or_else(|| AppError::Credentials(format!("parameter {} has no value", self.parameter_name)))?;

        let creds = TwilioCredentials::parse(value).map_err(|e| AppError::Credentials(e.to_string()))?;
        tracing::info!(credentials = ?creds, "Loaded credentials from parameter store");
        Ok(creds)
    }
}
