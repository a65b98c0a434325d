use crate::adapters::notify::Notifier;
use crate::adapters::secrets::CredentialCache;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
    status: Option<String>,
}

/// Sends an SMS through the Twilio Messages API.
#[derive(Debug)]
pub struct TwilioSmsNotifier {
    http: reqwest::Client,
    api_base_url: Url,
    credentials: CredentialCache,
    from: String,
    to: String,
}

impl TwilioSmsNotifier {
    /// Any path on `api_base_url` is kept as a prefix of the API path.
    #[must_use]
    pub fn new(http: reqwest::Client, mut api_base_url: Url, credentials: CredentialCache, from: String, to: String) -> Self {
        if !api_base_url.path().ends_with('/') {
            let path = format!("{}/", api_base_url.path());
            api_base_url.set_path(&path);
        }
        Self { http, api_base_url, credentials, from, to }
    }

    fn messages_url(&self, account_sid: &str) -> Result<Url> {
        self.api_base_url.join(&format!("2010-04-01/Accounts/{account_sid}/Messages.json")).map_err(|e| {
            tracing::error!(error = %e, "Invalid Twilio URL");
            AppError::Notification("invalid Twilio URL".into())
        })
    }
}

#[async_trait]
impl Notifier for TwilioSmsNotifier {
    #[tracing::instrument(skip(self, body), fields(to = %self.to, length = body.len()))]
    async fn notify(&self, body: &str) -> Result<()> {
        let creds = self.credentials.get().await?;
        let url = self.messages_url(&creds.account_sid)?;

        let response = self
            .http
            .post(url)
            .basic_auth(&creds.api_key, Some(&creds.api_secret))
            .form(&[("From", self.from.as_str()), ("To", self.to.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Twilio request failed");
                AppError::Notification("SMS request failed".into())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, detail = %detail, "Twilio rejected the message");
            return Err(AppError::Notification(format!("SMS rejected with status {status}")));
        }

        match response.json::<MessageResource>().await {
            Ok(resource) => tracing::info!(sid = ?resource.sid, status = ?resource.status, "SMS sent"),
            Err(e) => tracing::warn!(error = %e, "SMS sent but response was not understood"),
        }
        Ok(())
    }
}
