use crate::adapters::secrets::CredentialSource;
use crate::domain::credentials::TwilioCredentials;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads the credentials JSON from a local file. Handy for development.
#[derive(Clone, Debug)]
pub struct FileCredentialSource {
    path: PathBuf,
}

impl FileCredentialSource {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CredentialSource for FileCredentialSource {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<TwilioCredentials> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            tracing::error!(error = %e, "Could not read credentials file");
            AppError::Credentials(format!("cannot read {}", self.path.display()))
        })?;

        let creds = TwilioCredentials::parse(&raw).map_err(|e| AppError::Credentials(e.to_string()))?;
        tracing::info!(credentials = ?creds, "Loaded credentials from file");
        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"accountSid":"AC42","apiKey":"SK42","apiSecret":"secret42","extra":true}}"#).unwrap();

        let source = FileCredentialSource::new(file.path().to_path_buf());
        let creds = source.load().await.unwrap();
        assert_eq!(creds.account_sid, "AC42");
        assert_eq!(creds.api_key, "SK42");
    }

    #[tokio::test]
    async fn test_missing_file_is_a_credentials_error() {
        let source = FileCredentialSource::new(PathBuf::from("/definitely/not/here.json"));
        assert!(matches!(source.load().await, Err(AppError::Credentials(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_credentials_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let source = FileCredentialSource::new(file.path().to_path_buf());
        assert!(matches!(source.load().await, Err(AppError::Credentials(_))));
    }
}
