use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Twilio API-key credentials, stored as a JSON document in a secret store.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("credentials are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("credential field `{0}` is empty")]
    EmptyField(&'static str),
}

impl TwilioCredentials {
    /// Parses and validates a credentials document.
    ///
    /// # Errors
    /// Returns `CredentialsError` if the document is malformed or a field is blank.
    pub fn parse(raw: &str) -> Result<Self, CredentialsError> {
        let creds: Self = serde_json::from_str(raw)?;
        for (name, value) in [("accountSid", &creds.account_sid), ("apiKey", &creds.api_key), ("apiSecret", &creds.api_secret)] {
            if value.trim().is_empty() {
                return Err(CredentialsError::EmptyField(name));
            }
        }
        Ok(creds)
    }
}

impl fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &mask(&self.account_sid))
            .field("api_key", &mask(&self.api_key))
            .field("api_secret", &mask(&self.api_secret))
            .finish()
    }
}

/// Keeps the first and last two characters.
fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}
