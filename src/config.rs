use crate::domain::message::AudioFormat;
use anyhow::{Context, bail};
use clap::{Args, Parser, ValueEnum};
use reqwest::Url;
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Public base URL of the website that serves the stored messages
    #[arg(long, env = "UDM_WEBSITE_BASE_URL")]
    pub website_base_url: Url,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    #[command(flatten)]
    pub aws: AwsConfig,

    #[command(flatten)]
    pub storage: StorageConfig,

    #[command(flatten)]
    pub queue: QueueConfig,

    #[command(flatten)]
    pub speech: SpeechConfig,

    #[command(flatten)]
    pub profanity: ProfanityConfig,

    #[command(flatten)]
    pub notifications: NotificationConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "UDM_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "UDM_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management server (health checks)
    #[arg(long, env = "UDM_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// How long to wait for in-flight work on shutdown
    #[arg(long, env = "UDM_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "UDM_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint (e.g. http://localhost:4317); export is disabled when unset
    #[arg(long, env = "UDM_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[derive(Clone, Debug, Default, Args)]
pub struct AwsConfig {
    /// AWS region; falls back to the default provider chain when unset
    #[arg(long = "aws-region", env = "UDM_AWS_REGION")]
    pub region: Option<String>,

    /// Custom endpoint for every AWS service (useful for LocalStack)
    #[arg(long = "aws-endpoint", env = "UDM_AWS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Static access key, paired with the secret key
    #[arg(long = "aws-access-key", env = "UDM_AWS_ACCESS_KEY")]
    pub access_key: Option<String>,

    /// Static secret key, paired with the access key
    #[arg(long = "aws-secret-key", env = "UDM_AWS_SECRET_KEY")]
    pub secret_key: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct StorageConfig {
    /// Bucket backing the website; messages are written under `messages/`
    #[arg(long = "s3-website-bucket", env = "UDM_S3_WEBSITE_BUCKET")]
    pub bucket: String,

    /// Force path style (required for many local S3 setups: http://host/bucket/key)
    #[arg(long = "s3-force-path-style", env = "UDM_S3_FORCE_PATH_STYLE", default_value_t = false)]
    pub force_path_style: bool,

    /// Timeout for the storage readiness probe
    #[arg(id = "s3_health_timeout_ms", long = "s3-health-timeout-ms", env = "UDM_S3_HEALTH_TIMEOUT_MS", default_value_t = 2000)]
    pub health_timeout_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct QueueConfig {
    /// URL of the queue polled by the LED player
    #[arg(long = "sqs-queue-url", env = "UDM_SQS_QUEUE_URL")]
    pub queue_url: Url,

    /// Timeout for the queue readiness probe
    #[arg(id = "sqs_health_timeout_ms", long = "sqs-health-timeout-ms", env = "UDM_SQS_HEALTH_TIMEOUT_MS", default_value_t = 2000)]
    pub health_timeout_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct SpeechConfig {
    /// Convert each accepted message to speech
    #[arg(
        long = "text-to-speech",
        env = "UDM_TEXT_TO_SPEECH",
        required = true,
        action = clap::ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub enabled: bool,

    /// Audio output format
    #[arg(long = "speech-format", env = "UDM_SPEECH_FORMAT", value_enum, default_value_t = AudioFormat::Mp3)]
    pub format: AudioFormat,

    /// Voice used for synthesis
    #[arg(long = "speech-voice", env = "UDM_SPEECH_VOICE", default_value = "Justin")]
    pub voice: String,
}

#[derive(Clone, Debug, Default, Args)]
pub struct ProfanityConfig {
    /// Additional words to reject, comma-separated
    #[arg(long = "profanity-extra-words", env = "UDM_PROFANITY_EXTRA_WORDS", value_delimiter = ',')]
    pub extra_words: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum NotificationChannel {
    /// Text message to the administrator via Twilio
    #[default]
    Sms,
    /// Publish to an SNS topic
    Sns,
    /// Log only
    Disabled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum NotificationPayload {
    /// Just the submitted text
    #[default]
    Text,
    /// The whole response, without inline audio
    Response,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum NotificationFailurePolicy {
    /// A failed notification fails the request
    Fail,
    /// A failed notification is logged and the request still succeeds
    #[default]
    Log,
}

#[derive(Clone, Debug, Args)]
pub struct NotificationConfig {
    /// Where submission notifications go
    #[arg(long = "notify-channel", env = "UDM_NOTIFY_CHANNEL", value_enum, default_value_t = NotificationChannel::Sms)]
    pub channel: NotificationChannel,

    /// What a notification carries
    #[arg(long = "notify-payload", env = "UDM_NOTIFY_PAYLOAD", value_enum, default_value_t = NotificationPayload::Text)]
    pub payload: NotificationPayload,

    /// What happens to the request when a notification cannot be delivered
    #[arg(
        long = "notify-on-failure",
        env = "UDM_NOTIFY_ON_FAILURE",
        value_enum,
        default_value_t = NotificationFailurePolicy::Log
    )]
    pub on_failure: NotificationFailurePolicy,

    /// Sender phone number for SMS
    #[arg(long, env = "UDM_SMS_SOURCE_PHONE")]
    pub sms_source_phone: Option<String>,

    /// Administrator phone number
    #[arg(long, env = "UDM_SMS_DESTINATION_PHONE")]
    pub sms_destination_phone: Option<String>,

    /// SSM parameter holding the Twilio credentials JSON
    #[arg(long, env = "UDM_TWILIO_CREDS_PARAMETER")]
    pub twilio_creds_parameter: Option<String>,

    /// Local file holding the Twilio credentials JSON
    #[arg(long, env = "UDM_TWILIO_CREDS_FILE")]
    pub twilio_creds_file: Option<PathBuf>,

    /// Base URL of the Twilio REST API
    #[arg(long, env = "UDM_TWILIO_API_BASE_URL", default_value = "https://api.twilio.com")]
    pub twilio_api_base_url: Url,

    /// How long loaded credentials are reused before being fetched again
    #[arg(long, env = "UDM_CREDENTIALS_TTL_SECS", default_value_t = 60)]
    pub credentials_ttl_secs: u64,

    /// Topic receiving notifications when the channel is `sns`
    #[arg(long, env = "UDM_SNS_TOPIC_ARN")]
    pub sns_topic_arn: Option<String>,
}

impl Config {
    /// Parses flags and environment, then checks cross-field requirements.
    ///
    /// # Errors
    /// Returns an error describing the first missing or inconsistent setting.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns an error describing the first missing or inconsistent setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.website_base_url.cannot_be_a_base() {
            bail!("UDM_WEBSITE_BASE_URL must be an absolute http(s) URL");
        }
        if self.storage.bucket.trim().is_empty() {
            bail!("UDM_S3_WEBSITE_BUCKET must not be empty");
        }
        if self.speech.enabled && self.speech.voice.trim().is_empty() {
            bail!("UDM_SPEECH_VOICE must not be empty when text-to-speech is enabled");
        }
        if self.aws.access_key.is_some() != self.aws.secret_key.is_some() {
            bail!("UDM_AWS_ACCESS_KEY and UDM_AWS_SECRET_KEY must be set together");
        }
        self.notifications.validate()
    }
}

impl NotificationConfig {
    fn validate(&self) -> anyhow::Result<()> {
        match self.channel {
            NotificationChannel::Sms => {
                self.sms_source_phone
                    .as_deref()
                    .filter(|p| !p.trim().is_empty())
                    .context("UDM_SMS_SOURCE_PHONE is required for sms notifications")?;
                self.sms_destination_phone
                    .as_deref()
                    .filter(|p| !p.trim().is_empty())
                    .context("UDM_SMS_DESTINATION_PHONE is required for sms notifications")?;
                match (&self.twilio_creds_parameter, &self.twilio_creds_file) {
                    (Some(_), None) | (None, Some(_)) => Ok(()),
                    (None, None) => bail!("one of UDM_TWILIO_CREDS_PARAMETER or UDM_TWILIO_CREDS_FILE is required"),
                    (Some(_), Some(_)) => bail!("UDM_TWILIO_CREDS_PARAMETER and UDM_TWILIO_CREDS_FILE are mutually exclusive"),
                }
            }
            NotificationChannel::Sns => {
                self.sns_topic_arn
                    .as_deref()
                    .filter(|arn| !arn.trim().is_empty())
                    .context("UDM_SNS_TOPIC_ARN is required for sns notifications")?;
                Ok(())
            }
            NotificationChannel::Disabled => Ok(()),
        }
    }
}
