#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::notify::{LogNotifier, Notifier, SnsNotifier, TwilioSmsNotifier};
use crate::adapters::queue::{MessageQueue, SqsQueue};
use crate::adapters::secrets::{CredentialCache, CredentialSource, FileCredentialSource, SsmCredentialSource};
use crate::adapters::speech::PollySynthesizer;
use crate::adapters::storage::{ObjectStorage, S3Storage};
use crate::api::{AppState, MgmtState};
use crate::config::{Config, NotificationChannel};
use crate::services::health_service::HealthService;
use crate::services::message_service::{MessageService, SpeechSettings};
use crate::services::notification_service::NotificationService;
use crate::services::profanity::ProfanityFilter;
use anyhow::Context;
use aws_config::SdkConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Both routers, ready to serve.
#[derive(Debug)]
pub struct App {
    pub router: axum::Router,
    pub mgmt_router: axum::Router,
}

/// Wires adapters and services from configuration.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    sdk_config: Option<SdkConfig>,
    http: Option<reqwest::Client>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, sdk_config: None, http: None }
    }

    #[must_use]
    pub fn with_aws(mut self, sdk_config: SdkConfig) -> Self {
        self.sdk_config = Some(sdk_config);
        self
    }

    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// # Errors
    /// Returns an error if the AWS configuration was not supplied or a
    /// required notification setting is missing.
    pub fn build(self) -> anyhow::Result<App> {
        let config = self.config;
        let sdk_config = self.sdk_config.context("AWS configuration is required")?;

        let storage: Arc<dyn ObjectStorage> = Arc::new(S3Storage::new(
            adapters::aws::s3_client(&sdk_config, &config.storage),
            config.storage.bucket.clone(),
        ));
        let queue: Arc<dyn MessageQueue> =
            Arc::new(SqsQueue::new(adapters::aws::sqs_client(&sdk_config), config.queue.queue_url.to_string()));

        let speech = config.speech.enabled.then(|| SpeechSettings {
            synthesizer: Arc::new(PollySynthesizer::new(adapters::aws::polly_client(&sdk_config))),
            format: config.speech.format,
            voice: config.speech.voice.clone(),
        });

        let notifier = build_notifier(&config, &sdk_config, self.http.unwrap_or_default())?;
        let notifications =
            NotificationService::new(notifier, config.notifications.payload, config.notifications.on_failure);

        let message_service = MessageService::new(
            ProfanityFilter::standard(&config.profanity.extra_words),
            Arc::clone(&storage),
            Arc::clone(&queue),
            speech,
            notifications,
            config.website_base_url.clone(),
        );

        let health_service = HealthService::new(
            storage,
            queue,
            Duration::from_millis(config.storage.health_timeout_ms),
            Duration::from_millis(config.queue.health_timeout_ms),
        );

        tracing::info!(
            text_to_speech = config.speech.enabled,
            notify_channel = ?config.notifications.channel,
            "Services wired"
        );

        Ok(App {
            router: api::app_router(AppState { message_service }),
            mgmt_router: api::mgmt_router(MgmtState { health_service }),
        })
    }
}

fn build_notifier(config: &Config, sdk_config: &SdkConfig, http: reqwest::Client) -> anyhow::Result<Arc<dyn Notifier>> {
    let notifications = &config.notifications;

    let notifier: Arc<dyn Notifier> = match notifications.channel {
        NotificationChannel::Sms => {
            let source: Arc<dyn CredentialSource> =
                match (&notifications.twilio_creds_parameter, &notifications.twilio_creds_file) {
                    (Some(parameter), _) => {
                        Arc::new(SsmCredentialSource::new(adapters::aws::ssm_client(sdk_config), parameter.clone()))
                    }
                    (None, Some(path)) => Arc::new(FileCredentialSource::new(path.clone())),
                    (None, None) => anyhow::bail!("no Twilio credential source configured"),
                };
            let cache = CredentialCache::new(source, Duration::from_secs(notifications.credentials_ttl_secs));

            Arc::new(TwilioSmsNotifier::new(
                http,
                notifications.twilio_api_base_url.clone(),
                cache,
                notifications.sms_source_phone.clone().context("SMS source phone is required")?,
                notifications.sms_destination_phone.clone().context("SMS destination phone is required")?,
            ))
        }
        NotificationChannel::Sns => Arc::new(SnsNotifier::new(
            adapters::aws::sns_client(sdk_config),
            notifications.sns_topic_arn.clone().context("SNS topic ARN is required")?,
        )),
        NotificationChannel::Disabled => Arc::new(LogNotifier),
    };

    Ok(notifier)
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
            () = terminate => tracing::info!("Received SIGTERM, shutting down"),
        }

        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through tracing so they reach the structured log.
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line())).unwrap_or_default();
        tracing::error!(panic = %info, location = %location, "Panic occurred");
        default_hook(info);
    }));
}
