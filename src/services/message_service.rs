use crate::adapters::queue::MessageQueue;
use crate::adapters::speech::SpeechSynthesizer;
use crate::adapters::storage::ObjectStorage;
use crate::domain::message::{AudioFormat, Message, MessageRequest, MessageResponse};
use crate::error::{AppError, Result};
use crate::services::notification_service::{NotificationService, to_tab_indented};
use crate::services::profanity::ProfanityFilter;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Gauge},
};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Metrics {
    submissions_total: Counter<u64>,
    queue_depth: Gauge<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("udm-server");
        Self {
            submissions_total: meter
                .u64_counter("udm_submissions_total")
                .with_description("Message submissions by outcome")
                .build(),
            queue_depth: meter
                .u64_gauge("udm_queue_depth")
                .with_description("Approximate queue depth observed after the last enqueue")
                .build(),
        }
    }
}

/// Speech synthesis settings; present only when text-to-speech is enabled.
#[derive(Clone, Debug)]
pub struct SpeechSettings {
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub format: AudioFormat,
    pub voice: String,
}

#[derive(Debug)]
struct Speech {
    audio: Bytes,
    content_type: String,
    format: AudioFormat,
}

/// Turns one submitted body into a stored, queued message.
#[derive(Clone, Debug)]
pub struct MessageService {
    profanity: ProfanityFilter,
    storage: Arc<dyn ObjectStorage>,
    queue: Arc<dyn MessageQueue>,
    speech: Option<SpeechSettings>,
    notifications: NotificationService,
    website_base_url: Url,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(
        profanity: ProfanityFilter,
        storage: Arc<dyn ObjectStorage>,
        queue: Arc<dyn MessageQueue>,
        speech: Option<SpeechSettings>,
        notifications: NotificationService,
        website_base_url: Url,
    ) -> Self {
        Self { profanity, storage, queue, speech, notifications, website_base_url, metrics: Metrics::new() }
    }

    /// Handles one submission end to end.
    ///
    /// Invalid and profane submissions come back as `Ok` with a rejection
    /// variant. Profane text is never synthesized, stored or queued.
    ///
    /// # Errors
    /// Returns `AppError::MalformedBody` if the body is not JSON, and the
    /// dependency's error if synthesis, storage, queueing or (under the `Fail`
    /// policy) notification fails.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, body),
        fields(message_id = tracing::field::Empty, outcome = tracing::field::Empty)
    )]
    pub async fn submit(&self, body: &[u8]) -> Result<MessageResponse> {
        let body: Value = serde_json::from_slice(body).map_err(AppError::MalformedBody)?;

        let request = match MessageRequest::validate(&body) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Submission failed validation");
                let response = MessageResponse::BadRequest { error_message: e.to_string(), request: body };
                self.record_outcome(&response);
                return Ok(response);
            }
        };

        let response = if self.profanity.is_profane(&request.text) {
            MessageResponse::profane(request.clone())
        } else {
            self.accept(&request).await?
        };

        self.notifications.notify_submission(&request, &response).await?;

        self.record_outcome(&response);
        Ok(response)
    }

    async fn accept(&self, request: &MessageRequest) -> Result<MessageResponse> {
        let message_id = request.message_id();
        tracing::Span::current().record("message_id", message_id.as_str());

        let speech = match &self.speech {
            Some(settings) => Some(synthesize(settings, &request.text).await?),
            None => None,
        };

        let json_key = Message::json_key(&message_id);
        let audio_key = speech.as_ref().map(|s| Message::audio_key(&message_id, s.format));

        let message = Message {
            url: self.public_url(&json_key)?,
            audio_url: audio_key.as_deref().map(|key| self.public_url(key)).transpose()?,
            audio_format: speech.as_ref().map(|s| s.format),
            audio_data_base64: speech.as_ref().map(|s| BASE64.encode(&s.audio)),
            message_id,
            text: request.text.clone(),
        };

        let document = Bytes::from(to_tab_indented(&message)?);

        // Both writes always run to completion before either error is surfaced.
        let audio_write = async {
            match (&speech, &audio_key) {
                (Some(speech), Some(key)) => self.storage.put(key, speech.audio.clone(), &speech.content_type).await,
                _ => Ok(()),
            }
        };
        let json_write = self.storage.put(&json_key, document, "application/json");
        let (audio_result, json_result) = tokio::join!(audio_write, json_write);
        audio_result?;
        json_result?;

        let queue_body = serde_json::to_string(&message).map_err(|e| {
            tracing::error!(error = %e, "Could not serialize message for the queue");
            AppError::Internal
        })?;
        self.queue.send(queue_body).await?;

        let approximate_queue_index = self.queue.approximate_depth().await?;
        self.metrics.queue_depth.record(approximate_queue_index, &[]);
        tracing::info!(queue_depth = approximate_queue_index, "Message queued");

        Ok(MessageResponse::Ok { approximate_queue_index, message })
    }

    fn public_url(&self, key: &str) -> Result<String> {
        self.website_base_url.join(key).map(String::from).map_err(|e| {
            tracing::error!(error = %e, key = %key, "Could not build public URL");
            AppError::Internal
        })
    }

    fn record_outcome(&self, response: &MessageResponse) {
        let outcome = response.outcome();
        tracing::Span::current().record("outcome", outcome);
        self.metrics.submissions_total.add(1, &[KeyValue::new("outcome", outcome)]);
    }
}

async fn synthesize(settings: &SpeechSettings, text: &str) -> Result<Speech> {
    let output = settings.synthesizer.synthesize(text, settings.format, &settings.voice).await?;

    let audio = output.audio.ok_or(AppError::IncompleteSynthesis("audio stream"))?;
    let content_type = output.content_type.ok_or(AppError::IncompleteSynthesis("content type"))?;

    Ok(Speech { audio, content_type, format: settings.format })
}
