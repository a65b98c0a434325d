use crate::adapters::notify::Notifier;
use crate::config::{NotificationFailurePolicy, NotificationPayload};
use crate::domain::message::{MessageRequest, MessageResponse};
use crate::error::{AppError, Result};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::sync::Arc;

/// Tells the administrator about validated submissions.
#[derive(Clone, Debug)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    payload: NotificationPayload,
    on_failure: NotificationFailurePolicy,
}

impl NotificationService {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, payload: NotificationPayload, on_failure: NotificationFailurePolicy) -> Self {
        Self { notifier, payload, on_failure }
    }

    /// Sends the notification for one submission.
    ///
    /// # Errors
    /// Returns `AppError::Notification` only when the failure policy is `Fail`.
    #[tracing::instrument(skip_all, fields(outcome = response.outcome()))]
    pub async fn notify_submission(&self, request: &MessageRequest, response: &MessageResponse) -> Result<()> {
        let body = match self.payload {
            NotificationPayload::Text => request.text.clone(),
            NotificationPayload::Response => render_response(response)?,
        };

        match self.notifier.notify(&body).await {
            Ok(()) => Ok(()),
            Err(e) => match self.on_failure {
                NotificationFailurePolicy::Fail => Err(e),
                NotificationFailurePolicy::Log => {
                    tracing::warn!(error = %e, "Notification failed; continuing");
                    Ok(())
                }
            },
        }
    }
}

/// Tab-indented response JSON without the inline audio.
pub(crate) fn render_response(response: &MessageResponse) -> Result<String> {
    let mut value = serde_json::to_value(response).map_err(|e| {
        tracing::error!(error = %e, "Could not serialize response");
        AppError::Internal
    })?;

    if let Some(message) = value.get_mut("message").and_then(Value::as_object_mut) {
        message.remove("audioDataBase64");
    }

    to_tab_indented(&value)
}

pub(crate) fn to_tab_indented<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut serializer).map_err(|e| {
        tracing::error!(error = %e, "Could not serialize JSON");
        AppError::Internal
    })?;
    String::from_utf8(buf).map_err(|_| AppError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::{AudioFormat, Message};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, body: &str) -> Result<()> {
            self.sent.lock().unwrap().push(body.to_string());
            if self.fail { Err(AppError::Notification("down".into())) } else { Ok(()) }
        }
    }

    fn ok_response() -> (MessageRequest, MessageResponse) {
        let request = MessageRequest { text: "hello".into() };
        let response = MessageResponse::Ok {
            approximate_queue_index: 2,
            message: Message {
                message_id: "5d41402abc4b2a76b9719d911017c592".into(),
                text: "hello".into(),
                url: "https://udm.example.com/messages/5d41402abc4b2a76b9719d911017c592.json".into(),
                audio_url: Some("https://udm.example.com/messages/5d41402abc4b2a76b9719d911017c592.mp3".into()),
                audio_format: Some(AudioFormat::Mp3),
                audio_data_base64: Some("SUQzBAAAAAAA".into()),
            },
        };
        (request, response)
    }

    #[tokio::test]
    async fn test_text_payload_is_the_submitted_text() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = NotificationService::new(notifier.clone(), NotificationPayload::Text, NotificationFailurePolicy::Fail);
        let (request, response) = ok_response();

        service.notify_submission(&request, &response).await.unwrap();
        assert_eq!(*notifier.sent.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_response_payload_strips_inline_audio() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service =
            NotificationService::new(notifier.clone(), NotificationPayload::Response, NotificationFailurePolicy::Fail);
        let (request, response) = ok_response();

        service.notify_submission(&request, &response).await.unwrap();
        let sent = notifier.sent.lock().unwrap();
        assert!(!sent[0].contains("audioDataBase64"));
        assert!(sent[0].contains("\t\"approximateQueueIndex\": 2"));

        let parsed: Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(parsed["message"]["audioFormat"], "mp3");
    }

    #[tokio::test]
    async fn test_failure_policy() {
        let (request, response) = ok_response();
        let failing = Arc::new(RecordingNotifier { fail: true, ..Default::default() });

        let strict = NotificationService::new(failing.clone(), NotificationPayload::Text, NotificationFailurePolicy::Fail);
        assert!(matches!(strict.notify_submission(&request, &response).await, Err(AppError::Notification(_))));

        let lenient = NotificationService::new(failing.clone(), NotificationPayload::Text, NotificationFailurePolicy::Log);
        assert!(lenient.notify_submission(&request, &response).await.is_ok());
        assert_eq!(failing.sent.lock().unwrap().len(), 2);
    }
}
