#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::net::TcpListener;
use udm_server::adapters::notify::Notifier;
use udm_server::adapters::queue::MessageQueue;
use udm_server::adapters::speech::{SpeechSynthesizer, SynthesizedSpeech};
use udm_server::adapters::storage::ObjectStorage;
use udm_server::api::{AppState, MgmtState, app_router, mgmt_router};
use udm_server::config::{NotificationFailurePolicy, NotificationPayload};
use udm_server::domain::message::AudioFormat;
use udm_server::error::{AppError, Result};
use udm_server::services::health_service::HealthService;
use udm_server::services::message_service::{MessageService, SpeechSettings};
use udm_server::services::notification_service::NotificationService;
use udm_server::services::profanity::ProfanityFilter;

pub const WEBSITE_BASE_URL: &str = "https://udm.example.com/";
pub const FAKE_AUDIO: &[u8] = b"ID3\x04\x00fake-mp3-frames";

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("udm_server=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub body: Bytes,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    pub puts: Mutex<Vec<StoredObject>>,
    /// Writes to keys ending with this suffix fail after being recorded.
    pub fail_suffix: Mutex<Option<String>>,
    pub unhealthy: AtomicBool,
}

impl MemoryStorage {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.puts.lock().unwrap().iter().map(|o| o.key.clone()).collect();
        keys.sort();
        keys
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.puts.lock().unwrap().iter().find(|o| o.key == key).cloned()
    }

    pub fn fail_writes_ending_with(&self, suffix: &str) {
        *self.fail_suffix.lock().unwrap() = Some(suffix.to_string());
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        // Yield so concurrent writes genuinely interleave.
        tokio::task::yield_now().await;
        self.puts.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });

        let fail = self.fail_suffix.lock().unwrap().as_deref().is_some_and(|suffix| key.ends_with(suffix));
        if fail { Err(AppError::Storage(format!("put {key} failed"))) } else { Ok(()) }
    }

    async fn check(&self) -> Result<()> {
        if self.unhealthy.load(Ordering::SeqCst) { Err(AppError::Storage("down".into())) } else { Ok(()) }
    }
}

#[derive(Debug, Default)]
pub struct MemoryQueue {
    pub sent: Mutex<Vec<String>>,
    pub depth: AtomicU64,
    pub depth_calls: AtomicUsize,
    pub fail_send: AtomicBool,
    pub fail_depth: AtomicBool,
}

impl MemoryQueue {
    pub fn with_depth(depth: u64) -> Self {
        Self { depth: AtomicU64::new(depth), ..Default::default() }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageQueue for MemoryQueue {
    async fn send(&self, body: String) -> Result<()> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(AppError::Queue("send failed".into()));
        }
        self.sent.lock().unwrap().push(body);
        Ok(())
    }

    async fn approximate_depth(&self) -> Result<u64> {
        self.depth_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_depth.load(Ordering::SeqCst) {
            return Err(AppError::Queue("attributes unavailable".into()));
        }
        Ok(self.depth.load(Ordering::SeqCst))
    }
}

#[derive(Debug)]
pub struct FakeSynthesizer {
    pub calls: AtomicUsize,
    pub output: Mutex<SynthesizedSpeech>,
    pub last_request: Mutex<Option<(String, AudioFormat, String)>>,
}

impl Default for FakeSynthesizer {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            output: Mutex::new(SynthesizedSpeech {
                audio: Some(Bytes::from_static(FAKE_AUDIO)),
                content_type: Some("audio/mpeg".into()),
            }),
            last_request: Mutex::new(None),
        }
    }
}

impl FakeSynthesizer {
    pub fn returning(output: SynthesizedSpeech) -> Self {
        Self { output: Mutex::new(output), ..Default::default() }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str, format: AudioFormat, voice: &str) -> Result<SynthesizedSpeech> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((text.to_string(), format, voice.to_string()));
        Ok(self.output.lock().unwrap().clone())
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push(body.to_string());
        if self.fail.load(Ordering::SeqCst) { Err(AppError::Notification("SMS gateway down".into())) } else { Ok(()) }
    }
}

/// Every collaborator of the intake service, as inspectable fakes.
#[derive(Debug)]
pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub queue: Arc<MemoryQueue>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub notifier: Arc<RecordingNotifier>,
    pub text_to_speech: bool,
    pub payload: NotificationPayload,
    pub on_failure: NotificationFailurePolicy,
}

impl Default for Harness {
    fn default() -> Self {
        setup_tracing();
        Self {
            storage: Arc::new(MemoryStorage::default()),
            queue: Arc::new(MemoryQueue::with_depth(3)),
            synthesizer: Arc::new(FakeSynthesizer::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            text_to_speech: false,
            payload: NotificationPayload::Text,
            on_failure: NotificationFailurePolicy::Fail,
        }
    }
}

impl Harness {
    pub fn with_speech() -> Self {
        Self { text_to_speech: true, ..Default::default() }
    }

    pub fn service(&self) -> MessageService {
        let speech = self.text_to_speech.then(|| SpeechSettings {
            synthesizer: self.synthesizer.clone(),
            format: AudioFormat::Mp3,
            voice: "Justin".to_string(),
        });

        MessageService::new(
            ProfanityFilter::standard(&[]),
            self.storage.clone(),
            self.queue.clone(),
            speech,
            NotificationService::new(self.notifier.clone(), self.payload, self.on_failure),
            WEBSITE_BASE_URL.parse().unwrap(),
        )
    }

    pub fn health_service(&self) -> HealthService {
        HealthService::new(self.storage.clone(), self.queue.clone(), Duration::from_secs(1), Duration::from_secs(1))
    }
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(harness: &Harness) -> Self {
        let router = app_router(AppState { message_service: harness.service() });
        let mgmt = mgmt_router(MgmtState { health_service: harness.health_service() });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", listener.local_addr().unwrap());
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt).await.unwrap();
        });

        Self { server_url, mgmt_url, client: reqwest::Client::new() }
    }

    pub async fn post_message(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(format!("{}/api/messages", self.server_url))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }
}
