use crate::domain::message::AudioFormat;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

pub mod polly;

pub use polly::PollySynthesizer;

/// Raw synthesizer output. Either field may be absent when the provider
/// misbehaves; callers decide whether that is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesizedSpeech {
    pub audio: Option<Bytes>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + std::fmt::Debug + 'static {
    async fn synthesize(&self, text: &str, format: AudioFormat, voice: &str) -> Result<SynthesizedSpeech>;
}
