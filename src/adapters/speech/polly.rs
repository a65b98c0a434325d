use crate::adapters::speech::{SpeechSynthesizer, SynthesizedSpeech};
use crate::domain::message::AudioFormat;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_polly::Client;
use aws_sdk_polly::types::{OutputFormat, VoiceId};

#[derive(Clone, Debug)]
pub struct PollySynthesizer {
    client: Client,
}

impl PollySynthesizer {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

const fn output_format(format: AudioFormat) -> OutputFormat {
    match format {
        AudioFormat::Mp3 => OutputFormat::Mp3,
        AudioFormat::OggVorbis => OutputFormat::OggVorbis,
        AudioFormat::Pcm => OutputFormat::Pcm,
    }
}

#[async_trait]
impl SpeechSynthesizer for PollySynthesizer {
    #[tracing::instrument(skip(self, text), fields(format = format.as_str(), voice = %voice))]
    async fn synthesize(&self, text: &str, format: AudioFormat, voice: &str) -> Result<SynthesizedSpeech> {
        let output = self
            .client
            .synthesize_speech()
            .output_format(output_format(format))
            .text(text)
            .voice_id(VoiceId::from(voice))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Polly SynthesizeSpeech failed");
                AppError::Synthesis("synthesize request failed".into())
            })?;

        let content_type = output.content_type().map(str::to_string);
        let audio = output
            .audio_stream
            .collect()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Polly audio stream failed");
                AppError::Synthesis("audio stream interrupted".into())
            })?
            .into_bytes();

        tracing::debug!(audio_bytes = audio.len(), content_type = ?content_type, "Speech synthesized");

        Ok(SynthesizedSpeech { audio: (!audio.is_empty()).then_some(audio), content_type })
    }
}
