//! Text-to-speech: synthesis through a provider and playback of the returned audio.

pub mod murf;
pub mod player;

pub use murf::MurfClient;
pub use player::{AudioPlayer, CommandPlayer, NullPlayer, DEFAULT_PLAYER_COMMAND};

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Voice parameters sent with every synthesis request
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub voice_id: String,
    /// Speech-rate adjustment understood by the provider
    pub rate: i32,
    pub style: String,
    /// Locale used by multi-locale voices
    pub multi_native_locale: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice_id: "fr-FR-axel".to_string(),
            rate: 40,
            style: "Narration".to_string(),
            multi_native_locale: "en-US".to_string(),
        }
    }
}

/// Audio produced by the provider
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechAsset {
    /// Reference to the audio, normally an HTTP URL
    pub audio_file: Option<String>,
    pub audio_length_seconds: Option<f64>,
}

impl SpeechAsset {
    /// The audio reference when it is a retrievable http(s) URL
    pub fn playable_url(&self) -> Option<&str> {
        let file = self.audio_file.as_deref()?;
        let url = reqwest::Url::parse(file).ok()?;
        matches!(url.scheme(), "http" | "https").then_some(file)
    }
}

/// Converts text into a speech asset
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<SpeechAsset>;
}

/// What happened to one piece of text sent to [`SpeechBridge::speak`]
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechOutcome {
    /// Blank text, the provider was not called
    Skipped,
    /// The provider returned no audio reference
    NoAudio,
    /// The provider returned something that is not an http(s) URL
    UnplayableAsset(String),
    Played(String),
}

/// Sends text to the synthesizer with a fixed voice and plays the result.
pub struct SpeechBridge {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn AudioPlayer>,
    voice: VoiceConfig,
}

impl SpeechBridge {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        player: Arc<dyn AudioPlayer>,
        voice: VoiceConfig,
    ) -> Self {
        Self {
            synthesizer,
            player,
            voice,
        }
    }

    pub async fn speak(&self, text: &str) -> Result<SpeechOutcome> {
        self.speak_with(text, |_| Ok(())).await
    }

    /// Like [`speak`](Self::speak), calling `before_play` with the URL once the audio
    /// is known to be playable and before the player starts.
    pub async fn speak_with<F>(&self, text: &str, before_play: F) -> Result<SpeechOutcome>
    where
        F: FnOnce(&str) -> std::io::Result<()>,
    {
        if text.trim().is_empty() {
            return Ok(SpeechOutcome::Skipped);
        }

        let asset = self.synthesizer.synthesize(text, &self.voice).await?;

        let Some(file) = asset.audio_file.as_deref() else {
            warn!("Speech response did not contain an audio file");
            return Ok(SpeechOutcome::NoAudio);
        };

        let Some(url) = asset.playable_url() else {
            warn!(audio_file = file, "Audio file is not a playable URL");
            return Ok(SpeechOutcome::UnplayableAsset(file.to_string()));
        };

        before_play(url)?;
        info!(url = url, seconds = ?asset.audio_length_seconds, "Playing synthesized audio");
        self.player.play(url).await?;

        Ok(SpeechOutcome::Played(url.to_string()))
    }
}
