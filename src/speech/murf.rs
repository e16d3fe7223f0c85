//! Murf text-to-speech client.

use crate::error::{Result, Simple3Error};
use crate::speech::{SpeechAsset, SpeechSynthesizer, VoiceConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const MURF_BASE_URL: &str = "https://api.murf.ai";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    rate: i32,
    style: &'a str,
    multi_native_locale: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    audio_file: Option<String>,
    #[serde(default)]
    audio_length_in_seconds: Option<f64>,
}

/// Client for Murf's `speech/generate` endpoint
pub struct MurfClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MurfClient {
    pub fn new(api_key: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: api_key.into(),
            base_url: MURF_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/speech/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SpeechSynthesizer for MurfClient {
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<SpeechAsset> {
        info!("Sending {} chars to Murf", text.chars().count());

        let request = GenerateRequest {
            text,
            voice_id: &voice.voice_id,
            rate: voice.rate,
            style: &voice.style,
            multi_native_locale: &voice.multi_native_locale,
        };
        debug!(voice = %voice.voice_id, rate = voice.rate, style = %voice.style, "Murf request");

        let response = self
            .client
            .post(self.endpoint())
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Simple3Error::SynthesisError(format!("Murf request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Simple3Error::SynthesisError(format!(
                "Murf API error: {} - {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            Simple3Error::SynthesisError(format!("Unreadable Murf response: {}", e))
        })?;

        Ok(SpeechAsset {
            audio_file: body.audio_file.filter(|f| !f.is_empty()),
            audio_length_seconds: body.audio_length_in_seconds,
        })
    }
}
