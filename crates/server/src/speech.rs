//! Cloud speech proxy
//!
//! Thin clients for the configured text-to-speech and speech-to-text
//! endpoints (Google Cloud Speech REST shapes). When no endpoint is
//! configured the service reports itself unavailable instead of failing
//! the whole request pipeline.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use member_assist_config::SpeechSettings;
use member_assist_core::{Error, Result, SpeechRecognizer, SpeechSynthesizer};

const B64: base64::engine::general_purpose::GeneralPurpose =
    base64::engine::general_purpose::STANDARD;

/// Client for the configured cloud speech endpoints
pub struct CloudSpeechClient {
    settings: SpeechSettings,
    api_key: Option<String>,
    client: Client,
}

impl CloudSpeechClient {
    pub fn new(settings: SpeechSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).ok();
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::Speech(e.to_string()))?;

        Ok(Self {
            settings,
            api_key,
            client,
        })
    }

    fn url(&self, endpoint: &str) -> Result<String> {
        if endpoint.is_empty() {
            return Err(Error::Speech("speech service not configured".to_string()));
        }
        match &self.api_key {
            Some(key) => Ok(format!("{}?key={}", endpoint, key)),
            None => Ok(endpoint.to_string()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for CloudSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = self.url(&self.settings.tts_endpoint)?;

        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &self.settings.language_code,
                name: &self.settings.voice,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Speech(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Speech(format!("TTS HTTP {}: {}", status, body)));
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Speech(e.to_string()))?;

        B64.decode(body.audio_content.as_bytes())
            .map_err(|e| Error::Speech(format!("invalid audio payload: {}", e)))
    }
}

#[async_trait]
impl SpeechRecognizer for CloudSpeechClient {
    async fn recognize(&self, audio: &[u8]) -> Result<String> {
        let url = self.url(&self.settings.stt_endpoint)?;

        let request = RecognizeRequest {
            config: RecognitionConfig {
                language_code: &self.settings.language_code,
            },
            audio: RecognitionAudio {
                content: B64.encode(audio),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Speech(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Speech(format!("STT HTTP {}: {}", status, body)));
        }

        let body: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Speech(e.to_string()))?;

        let transcript = body
            .results
            .into_iter()
            .flat_map(|r| r.alternatives)
            .map(|a| a.transcript)
            .next()
            .unwrap_or_default();

        Ok(transcript)
    }
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct VoiceSelection<'a> {
    #[serde(rename = "languageCode")]
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct AudioConfig {
    #[serde(rename = "audioEncoding")]
    audio_encoding: &'static str,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent", default)]
    audio_content: String,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
struct RecognitionConfig<'a> {
    #[serde(rename = "languageCode")]
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}
