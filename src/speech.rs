/*!
 * Narration text-to-speech.
 *
 * Talks to a translate-style TTS endpoint that accepts at most about 100
 * characters per request, so the script is split on word boundaries and
 * the returned MP3 segments are appended in order.
 */

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use log::debug;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::errors::AssemblyError;
use crate::file_utils::FileManager;

/// Longest text sent in one TTS request
pub const MAX_SPEECH_CHUNK_CHARS: usize = 100;

/// Anything that can turn text into MP3 audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into MP3 bytes
    async fn synthesize(&self, text: &str) -> Result<Bytes, AssemblyError>;

    /// Synthesize `text` and write it to `path`
    async fn save(&self, text: &str, path: &Path) -> Result<(), AssemblyError> {
        let audio = self.synthesize(text).await?;
        FileManager::write_to_file(path, &audio).map_err(|e| AssemblyError::Io(e.to_string()))
    }
}

/// Client for the translate TTS endpoint
#[derive(Debug, Clone)]
pub struct TranslateTts {
    client: Client,
    endpoint: String,
    language: String,
}

impl TranslateTts {
    pub fn new(endpoint: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            language: language.into(),
        }
    }

    fn chunk_url(&self, chunk: &str, idx: usize, total: usize) -> Result<Url, AssemblyError> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", self.language.as_str()),
                ("client", "tw-ob"),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ],
        )
        .map_err(|e| AssemblyError::Speech(format!("Invalid TTS endpoint: {}", e)))
    }
}

#[async_trait]
impl SpeechSynthesizer for TranslateTts {
    async fn synthesize(&self, text: &str) -> Result<Bytes, AssemblyError> {
        let chunks = split_for_speech(text, MAX_SPEECH_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(AssemblyError::Speech("No text to speak".to_string()));
        }

        let mut audio = BytesMut::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("TTS chunk {}/{}", idx + 1, chunks.len());
            let url = self.chunk_url(chunk, idx, chunks.len())?;
            let bytes = self.client.get(url)
                .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| AssemblyError::Speech(e.to_string()))?
                .bytes()
                .await
                .map_err(|e| AssemblyError::Speech(e.to_string()))?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio.freeze())
    }
}

/// Split text into pieces of at most `max_chars` characters, breaking on
/// whitespace where possible and hard-splitting longer words
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
