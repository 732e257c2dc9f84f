use crate::caption::ProviderWord;
use crate::error::{CaptionError, Result};
use crate::transcribe::Transcriber;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, info, warn};

/// AssemblyAI API host.
const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com";

/// Delay between transcript status checks.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Give up on a transcript that has not finished after this long.
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30 * 60);

/// Maximum retries for a single status request.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 500;

/// AssemblyAI client: upload, queue, then poll until the transcript is done.
pub struct AssemblyAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language: Option<String>,
    poll_interval: Duration,
    max_wait: Duration,
}

impl AssemblyAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }

    /// Point the client at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the spoken language (e.g. `en_us`). Auto-detected when unset.
    pub fn with_language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    async fn upload(&self, audio: &Path) -> Result<String> {
        let bytes = fs::read(audio).await?;
        debug!("Uploading {} bytes to AssemblyAI", bytes.len());

        let response = self
            .client
            .post(format!("{}/v2/upload", self.base_url))
            .header("authorization", &self.api_key)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        let upload: UploadResponse = parse_response(response).await?;
        Ok(upload.upload_url)
    }

    async fn create_transcript(&self, audio_url: String) -> Result<String> {
        let request = TranscriptRequest {
            audio_url,
            speaker_labels: false,
            language_code: self.language.clone(),
        };

        let response = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let created: TranscriptResponse = parse_response(response).await?;
        debug!("Queued transcript {} ({})", created.id, created.status);
        Ok(created.id)
    }

    async fn fetch_transcript(&self, id: &str) -> Result<TranscriptResponse> {
        let response = self
            .client
            .get(format!("{}/v2/transcript/{}", self.base_url, id))
            .header("authorization", &self.api_key)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Status request with retry; client errors are returned immediately.
    async fn fetch_with_retry(&self, id: &str) -> Result<TranscriptResponse> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_DELAY_MS * 2u64.pow(attempt - 1);
                debug!("Retry attempt {} after {}ms delay", attempt, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.fetch_transcript(id).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if e.to_string().contains("API error (4") {
                        return Err(e);
                    }
                    warn!("Status check {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CaptionError::Api("Unknown error".to_string())))
    }

    async fn wait_for_completion(&self, id: &str) -> Result<TranscriptResponse> {
        let started = Instant::now();

        loop {
            let transcript = self.fetch_with_retry(id).await?;
            match transcript.status {
                TranscriptStatus::Completed => return Ok(transcript),
                TranscriptStatus::Error => {
                    return Err(CaptionError::Transcription(format!(
                        "AssemblyAI transcription failed: {}",
                        transcript.error.unwrap_or_else(|| "unknown error".to_string())
                    )))
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing => {
                    if started.elapsed() >= self.max_wait {
                        return Err(CaptionError::Transcription(format!(
                            "Transcript {} not finished after {:.0}s",
                            id,
                            self.max_wait.as_secs_f64()
                        )));
                    }
                    debug!("Transcript {} is {}", id, transcript.status);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl Transcriber for AssemblyAiClient {
    async fn transcribe(&self, audio: &Path) -> Result<Vec<ProviderWord>> {
        if !audio.exists() {
            return Err(CaptionError::FileNotFound(audio.display().to_string()));
        }

        let audio_url = self.upload(audio).await?;
        let id = self.create_transcript(audio_url).await?;
        info!("Waiting for AssemblyAI transcript {}", id);

        let transcript = self.wait_for_completion(&id).await?;
        let words = transcript.words.unwrap_or_default();
        if words.is_empty() {
            warn!("No words found in AssemblyAI transcript {}", id);
        } else {
            info!("AssemblyAI returned {} words", words.len());
        }

        Ok(words)
    }

    fn name(&self) -> &'static str {
        "AssemblyAI"
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }

    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
        return Err(CaptionError::Api(format!(
            "AssemblyAI API error ({}): {}",
            status.as_u16(),
            api_error.error
        )));
    }

    Err(CaptionError::Api(format!(
        "AssemblyAI API error ({}): {}",
        status.as_u16(),
        body
    )))
}

// API request/response types

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Serialize)]
struct TranscriptRequest {
    audio_url: String,
    speaker_labels: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl std::fmt::Display for TranscriptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptStatus::Queued => write!(f, "queued"),
            TranscriptStatus::Processing => write!(f, "processing"),
            TranscriptStatus::Completed => write!(f, "completed"),
            TranscriptStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: String,
    status: TranscriptStatus,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    words: Option<Vec<ProviderWord>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AssemblyAiClient::new("key".to_string()).with_base_url("http://localhost:1234/");
        assert_eq!(client.base_url, "http://localhost:1234");
    }

    #[test]
    fn test_transcript_request_omits_missing_language() {
        let request = TranscriptRequest {
            audio_url: "https://cdn/x".to_string(),
            speaker_labels: false,
            language_code: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"audio_url":"https://cdn/x","speaker_labels":false}"#);
    }

    #[test]
    fn test_parse_completed_transcript() {
        let body = r#"{
            "id": "abc",
            "status": "completed",
            "words": [
                {"text": "Hello", "start": 250, "end": 640, "confidence": 0.97},
                {"text": "world.", "start": 700, "end": 1100, "confidence": 0.91}
            ]
        }"#;
        let transcript: TranscriptResponse = serde_json::from_str(body).unwrap();

        assert_eq!(transcript.status, TranscriptStatus::Completed);
        let words = transcript.words.unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].start, 700);
    }

    #[tokio::test]
    async fn test_transcribe_missing_file() {
        let client = AssemblyAiClient::new("key".to_string());
        let result = client.transcribe(Path::new("/nonexistent/audio.wav")).await;
        assert!(matches!(result, Err(CaptionError::FileNotFound(_))));
    }
}
