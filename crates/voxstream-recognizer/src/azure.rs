use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;
use voxstream_core::{
    CanceledEvent, CancellationReason, NoMatchReason, RecognitionEvent, RecognizedEvent,
    RecognizedResult, RecognizerError, SessionEvent, SpeechSettings,
};

use crate::backend::SpeechBackend;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const AUDIO_CONTENT_TYPE: &str = "audio/wav";

/// Azure Cognitive Services speech-to-text backend.
///
/// Talks to the regional short-audio REST endpoint with `format=detailed`, so
/// the response carries per-alternative confidence scores. Audio chunks are
/// buffered as they arrive and submitted in a single request once the push
/// stream closes; the service owns decoding and scoring. The REST surface has
/// no interim hypotheses, so this backend emits no `Recognizing` events.
pub struct AzureSpeechBackend {
    client: reqwest::Client,
    url: String,
    subscription_key: String,
    session_id: String,
    buffer: Mutex<Vec<u8>>,
    speech_started: AtomicBool,
    stopped: AtomicBool,
    events: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
}

impl AzureSpeechBackend {
    /// Build a backend from settings.
    ///
    /// Incomplete settings are accepted: the service rejects them at request
    /// time and the rejection surfaces as a `Canceled` event.
    pub fn new(settings: &SpeechSettings) -> Result<Self, RecognizerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                RecognizerError::InitializationFailed(format!("failed to build http client: {e}"))
            })?;
        Ok(Self {
            client,
            url: recognition_url(&settings.region, &settings.language),
            subscription_key: settings.subscription_key.clone(),
            session_id: Uuid::new_v4().simple().to_string(),
            buffer: Mutex::new(Vec::new()),
            speech_started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            events: Mutex::new(None),
        })
    }

    fn emit(&self, event: RecognitionEvent) {
        if let Ok(sender) = self.events.lock() {
            if let Some(tx) = sender.as_ref() {
                let _ = tx.send(event);
            }
        }
    }

    fn close_events(&self) {
        if let Ok(mut sender) = self.events.lock() {
            sender.take();
        }
    }

    fn session_event(&self) -> SessionEvent {
        SessionEvent {
            session_id: self.session_id.clone(),
        }
    }

    fn cancel_with_error(&self, details: String) {
        tracing::warn!(session_id = %self.session_id, "recognition canceled: {details}");
        self.emit(RecognitionEvent::Canceled(CanceledEvent {
            session_id: self.session_id.clone(),
            reason: CancellationReason::Error,
            error_details: Some(details),
        }));
        self.close_events();
    }
}

#[async_trait]
impl SpeechBackend for AzureSpeechBackend {
    fn name(&self) -> &str {
        "azure"
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<RecognitionEvent>) {
        *self.events.lock().unwrap() = Some(sender);
    }

    async fn start_continuous(&self) -> Result<(), RecognizerError> {
        tracing::debug!(session_id = %self.session_id, url = %self.url, "starting recognition");
        self.emit(RecognitionEvent::SessionStarted(self.session_event()));
        Ok(())
    }

    async fn feed_audio(&self, chunk: Vec<u8>) -> Result<(), RecognizerError> {
        if chunk.is_empty() || self.stopped.load(Ordering::Relaxed) {
            return Ok(());
        }
        if !self.speech_started.swap(true, Ordering::Relaxed) {
            self.emit(RecognitionEvent::SpeechStartDetected(self.session_event()));
        }
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.extend_from_slice(&chunk);
        }
        Ok(())
    }

    async fn end_of_audio(&self) -> Result<(), RecognizerError> {
        if self.stopped.load(Ordering::Relaxed) {
            return Ok(());
        }
        let audio = match self.buffer.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(_) => Vec::new(),
        };
        if audio.is_empty() {
            self.emit(RecognitionEvent::Canceled(CanceledEvent {
                session_id: self.session_id.clone(),
                reason: CancellationReason::EndOfStream,
                error_details: None,
            }));
            self.close_events();
            return Ok(());
        }

        tracing::debug!(
            session_id = %self.session_id,
            bytes = audio.len(),
            "submitting audio for recognition"
        );
        let response = self
            .client
            .post(self.url.as_str())
            .header("Ocp-Apim-Subscription-Key", self.subscription_key.as_str())
            .header("Content-Type", AUDIO_CONTENT_TYPE)
            .header("Accept", "application/json")
            .body(audio)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                self.cancel_with_error(format!("network send error: {e}"));
                return Ok(());
            }
        };

        if !response.status().is_success() {
            self.cancel_with_error(describe_http_status(response.status()));
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                self.cancel_with_error(format!("failed to read response body: {e}"));
                return Ok(());
            }
        };

        match parse_detailed_response(&body) {
            Ok(result) => {
                self.emit(RecognitionEvent::Recognized(RecognizedEvent {
                    session_id: self.session_id.clone(),
                    result,
                }));
                self.emit(RecognitionEvent::SpeechEndDetected(self.session_event()));
                self.close_events();
            }
            Err(details) => self.cancel_with_error(details),
        }
        Ok(())
    }

    async fn stop_continuous(&self) -> Result<(), RecognizerError> {
        if self.stopped.swap(true, Ordering::Relaxed) {
            return Ok(());
        }
        self.emit(RecognitionEvent::SessionStopped(self.session_event()));
        self.close_events();
        Ok(())
    }
}

/// Regional short-audio endpoint for one-shot conversational recognition.
fn recognition_url(region: &str, language: &str) -> String {
    format!(
        "https://{region}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language={language}&format=detailed"
    )
}

#[derive(Debug, Deserialize)]
struct DetailedResponse {
    #[serde(rename = "RecognitionStatus")]
    recognition_status: String,
    #[serde(rename = "DisplayText")]
    display_text: Option<String>,
    #[serde(rename = "NBest")]
    nbest: Option<Vec<NBestItem>>,
}

#[derive(Debug, Deserialize)]
struct NBestItem {
    #[serde(rename = "Confidence")]
    confidence: f32,
    #[serde(rename = "Display")]
    display: Option<String>,
    #[serde(rename = "Lexical")]
    lexical: Option<String>,
}

/// Map a `format=detailed` response body to a recognition result.
///
/// `Success` picks the top `NBest` alternative; silence and babble statuses
/// become no-match reasons; anything else is an error the caller reports as a
/// cancellation.
fn parse_detailed_response(body: &str) -> Result<RecognizedResult, String> {
    let response: DetailedResponse =
        serde_json::from_str(body).map_err(|e| format!("unexpected response body: {e}"))?;
    match response.recognition_status.as_str() {
        "Success" => {
            let (text, confidence) = match response.nbest.as_ref().and_then(|list| list.first()) {
                Some(best) => (
                    best.display
                        .clone()
                        .or_else(|| best.lexical.clone())
                        .or_else(|| response.display_text.clone())
                        .unwrap_or_default(),
                    best.confidence,
                ),
                None => (response.display_text.clone().unwrap_or_default(), 0.0),
            };
            Ok(RecognizedResult::Phrase { text, confidence })
        }
        "NoMatch" => Ok(RecognizedResult::NoMatch {
            reason: NoMatchReason::NotRecognized,
        }),
        "InitialSilenceTimeout" => Ok(RecognizedResult::NoMatch {
            reason: NoMatchReason::InitialSilenceTimeout,
        }),
        "BabbleTimeout" => Ok(RecognizedResult::NoMatch {
            reason: NoMatchReason::BabbleTimeout,
        }),
        other => Err(format!("recognition failed with status {other}")),
    }
}

fn describe_http_status(status: reqwest::StatusCode) -> String {
    match status.as_u16() {
        400 => "bad request: the service rejected the audio or parameters (HTTP 400)".to_string(),
        401 => "unauthorized: check SPEECH_SUBSCRIPTION_KEY and SPEECH_REGION (HTTP 401)".to_string(),
        403 => "forbidden: the subscription does not allow this operation (HTTP 403)".to_string(),
        429 => "rate limited by the service (HTTP 429)".to_string(),
        code if status.is_server_error() => format!("service error (HTTP {code})"),
        code => format!("unexpected response (HTTP {code})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_settings() -> SpeechSettings {
        SpeechSettings {
            subscription_key: String::new(),
            region: String::new(),
            language: String::new(),
        }
    }

    #[test]
    fn test_azure_backend_name() {
        let backend = AzureSpeechBackend::new(&empty_settings()).unwrap();
        assert_eq!(backend.name(), "azure");
    }

    #[test]
    fn test_azure_backend_accepts_incomplete_settings() {
        // Missing credentials fail at the service, not at construction
        assert!(AzureSpeechBackend::new(&empty_settings()).is_ok());
    }

    #[test]
    fn test_azure_backend_session_ids_are_unique() {
        let a = AzureSpeechBackend::new(&empty_settings()).unwrap();
        let b = AzureSpeechBackend::new(&empty_settings()).unwrap();
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.session_id.len(), 32);
    }

    #[test]
    fn test_recognition_url_embeds_region_and_language() {
        let url = recognition_url("westus", "en-US");
        assert_eq!(
            url,
            "https://westus.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language=en-US&format=detailed"
        );
    }

    #[test]
    fn test_parse_success_takes_top_alternative() {
        let body = r#"{
            "RecognitionStatus": "Success",
            "DisplayText": "Hello world.",
            "Offset": 100000,
            "Duration": 12000000,
            "NBest": [
                {"Confidence": 0.8734, "Lexical": "hello world", "Display": "Hello world."},
                {"Confidence": 0.41, "Lexical": "yellow world", "Display": "Yellow world."}
            ]
        }"#;
        match parse_detailed_response(body).unwrap() {
            RecognizedResult::Phrase { text, confidence } => {
                assert_eq!(text, "Hello world.");
                assert!((confidence - 0.8734).abs() < 1e-6);
            }
            other => panic!("expected phrase, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_success_falls_back_to_lexical_then_display_text() {
        let body = r#"{
            "RecognitionStatus": "Success",
            "NBest": [{"Confidence": 0.5, "Lexical": "hello there"}]
        }"#;
        match parse_detailed_response(body).unwrap() {
            RecognizedResult::Phrase { text, .. } => assert_eq!(text, "hello there"),
            other => panic!("expected phrase, got {other:?}"),
        }

        let body = r#"{"RecognitionStatus": "Success", "DisplayText": "Plain text."}"#;
        match parse_detailed_response(body).unwrap() {
            RecognizedResult::Phrase { text, confidence } => {
                assert_eq!(text, "Plain text.");
                assert_eq!(confidence, 0.0);
            }
            other => panic!("expected phrase, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_no_match_statuses() {
        let cases = [
            ("NoMatch", NoMatchReason::NotRecognized),
            ("InitialSilenceTimeout", NoMatchReason::InitialSilenceTimeout),
            ("BabbleTimeout", NoMatchReason::BabbleTimeout),
        ];
        for (status, expected) in cases {
            let body = format!(r#"{{"RecognitionStatus": "{status}"}}"#);
            match parse_detailed_response(&body).unwrap() {
                RecognizedResult::NoMatch { reason } => assert_eq!(reason, expected),
                other => panic!("expected no-match for {status}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_error_status_is_reported() {
        let body = r#"{"RecognitionStatus": "Error"}"#;
        let details = parse_detailed_response(body).unwrap_err();
        assert!(details.contains("Error"));
    }

    #[test]
    fn test_parse_garbage_body_is_reported() {
        assert!(parse_detailed_response("not json").is_err());
    }

    #[test]
    fn test_describe_http_status_names_credentials_on_401() {
        let details = describe_http_status(reqwest::StatusCode::UNAUTHORIZED);
        assert!(details.contains("SPEECH_SUBSCRIPTION_KEY"));
        assert!(details.contains("401"));
    }

    #[tokio::test]
    async fn test_azure_backend_buffers_audio_and_detects_speech_start() {
        let mut backend = AzureSpeechBackend::new(&empty_settings()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        backend.set_event_sender(tx);

        backend.feed_audio(vec![0; 1024]).await.unwrap();
        backend.feed_audio(vec![0; 1024]).await.unwrap();

        // Exactly one speech-start for the whole stream
        assert_eq!(rx.recv().await.unwrap().kind(), "speechStartDetected");
        assert!(rx.try_recv().is_err());
        assert_eq!(backend.buffer.lock().unwrap().len(), 2048);
    }

    #[tokio::test]
    async fn test_azure_backend_empty_stream_cancels_without_request() {
        let mut backend = AzureSpeechBackend::new(&empty_settings()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        backend.set_event_sender(tx);

        backend.end_of_audio().await.unwrap();

        match rx.recv().await.unwrap() {
            RecognitionEvent::Canceled(e) => {
                assert_eq!(e.reason, CancellationReason::EndOfStream);
                assert!(e.error_details.is_none());
            }
            other => panic!("expected canceled, got {}", other.kind()),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_azure_backend_stop_emits_session_stopped_once() {
        let mut backend = AzureSpeechBackend::new(&empty_settings()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        backend.set_event_sender(tx);

        backend.stop_continuous().await.unwrap();
        backend.stop_continuous().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().kind(), "sessionStopped");
        assert!(rx.recv().await.is_none());
    }
}
