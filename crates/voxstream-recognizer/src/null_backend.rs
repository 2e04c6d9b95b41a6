use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;
use voxstream_core::{
    CanceledEvent, CancellationReason, RecognitionEvent, RecognizedEvent, RecognizedResult,
    RecognizerError, RecognizingEvent, SessionEvent,
};

use crate::backend::SpeechBackend;

const NULL_SESSION_ID: &str = "null-session";

/// Offline backend that never touches the network.
///
/// Each fed chunk produces a `Recognizing` hypothesis with the running byte
/// count; end of audio produces a final `Recognized` phrase with the total.
/// Useful for wiring tests and for running without credentials.
pub struct NullBackend {
    feed_count: AtomicUsize,
    byte_count: AtomicUsize,
    speech_started: AtomicBool,
    events: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            feed_count: AtomicUsize::new(0),
            byte_count: AtomicUsize::new(0),
            speech_started: AtomicBool::new(false),
            events: Mutex::new(None),
        }
    }

    pub fn feed_count(&self) -> usize {
        self.feed_count.load(Ordering::Relaxed)
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
            session_id: NULL_SESSION_ID.to_string(),
        }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<RecognitionEvent>) {
        *self.events.lock().unwrap() = Some(sender);
    }

    async fn start_continuous(&self) -> Result<(), RecognizerError> {
        self.emit(RecognitionEvent::SessionStarted(self.session_event()));
        Ok(())
    }

    async fn feed_audio(&self, chunk: Vec<u8>) -> Result<(), RecognizerError> {
        let count = self.feed_count.fetch_add(1, Ordering::Relaxed) + 1;
        if chunk.is_empty() {
            return Ok(());
        }
        if !self.speech_started.swap(true, Ordering::Relaxed) {
            self.emit(RecognitionEvent::SpeechStartDetected(self.session_event()));
        }
        let total = self.byte_count.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
        self.emit(RecognitionEvent::Recognizing(RecognizingEvent {
            session_id: NULL_SESSION_ID.to_string(),
            text: format!("{total} bytes"),
        }));
        tracing::trace!("null backend fed chunk #{count}, {} bytes", chunk.len());
        Ok(())
    }

    async fn end_of_audio(&self) -> Result<(), RecognizerError> {
        let total = self.byte_count.load(Ordering::Relaxed);
        if total == 0 {
            self.emit(RecognitionEvent::Canceled(CanceledEvent {
                session_id: NULL_SESSION_ID.to_string(),
                reason: CancellationReason::EndOfStream,
                error_details: None,
            }));
        } else {
            self.emit(RecognitionEvent::Recognized(RecognizedEvent {
                session_id: NULL_SESSION_ID.to_string(),
                result: RecognizedResult::Phrase {
                    text: format!("{total} bytes"),
                    confidence: 1.0,
                },
            }));
            self.emit(RecognitionEvent::SpeechEndDetected(self.session_event()));
        }
        self.close_events();
        Ok(())
    }

    async fn stop_continuous(&self) -> Result<(), RecognizerError> {
        self.emit(RecognitionEvent::SessionStopped(self.session_event()));
        self.close_events();
        Ok(())
    }
}
