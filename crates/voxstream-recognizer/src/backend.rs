use async_trait::async_trait;
use tokio::sync::mpsc;
use voxstream_core::{RecognitionEvent, RecognizerError};

/// Trait implemented by every speech-recognition backend.
///
/// A backend receives pushed audio and publishes [`RecognitionEvent`]s over
/// the sender registered with [`set_event_sender`](Self::set_event_sender).
/// The backend holds the only sender for its session: once recognition can
/// produce no further events (final result delivered, stream canceled, or
/// recognition stopped) it drops the sender, which the session observes as
/// end of events.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Backend name as registered (e.g. "azure").
    fn name(&self) -> &str;

    /// Register the channel all session events are published on.
    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<RecognitionEvent>);

    /// Begin continuous recognition. Emits `SessionStarted`.
    async fn start_continuous(&self) -> Result<(), RecognizerError>;

    /// Accept one chunk of pushed audio.
    async fn feed_audio(&self, chunk: Vec<u8>) -> Result<(), RecognizerError>;

    /// The audio stream has closed; finish recognition and emit the
    /// terminal events for this stream.
    async fn end_of_audio(&self) -> Result<(), RecognizerError>;

    /// Cooperatively stop continuous recognition. Emits `SessionStopped`.
    async fn stop_continuous(&self) -> Result<(), RecognizerError>;
}
