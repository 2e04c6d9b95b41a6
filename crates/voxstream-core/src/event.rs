use std::fmt;

/// Payload shared by the session-lifecycle notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub session_id: String,
}

/// An interim hypothesis for audio the service is still processing.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizingEvent {
    pub session_id: String,
    pub text: String,
}

/// A finalized recognition for a completed stretch of audio.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedEvent {
    pub session_id: String,
    pub result: RecognizedResult,
}

/// Recognition will produce no further results for this stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CanceledEvent {
    pub session_id: String,
    pub reason: CancellationReason,
    pub error_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognizedResult {
    /// The service transcribed speech. Confidence is the service's score for
    /// the top alternative, in `0.0..=1.0`.
    Phrase { text: String, confidence: f32 },
    /// The audio was understood as containing no recognizable speech.
    NoMatch { reason: NoMatchReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// The service or transport reported a failure.
    Error,
    /// The audio stream ended before any result could be produced.
    EndOfStream,
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancellationReason::Error => write!(f, "Error"),
            CancellationReason::EndOfStream => write!(f, "EndOfStream"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchReason {
    NotRecognized,
    InitialSilenceTimeout,
    BabbleTimeout,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatchReason::NotRecognized => write!(f, "NotRecognized"),
            NoMatchReason::InitialSilenceTimeout => write!(f, "InitialSilenceTimeout"),
            NoMatchReason::BabbleTimeout => write!(f, "BabbleTimeout"),
        }
    }
}

/// Everything a recognition backend can report while a stream is open.
///
/// Backends publish these over an unbounded channel in the order they occur;
/// consumers observe that order unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Recognizing(RecognizingEvent),
    Recognized(RecognizedEvent),
    Canceled(CanceledEvent),
    SessionStarted(SessionEvent),
    SessionStopped(SessionEvent),
    SpeechStartDetected(SessionEvent),
    SpeechEndDetected(SessionEvent),
}

impl RecognitionEvent {
    /// Short event name, matching the vocabulary used on the console.
    pub fn kind(&self) -> &'static str {
        match self {
            RecognitionEvent::Recognizing(_) => "recognizing",
            RecognitionEvent::Recognized(_) => "recognized",
            RecognitionEvent::Canceled(_) => "canceled",
            RecognitionEvent::SessionStarted(_) => "sessionStarted",
            RecognitionEvent::SessionStopped(_) => "sessionStopped",
            RecognitionEvent::SpeechStartDetected(_) => "speechStartDetected",
            RecognitionEvent::SpeechEndDetected(_) => "speechEndDetected",
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            RecognitionEvent::Recognizing(e) => &e.session_id,
            RecognitionEvent::Recognized(e) => &e.session_id,
            RecognitionEvent::Canceled(e) => &e.session_id,
            RecognitionEvent::SessionStarted(e)
            | RecognitionEvent::SessionStopped(e)
            | RecognitionEvent::SpeechStartDetected(e)
            | RecognitionEvent::SpeechEndDetected(e) => &e.session_id,
        }
    }
}
