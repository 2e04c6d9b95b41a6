//! Console lines for recognition events.
//!
//! The line shapes here are the program's observable output, so they are kept
//! in one place and covered by tests. Final results get a leading blank line
//! to stand out from the interim hypothesis stream.

use voxstream_core::{
    CanceledEvent, CancellationReason, RecognizedEvent, RecognizedResult, RecognizingEvent,
    SessionEvent,
};

pub fn recognizing_line(event: &RecognizingEvent) -> String {
    format!("(recognizing) Reason: RecognizingSpeech Text: {}", event.text)
}

pub fn recognized_line(event: &RecognizedEvent) -> String {
    match &event.result {
        RecognizedResult::Phrase { text, confidence } => format!(
            "\n(recognized)  Reason: RecognizedSpeech Text: ({:.2}%) {}",
            confidence * 100.0,
            text
        ),
        RecognizedResult::NoMatch { reason } => {
            format!("\n(recognized)  Reason: NoMatch NoMatchReason: {reason}")
        }
    }
}

pub fn canceled_line(event: &CanceledEvent) -> String {
    let mut line = format!("(cancel) Reason: {}", event.reason);
    if event.reason == CancellationReason::Error {
        if let Some(details) = &event.error_details {
            line.push_str(": ");
            line.push_str(details);
        }
    }
    line
}

pub fn session_started_line(event: &SessionEvent) -> String {
    format!("(sessionStarted) SessionId: {}", event.session_id)
}

pub fn session_stopped_line(event: &SessionEvent) -> String {
    format!("(sessionStopped) SessionId: {}", event.session_id)
}

pub fn speech_start_line(event: &SessionEvent) -> String {
    format!("(speechStartDetected) SessionId: {}", event.session_id)
}

pub fn speech_end_line(event: &SessionEvent) -> String {
    format!("(speechEndDetected) SessionId: {}", event.session_id)
}
