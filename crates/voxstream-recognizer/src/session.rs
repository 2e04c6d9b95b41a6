use tokio::sync::mpsc;
use voxstream_audio::PushAudioReader;
use voxstream_core::{
    CanceledEvent, RecognitionEvent, RecognizedEvent, RecognizerError, RecognizingEvent,
    SessionEvent,
};

use crate::backend::SpeechBackend;

type Handler<E> = Box<dyn FnMut(&E) + Send>;

/// How a recognition session came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// A handler or the embedding application requested a cooperative stop.
    StopRequested,
    /// The backend closed its event channel without a stop request, e.g.
    /// after a cancellation that nothing reacted to.
    EventsExhausted,
}

enum SessionCommand {
    Stop,
}

/// Cloneable control handle for a running session.
///
/// Handles are typically captured by event handlers; requesting a stop from
/// inside a handler is the normal way a session ends.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Ask the session to stop. Safe to call from any handler or task; calls
    /// after the session has ended are ignored.
    pub fn request_stop(&self) {
        let _ = self.commands.send(SessionCommand::Stop);
    }
}

#[derive(Default)]
struct Handlers {
    recognizing: Option<Handler<RecognizingEvent>>,
    recognized: Option<Handler<RecognizedEvent>>,
    canceled: Option<Handler<CanceledEvent>>,
    session_started: Option<Handler<SessionEvent>>,
    session_stopped: Option<Handler<SessionEvent>>,
    speech_start_detected: Option<Handler<SessionEvent>>,
    speech_end_detected: Option<Handler<SessionEvent>>,
}

/// Drives one audio stream through a recognition backend.
///
/// The session owns three flows: audio chunks pulled from the push stream and
/// fed to the backend, events published by the backend and dispatched to the
/// registered handlers, and stop commands from [`SessionHandle`]s. All three
/// are pumped by a single select loop in [`run`](Self::run); handlers run on
/// that loop, so they see events in publication order.
pub struct RecognitionSession {
    backend: Box<dyn SpeechBackend>,
    audio: PushAudioReader,
    handlers: Handlers,
    events_tx: Option<mpsc::UnboundedSender<RecognitionEvent>>,
    events_rx: mpsc::UnboundedReceiver<RecognitionEvent>,
    commands_tx: mpsc::UnboundedSender<SessionCommand>,
    commands_rx: mpsc::UnboundedReceiver<SessionCommand>,
}

impl RecognitionSession {
    pub fn new(backend: Box<dyn SpeechBackend>, audio: PushAudioReader) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            audio,
            handlers: Handlers::default(),
            events_tx: Some(events_tx),
            events_rx,
            commands_tx,
            commands_rx,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            commands: self.commands_tx.clone(),
        }
    }

    // Handler registration. Each replaces any previously registered handler
    // for the same event.

    pub fn on_recognizing(&mut self, handler: impl FnMut(&RecognizingEvent) + Send + 'static) {
        self.handlers.recognizing = Some(Box::new(handler));
    }

    pub fn on_recognized(&mut self, handler: impl FnMut(&RecognizedEvent) + Send + 'static) {
        self.handlers.recognized = Some(Box::new(handler));
    }

    pub fn on_canceled(&mut self, handler: impl FnMut(&CanceledEvent) + Send + 'static) {
        self.handlers.canceled = Some(Box::new(handler));
    }

    pub fn on_session_started(&mut self, handler: impl FnMut(&SessionEvent) + Send + 'static) {
        self.handlers.session_started = Some(Box::new(handler));
    }

    pub fn on_session_stopped(&mut self, handler: impl FnMut(&SessionEvent) + Send + 'static) {
        self.handlers.session_stopped = Some(Box::new(handler));
    }

    pub fn on_speech_start_detected(
        &mut self,
        handler: impl FnMut(&SessionEvent) + Send + 'static,
    ) {
        self.handlers.speech_start_detected = Some(Box::new(handler));
    }

    pub fn on_speech_end_detected(&mut self, handler: impl FnMut(&SessionEvent) + Send + 'static) {
        self.handlers.speech_end_detected = Some(Box::new(handler));
    }

    /// Hand the event sender to the backend and begin recognition.
    ///
    /// Fails if called twice or if the backend refuses to start.
    pub async fn start(&mut self) -> Result<(), RecognizerError> {
        let events_tx = self.events_tx.take().ok_or_else(|| {
            RecognizerError::StartFailed("session already started".to_string())
        })?;
        self.backend.set_event_sender(events_tx);
        self.backend.start_continuous().await?;
        Ok(())
    }

    /// Pump audio, events and commands until the session ends.
    ///
    /// Stop commands take priority over queued events, and events over audio,
    /// so a requested stop is honored deterministically. Backend feed errors
    /// are logged and the stream continues; they are not fatal to the
    /// session.
    pub async fn run(self) -> SessionEnd {
        let Self {
            backend,
            mut audio,
            mut handlers,
            events_tx,
            mut events_rx,
            commands_tx,
            mut commands_rx,
        } = self;

        if events_tx.is_some() {
            tracing::warn!("session run without start; no events will arrive");
        }
        drop(events_tx);
        // Keep the command channel open even if every handle is dropped.
        let _commands_tx = commands_tx;

        let mut audio_done = false;
        loop {
            tokio::select! {
                biased;

                Some(command) = commands_rx.recv() => match command {
                    SessionCommand::Stop => {
                        if let Err(e) = backend.stop_continuous().await {
                            tracing::warn!(backend = backend.name(), "stop failed: {e}");
                        }
                        return SessionEnd::StopRequested;
                    }
                },

                event = events_rx.recv() => match event {
                    Some(event) => dispatch(&mut handlers, event),
                    None => return SessionEnd::EventsExhausted,
                },

                chunk = audio.next_chunk(), if !audio_done => match chunk {
                    Some(chunk) => {
                        if let Err(e) = backend.feed_audio(chunk).await {
                            tracing::error!(backend = backend.name(), "feed error: {e}");
                        }
                    }
                    None => {
                        audio_done = true;
                        if let Err(e) = backend.end_of_audio().await {
                            tracing::error!(
                                backend = backend.name(),
                                "end of audio signaling failed: {e}"
                            );
                        }
                    }
                },
            }
        }
    }
}

fn dispatch(handlers: &mut Handlers, event: RecognitionEvent) {
    tracing::trace!(kind = event.kind(), session_id = event.session_id(), "event");
    match event {
        RecognitionEvent::Recognizing(e) => {
            if let Some(handler) = handlers.recognizing.as_mut() {
                handler(&e);
            }
        }
        RecognitionEvent::Recognized(e) => {
            if let Some(handler) = handlers.recognized.as_mut() {
                handler(&e);
            }
        }
        RecognitionEvent::Canceled(e) => {
            if let Some(handler) = handlers.canceled.as_mut() {
                handler(&e);
            }
        }
        RecognitionEvent::SessionStarted(e) => {
            if let Some(handler) = handlers.session_started.as_mut() {
                handler(&e);
            }
        }
        RecognitionEvent::SessionStopped(e) => {
            if let Some(handler) = handlers.session_stopped.as_mut() {
                handler(&e);
            }
        }
        RecognitionEvent::SpeechStartDetected(e) => {
            if let Some(handler) = handlers.speech_start_detected.as_mut() {
                handler(&e);
            }
        }
        RecognitionEvent::SpeechEndDetected(e) => {
            if let Some(handler) = handlers.speech_end_detected.as_mut() {
                handler(&e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null_backend::NullBackend;
    use std::time::Duration;
    use voxstream_audio::push_stream;

    #[tokio::test]
    async fn test_session_stop_request_wins_over_queued_events() {
        let (_writer, reader) = push_stream();
        let mut session = RecognitionSession::new(Box::new(NullBackend::new()), reader);
        let handle = session.handle();

        session.start().await.unwrap();
        // SessionStarted is already queued, but the stop must win.
        handle.request_stop();

        let end = tokio::time::timeout(Duration::from_secs(2), session.run())
            .await
            .expect("timed out");
        assert_eq!(end, SessionEnd::StopRequested);
    }

    #[tokio::test]
    async fn test_session_run_without_start_ends_immediately() {
        let (writer, reader) = push_stream();
        writer.close();
        let session = RecognitionSession::new(Box::new(NullBackend::new()), reader);

        let end = tokio::time::timeout(Duration::from_secs(2), session.run())
            .await
            .expect("timed out");
        assert_eq!(end, SessionEnd::EventsExhausted);
    }

    #[tokio::test]
    async fn test_session_start_twice_fails() {
        let (_writer, reader) = push_stream();
        let mut session = RecognitionSession::new(Box::new(NullBackend::new()), reader);

        session.start().await.unwrap();
        let result = session.start().await;
        assert!(matches!(result, Err(RecognizerError::StartFailed(_))));
    }

    #[tokio::test]
    async fn test_session_handle_clone_requests_stop() {
        let (_writer, reader) = push_stream();
        let mut session = RecognitionSession::new(Box::new(NullBackend::new()), reader);
        let handle = session.handle().clone();

        session.start().await.unwrap();
        handle.request_stop();

        let end = tokio::time::timeout(Duration::from_secs(2), session.run())
            .await
            .expect("timed out");
        assert_eq!(end, SessionEnd::StopRequested);
    }
}
