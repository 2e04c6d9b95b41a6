use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open audio file {path}: {source}")]
    FileOpen {
        path: String,
        source: std::io::Error,
    },

    #[error("push stream closed")]
    StreamClosed,
}

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("recognizer initialization failed: {0}")]
    InitializationFailed(String),

    #[error("recognition start failed: {0}")]
    StartFailed(String),

    #[error("recognizer backend not found: {0}")]
    BackendNotFound(String),
}
