pub mod azure;
pub mod backend;
pub mod null_backend;
pub mod registry;
pub mod session;

pub use azure::AzureSpeechBackend;
pub use backend::SpeechBackend;
pub use null_backend::NullBackend;
pub use registry::BackendRegistry;
pub use session::{RecognitionSession, SessionEnd, SessionHandle};
