pub mod error;
pub mod event;
pub mod settings;

pub use error::{AudioError, RecognizerError};
pub use event::{
    CanceledEvent, CancellationReason, NoMatchReason, RecognitionEvent, RecognizedEvent,
    RecognizedResult, RecognizingEvent, SessionEvent,
};
pub use settings::SpeechSettings;
