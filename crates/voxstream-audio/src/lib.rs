pub mod file_source;
pub mod push_stream;

pub use file_source::{open_push_stream, READ_CHUNK_BYTES};
pub use push_stream::{push_stream, PushAudioReader, PushAudioWriter};
