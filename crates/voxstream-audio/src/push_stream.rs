use tokio::sync::mpsc;
use voxstream_core::AudioError;

/// Create a push audio stream, split into a writer half and a reader half.
///
/// Chunks are delivered to the reader in write order. The stream is unbounded:
/// a producer never blocks, matching a local file being read faster than the
/// recognizer consumes it.
pub fn push_stream() -> (PushAudioWriter, PushAudioReader) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PushAudioWriter { tx }, PushAudioReader { rx })
}

/// Producer half of a push audio stream.
#[derive(Debug)]
pub struct PushAudioWriter {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl PushAudioWriter {
    /// Append one chunk to the stream.
    ///
    /// Fails with [`AudioError::StreamClosed`] once the reader has been
    /// dropped.
    pub fn write(&self, chunk: Vec<u8>) -> Result<(), AudioError> {
        self.tx.send(chunk).map_err(|_| AudioError::StreamClosed)
    }

    /// Mark the stream complete. Chunks already written remain readable.
    pub fn close(self) {
        // Dropping the sender closes the channel.
    }
}

/// Consumer half of a push audio stream.
#[derive(Debug)]
pub struct PushAudioReader {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl PushAudioReader {
    /// Next chunk in write order, or `None` once the stream is closed and
    /// fully drained.
    pub async fn next_chunk(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }
}
