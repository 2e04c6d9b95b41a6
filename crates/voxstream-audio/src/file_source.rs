use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use voxstream_core::AudioError;

use crate::push_stream::{push_stream, PushAudioReader, PushAudioWriter};

/// Bytes read from the file per push-stream chunk.
pub const READ_CHUNK_BYTES: usize = 4096;

/// Open `path` and republish its bytes as a push audio stream.
///
/// The file is opened before returning, so a missing or unreadable path fails
/// here. Reading happens on a spawned task: the returned reader yields chunks
/// as they come off disk and `None` once the file is exhausted. A zero-byte
/// file produces a stream that closes without yielding any chunk.
///
/// Must be called from within a tokio runtime.
pub async fn open_push_stream(path: &Path) -> Result<PushAudioReader, AudioError> {
    let file = File::open(path).await.map_err(|source| AudioError::FileOpen {
        path: path.display().to_string(),
        source,
    })?;
    let (writer, reader) = push_stream();
    tokio::spawn(feed_from_file(file, writer, path.to_path_buf()));
    Ok(reader)
}

async fn feed_from_file(mut file: File, writer: PushAudioWriter, path: PathBuf) {
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    loop {
        match file.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if writer.write(buf[..n].to_vec()).is_err() {
                    tracing::debug!(path = %path.display(), "push stream reader gone, stopping feed");
                    return;
                }
            }
            Err(e) => {
                // A mid-stream read error ends the audio early; the stream
                // still closes so the consumer reaches its terminal state.
                tracing::error!(path = %path.display(), "audio read error: {e}");
                break;
            }
        }
    }
    writer.close();
    tracing::trace!(path = %path.display(), "audio file exhausted, push stream closed");
}
