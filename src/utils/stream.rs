// Stream draining

use futures::{Stream, StreamExt};
use tracing::trace;

#[derive(Debug, thiserror::Error)]
pub enum DrainError {
    #[error("stream failed before completion")]
    Stream {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Consume a chunked byte stream into one string.
///
/// Chunks are concatenated in delivery order and empty chunks are skipped.
/// Decoding happens once at the end, so a multi-byte character split across
/// two chunks survives; invalid UTF-8 is replaced rather than rejected. The
/// first stream error aborts the drain and is kept as the error's source.
pub async fn drain_to_string<S, B, E>(stream: S) -> Result<String, DrainError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    futures::pin_mut!(stream);

    let mut buffer = Vec::new();
    let mut chunks = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DrainError::Stream { source: e.into() })?;
        let chunk = chunk.as_ref();
        if chunk.is_empty() {
            continue;
        }
        buffer.extend_from_slice(chunk);
        chunks += 1;
    }

    trace!(chunks, bytes = buffer.len(), "stream drained");
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
