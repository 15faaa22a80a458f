use std::io::ErrorKind;

use pruls_storage::ObjectSink;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::UploadError;

/// Bytes moved per transfer step.
pub const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub bytes: u64,
    pub chunks: u64,
}

/// Copy everything from `reader` into `sink`, then finish the sink.
///
/// Each read fills at most one [`CHUNK_SIZE`] buffer and whatever was read,
/// including a short final read, is written before the next read. A read of
/// zero bytes ends the input. The first read, write or finish error aborts the
/// copy; the sink is dropped unfinished in that case.
pub async fn upload_chunks<R>(
    reader: &mut R,
    mut sink: Box<dyn ObjectSink>,
) -> Result<UploadStats, UploadError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut stats = UploadStats::default();

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(UploadError::Read(e)),
        };

        sink.write(&buf[..n])
            .await
            .map_err(|source| UploadError::Write {
                chunk: stats.chunks,
                source,
            })?;

        stats.chunks += 1;
        stats.bytes += n as u64;
    }

    sink.finish().await.map_err(UploadError::Finalize)?;

    tracing::debug!(
        size_bytes = stats.bytes,
        chunks = stats.chunks,
        "Chunked upload finished"
    );

    Ok(stats)
}
