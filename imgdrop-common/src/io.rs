//! Chunked stream copy shared by both roles
//!
//! The receiver drains a socket into the artifact file and the sender pushes
//! a source file into a socket. Both are the same operation: read a bounded
//! chunk, write it, repeat until end-of-stream.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::BUFFER_SIZE;

/// Copy every byte from `reader` into `writer`, in order, then flush
///
/// Reads `BUFFER_SIZE` chunks until the reader reports end-of-stream (a read
/// of zero bytes). Returns the number of bytes copied; an empty reader copies
/// nothing and still flushes.
pub async fn copy_stream<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let count = match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..count]).await?;
        total += count as u64;
    }

    writer.flush().await?;
    Ok(total)
}
