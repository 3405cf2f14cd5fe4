//! Length-prefixed framing for the control channel.
//!
//! Wire format: `[4-byte big-endian length][payload]`. File payloads of the
//! upload/download sub-protocol travel between frames as raw byte spans whose
//! length was announced by the preceding control frame.

use crate::core_network::error::FrameError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Writes one frame. Payloads of `max_len` bytes or more are refused.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], max_len: usize) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    if payload.len() >= max_len {
        return Err(FrameError::TooLarge {
            len: payload.len(),
            max: max_len,
        });
    }

    let len = payload.len() as u32;
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame. A length prefix of `max_len` or more is a protocol violation.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Vec<u8>, FrameError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut prefix = [0u8; 4];
    reader
        .read_exact(&mut prefix)
        .await
        .map_err(FrameError::from_read)?;

    let len = u32::from_be_bytes(prefix) as usize;
    if len >= max_len {
        return Err(FrameError::TooLarge { len, max: max_len });
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(FrameError::from_read)?;
    Ok(payload)
}

/// Fills `buffer` with exactly `buffer.len()` unframed bytes.
pub async fn read_raw<R>(reader: &mut R, buffer: &mut [u8]) -> Result<(), FrameError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    reader
        .read_exact(buffer)
        .await
        .map_err(FrameError::from_read)?;
    Ok(())
}

/// Writes `bytes` unframed.
pub async fn write_raw<W>(writer: &mut W, bytes: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}
