use crate::core_network::codec::read_raw;
use crate::core_network::error::FrameError;
use crate::core_shellcommand::error::TransferError;
use crate::helpers::resolve_path;
use crate::server::{Flow, ServerState};
use crate::session::SessionId;
use log::{error, info, warn};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Parses the `<path> <size>` part of an `UPLOAD` header.
pub fn parse_upload_header(args: &str, max_file_size: u64) -> Result<(&str, usize), TransferError> {
    let mut parts = args.split_whitespace();
    let path = parts.next().ok_or(TransferError::InvalidHeader)?;
    let size: i64 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(TransferError::InvalidHeader)?;

    if size < 0 || size as u64 > max_file_size {
        return Err(TransferError::InvalidSize);
    }
    Ok((path, size as usize))
}

/// Writes the received payload to `target`, replacing any existing file.
pub async fn store_file(target: &Path, data: &[u8]) -> Result<(), TransferError> {
    let mut file = File::create(target).await.map_err(|e| {
        error!("Failed to create file: {:?}, error: {}", target, e);
        TransferError::CannotCreate
    })?;

    file.write_all(data).await.map_err(|e| {
        error!("Error writing to file {:?}: {}", target, e);
        TransferError::WriteError
    })?;
    file.flush().await.map_err(|_| TransferError::WriteError)?;
    Ok(())
}

/// Handles `UPLOAD <path> <size>` followed by `<size>` raw bytes.
///
/// Header and size are validated before any payload byte is read. Since the
/// client streams the payload right behind the header, a rejected header
/// leaves the connection out of sync and the session is closed after the
/// error reply.
pub async fn handle_upload_command<R>(
    state: &mut ServerState,
    id: SessionId,
    args: &str,
    reader: &mut R,
) -> Result<Flow, FrameError>
where
    R: AsyncRead + Unpin + Send + ?Sized,
{
    let max_file_size = state.config.limits.max_file_size;
    let (path, size) = match parse_upload_header(args, max_file_size) {
        Ok(header) => header,
        Err(e) => {
            warn!("Rejected UPLOAD header '{}' from session {}: {}", args, id, e);
            state.reply(id, e.to_upload_reply().as_bytes()).await?;
            return Ok(after_upload_error(e));
        }
    };

    let mut buffer = Vec::new();
    if buffer.try_reserve_exact(size).is_err() {
        let e = TransferError::AllocationFailed;
        error!("Cannot buffer {} bytes for session {}", size, id);
        state.reply(id, e.to_upload_reply().as_bytes()).await?;
        return Ok(after_upload_error(e));
    }
    buffer.resize(size, 0);

    if let Err(e) = read_raw(reader, &mut buffer).await {
        warn!("Upload from session {} interrupted: {}", id, e);
        let reply = TransferError::ConnectionLost.to_upload_reply();
        let _ = state.reply(id, reply.as_bytes()).await;
        return Err(e);
    }

    let working_directory = match state.sessions.get(id) {
        Some(session) => session.working_directory.clone(),
        None => return Ok(Flow::Close),
    };
    let target = resolve_path(&working_directory, path);

    match store_file(&target, &buffer).await {
        Ok(()) => {
            let msg = format!("UPLOAD_OK: wrote {} bytes to {}\n", size, path);
            state.reply(id, msg.as_bytes()).await?;
            info!("Stored {} bytes at {:?} for session {}", size, target, id);
            state.record(id, "UPLOAD", size);
            state.count_execution(id);
        }
        Err(e) => {
            state.reply(id, e.to_upload_reply().as_bytes()).await?;
            return Ok(after_upload_error(e));
        }
    }
    Ok(Flow::Continue)
}

fn after_upload_error(e: TransferError) -> Flow {
    if e.ends_upload_session() {
        Flow::Close
    } else {
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 10 * 1024 * 1024;

    #[test]
    fn test_parse_valid_header() {
        assert_eq!(parse_upload_header("notes.txt 42", MAX), Ok(("notes.txt", 42)));
        assert_eq!(parse_upload_header("empty 0", MAX), Ok(("empty", 0)));
        assert_eq!(
            parse_upload_header("big.bin 10485760", MAX),
            Ok(("big.bin", 10 * 1024 * 1024))
        );
    }

    #[test]
    fn test_parse_rejects_bad_size() {
        assert_eq!(parse_upload_header("a -1", MAX), Err(TransferError::InvalidSize));
        assert_eq!(
            parse_upload_header("a 10485761", MAX),
            Err(TransferError::InvalidSize)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_header() {
        assert_eq!(parse_upload_header("", MAX), Err(TransferError::InvalidHeader));
        assert_eq!(parse_upload_header("a.txt", MAX), Err(TransferError::InvalidHeader));
        assert_eq!(parse_upload_header("a.txt ten", MAX), Err(TransferError::InvalidHeader));
    }

    #[tokio::test]
    async fn test_store_file_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("x.bin");
        assert_eq!(
            store_file(&target, b"data").await,
            Err(TransferError::CannotCreate)
        );
    }
}
