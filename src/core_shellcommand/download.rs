use crate::core_network::codec::write_raw;
use crate::core_network::error::FrameError;
use crate::core_shellcommand::error::TransferError;
use crate::helpers::resolve_path;
use crate::server::{Flow, ServerState};
use crate::session::SessionId;
use log::{error, info, warn};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Reads a whole regular file of at most `max_file_size` bytes.
pub async fn load_file(target: &Path, max_file_size: u64) -> Result<Vec<u8>, TransferError> {
    let mut file = File::open(target).await.map_err(|e| {
        warn!("File not found or could not be opened: {:?}, error: {}", target, e);
        TransferError::CannotOpen
    })?;

    let metadata = file.metadata().await.map_err(|_| TransferError::CannotOpen)?;
    if !metadata.is_file() {
        return Err(TransferError::CannotOpen);
    }
    let size = metadata.len();
    if size > max_file_size {
        return Err(TransferError::InvalidSize);
    }

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size as usize)
        .map_err(|_| TransferError::AllocationFailed)?;
    let read = file.read_to_end(&mut buffer).await.map_err(|e| {
        error!("Error reading file {:?}: {}", target, e);
        TransferError::ReadError
    })?;
    if read as u64 != size {
        return Err(TransferError::ReadError);
    }
    Ok(buffer)
}

/// Handles `DOWNLOAD <path>`: a `DOWNLOAD_OK <size>` frame followed by the
/// raw file bytes, or a single `DOWNLOAD_ERR` frame.
pub async fn handle_download_command(
    state: &mut ServerState,
    id: SessionId,
    args: &str,
) -> Result<Flow, FrameError> {
    let max_file_size = state.config.limits.max_file_size;
    let Some(path) = args.split_whitespace().next() else {
        state
            .reply(id, TransferError::InvalidHeader.to_download_reply().as_bytes())
            .await?;
        return Ok(Flow::Continue);
    };

    let Some(session) = state.sessions.get_mut(id) else {
        return Ok(Flow::Close);
    };
    let target = resolve_path(&session.working_directory, path);

    let data = match load_file(&target, max_file_size).await {
        Ok(data) => data,
        Err(e) => {
            session.send(e.to_download_reply().as_bytes()).await?;
            return Ok(Flow::Continue);
        }
    };

    let header = format!("DOWNLOAD_OK {}", data.len());
    session.send(header.as_bytes()).await?;
    write_raw(&mut session.writer, &data).await?;
    info!("Sent {} bytes of {:?} to {}", data.len(), target, session.label());

    state.record(id, "DOWNLOAD", data.len());
    state.count_execution(id);
    Ok(Flow::Continue)
}
