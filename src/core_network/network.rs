use crate::constants::MAX_FRAME_LEN;
use crate::core_network::codec::read_frame;
use crate::core_network::error::FrameError;
use crate::server::{Flow, SharedState};
use crate::session::SessionId;
use anyhow::Result;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::net::TcpListener;

/// Accept loop. Each admitted connection gets its own task; frame handling is
/// serialized through the shared state lock.
pub async fn start_server(listener: TcpListener, state: SharedState) -> Result<()> {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        debug!("Accepted connection from {:?}", addr);

        let (reader, writer) = socket.into_split();
        let opened = {
            let mut state = state.lock().await;
            state.open_session(addr, Box::new(writer)).await
        };
        let Some(id) = opened else {
            // Dropping the read half closes the socket
            continue;
        };

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            match handle_connection(reader, id, state).await {
                Ok(()) => info!("Session {} ended", id),
                Err(FrameError::ConnectionClosed) => info!("Client {} disconnected", id),
                Err(e) => warn!("Connection error on session {}: {}", id, e),
            }
        });
    }
}

/// Reads frames for one session until it ends, then drops it from the table.
pub async fn handle_connection<R>(mut reader: R, id: SessionId, state: SharedState) -> Result<(), FrameError>
where
    R: AsyncRead + Unpin + Send,
{
    let result = loop {
        let frame = match read_frame(&mut reader, MAX_FRAME_LEN).await {
            Ok(frame) => frame,
            Err(e) => break Err(e),
        };

        let flow = {
            let mut state = state.lock().await;
            state.handle_frame(id, &frame, &mut reader).await
        };

        match flow {
            Ok(Flow::Continue) => {}
            Ok(Flow::Close) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    state.lock().await.close_session(id);
    result
}
