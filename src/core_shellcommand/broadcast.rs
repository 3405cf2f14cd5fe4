use crate::core_network::error::FrameError;
use crate::core_shellcommand::stats::ADMIN_ONLY;
use crate::server::{Flow, ServerState};
use crate::session::SessionId;
use log::{info, warn};

/// Handles `broadcast <msg>` (admin only).
///
/// Every authenticated session receives the message, the sender included.
/// A recipient that cannot be written to is skipped; its own connection loop
/// notices the broken socket on its next read. A write failure towards the
/// sender is returned once every other recipient has been served.
pub async fn handle_broadcast_command(
    state: &mut ServerState,
    id: SessionId,
    msg: &str,
) -> Result<Flow, FrameError> {
    let (is_admin, sender) = match state.sessions.get(id) {
        Some(session) => (session.is_admin(), session.username.clone()),
        None => return Ok(Flow::Close),
    };
    if !is_admin {
        warn!("Session {} denied broadcast: admin only", id);
        state.reply(id, ADMIN_ONLY.as_bytes()).await?;
        return Ok(Flow::Continue);
    }

    let full = format!("[BROADCAST from {}]: {}\n", sender, msg);
    let mut delivered = 0;
    let mut sender_error = None;
    for session in state.sessions.authenticated_mut() {
        match session.send(full.as_bytes()).await {
            Ok(()) => delivered += 1,
            Err(e) if session.id == id => sender_error = Some(e),
            Err(e) => warn!("Broadcast to {} failed: {}", session.label(), e),
        }
    }
    info!("Broadcast from {} delivered to {} session(s)", sender, delivered);

    // The sender's own connection is broken: end its session
    if let Some(e) = sender_error {
        return Err(e);
    }

    state.record(id, "broadcast", full.len());
    state.count_execution(id);
    Ok(Flow::Continue)
}
