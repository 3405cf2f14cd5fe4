use crate::core_auth::AuthStage;
use crate::core_network::error::FrameError;
use crate::server::{Flow, ServerState};
use crate::session::SessionId;
use log::info;

const BYE: &str = "Bye.\n";

/// Handles `exit`: says goodbye and ends the session.
pub async fn handle_exit_command(state: &mut ServerState, id: SessionId) -> Result<Flow, FrameError> {
    info!("Received exit from session {}", id);
    state.reply(id, BYE.as_bytes()).await?;
    state.record(id, "exit", BYE.len());

    if let Some(session) = state.sessions.get_mut(id) {
        session.auth_stage = AuthStage::Terminated;
    }
    Ok(Flow::Close)
}
