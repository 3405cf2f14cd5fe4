use crate::core_network::error::FrameError;
use crate::server::{Flow, ServerState};
use crate::session::SessionId;
use log::warn;

pub const ADMIN_ONLY: &str = "Permission denied: admin only.\n";

pub fn build_stats(state: &ServerState) -> String {
    format!(
        "Server stats:\n  Active clients: {}\n  Total commands executed: {}\n",
        state.sessions.authenticated_count(),
        state.commands_executed
    )
}

pub async fn handle_stats_command(state: &mut ServerState, id: SessionId) -> Result<Flow, FrameError> {
    let is_admin = state.sessions.get(id).map(|s| s.is_admin()).unwrap_or(false);
    if !is_admin {
        warn!("Session {} denied stats: admin only", id);
        state.reply(id, ADMIN_ONLY.as_bytes()).await?;
        return Ok(Flow::Continue);
    }

    let out = build_stats(state);
    state.reply(id, out.as_bytes()).await?;
    state.record(id, "stats", out.len());
    Ok(Flow::Continue)
}
