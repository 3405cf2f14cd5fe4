use crate::core_network::error::FrameError;
use crate::server::{Flow, ServerState};
use crate::session::{SessionId, SessionTable};
use log::info;

/// One line per authenticated session, in accept order. Sessions still
/// logging in are not listed.
pub fn build_who(sessions: &SessionTable) -> String {
    let mut out = String::from("Connected clients:\n");
    for session in sessions.authenticated() {
        let role = session.role.map(|r| r.as_str()).unwrap_or("?");
        out.push_str(&format!(
            "  {} (role={}) @ {}:{}, cmds={}\n",
            session.username, role, session.peer_address, session.peer_port, session.commands_executed
        ));
    }
    out
}

pub async fn handle_who_command(state: &mut ServerState, id: SessionId) -> Result<Flow, FrameError> {
    info!("Handling who for session {}", id);
    let listing = build_who(&state.sessions);
    state.reply(id, listing.as_bytes()).await?;
    state.record(id, "who", listing.len());
    Ok(Flow::Continue)
}
