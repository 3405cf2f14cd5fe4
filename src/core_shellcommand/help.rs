use crate::core_network::error::FrameError;
use crate::server::{Flow, ServerState};
use crate::session::SessionId;

pub const HELP_MESSAGE: &str = concat!(
    "Available internal commands:\n",
    "  help                       - show this help\n",
    "  who                        - list connected users\n",
    "  stats                      - show server stats (admin only)\n",
    "  cd <dir>                   - change directory\n",
    "  broadcast <msg>            - broadcast message (admin only)\n",
    "  upload <local> <remote>    - client-side, sends file to server\n",
    "  download <remote> <local>  - client-side, gets file from server\n",
    "  exit                       - disconnect\n",
    "Other text is executed as shell command on server.\n",
);

pub async fn handle_help_command(state: &mut ServerState, id: SessionId) -> Result<Flow, FrameError> {
    state.reply(id, HELP_MESSAGE.as_bytes()).await?;
    state.record(id, "help", HELP_MESSAGE.len());
    Ok(Flow::Continue)
}
