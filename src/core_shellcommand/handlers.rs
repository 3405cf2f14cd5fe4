use crate::core_network::error::FrameError;
use crate::core_quota::RateDecision;
use crate::core_shellcommand::shellcommand::ShellCommand;
use crate::core_shellcommand::{broadcast, cd, download, exec, exit, help, stats, upload, who};
use crate::helpers::trim_end;
use crate::server::{Flow, ServerState};
use crate::session::SessionId;
use log::{debug, warn};
use std::time::Instant;
use tokio::io::AsyncRead;

/// Routes one frame from an authenticated session.
///
/// Order matters: empty lines are answered with an empty frame before the
/// rate limiter sees them, and the rate limiter runs ahead of every built-in,
/// `exit` included.
pub async fn dispatch_command<R>(
    state: &mut ServerState,
    id: SessionId,
    input: &[u8],
    reader: &mut R,
) -> Result<Flow, FrameError>
where
    R: AsyncRead + Unpin + Send + ?Sized,
{
    let text = String::from_utf8_lossy(input);
    let command = trim_end(&text);

    if command.is_empty() {
        state.reply(id, b"").await?;
        return Ok(Flow::Continue);
    }

    if !check_rate_limit(state, id).await? {
        return Ok(Flow::Continue);
    }

    debug!("Session {} command: {}", id, command);
    match ShellCommand::parse(command) {
        ShellCommand::Exit => exit::handle_exit_command(state, id).await,
        ShellCommand::Help => help::handle_help_command(state, id).await,
        ShellCommand::Who => who::handle_who_command(state, id).await,
        ShellCommand::Stats => stats::handle_stats_command(state, id).await,
        ShellCommand::Broadcast(msg) => broadcast::handle_broadcast_command(state, id, msg).await,
        ShellCommand::Upload(args) => upload::handle_upload_command(state, id, args, reader).await,
        ShellCommand::Download(args) => download::handle_download_command(state, id, args).await,
        ShellCommand::Cd(dir) => cd::handle_cd_command(state, id, command, dir).await,
        ShellCommand::Exec(cmd) => exec::handle_exec_command(state, id, cmd).await,
    }
}

/// Returns `false` (after warning the client) when the command must be dropped.
async fn check_rate_limit(state: &mut ServerState, id: SessionId) -> Result<bool, FrameError> {
    let limiter = state.rate_limiter;
    let Some(session) = state.sessions.get_mut(id) else {
        return Ok(false);
    };

    match limiter.check(&mut session.rate_window, Instant::now()) {
        RateDecision::Allowed => Ok(true),
        RateDecision::Limited { wait_secs } => {
            warn!("Rate limit hit by {}", session.label());
            session.send(limiter.limit_message(wait_secs).as_bytes()).await?;
            state.record(id, "RATE_LIMIT", 0);
            Ok(false)
        }
    }
}
