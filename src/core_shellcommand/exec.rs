use crate::core_network::error::FrameError;
use crate::core_shellcommand::filter::is_dangerous_for_user;
use crate::helpers::os_error_text;
use crate::server::{Flow, ServerState};
use crate::session::SessionId;
use log::{debug, info, warn};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

const BLOCKED: &str = "Permission denied: dangerous command blocked for this user.\n";

/// Runs `command` through `sh -c` in `cwd` and returns at most `max_output`
/// bytes of its combined stdout/stderr.
///
/// Once the cap is reached the pipe is closed, so a child that keeps writing
/// gets `EPIPE`/`SIGPIPE` instead of blocking on a full pipe.
pub async fn run_shell_command(command: &str, cwd: &str, max_output: usize) -> std::io::Result<Vec<u8>> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(format!("exec 2>&1\n{}", command))
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    let mut stdout = child.stdout.take().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "child stdout was not captured")
    })?;

    let mut output = Vec::new();
    (&mut stdout)
        .take(max_output as u64)
        .read_to_end(&mut output)
        .await?;
    if output.len() == max_output {
        debug!("Output of '{}' reached the {} byte cap", command, max_output);
    }
    drop(stdout);

    let status = child.wait().await?;
    debug!("'{}' exited with {}", command, status);
    Ok(output)
}

/// Handles any command line that is not a built-in.
pub async fn handle_exec_command(
    state: &mut ServerState,
    id: SessionId,
    command: &str,
) -> Result<Flow, FrameError> {
    let max_output = state.config.limits.max_output_size;
    let Some(session) = state.sessions.get_mut(id) else {
        return Ok(Flow::Close);
    };

    if !session.is_admin() && is_dangerous_for_user(command) {
        warn!("Blocked '{}' from {}", command, session.label());
        session.send(BLOCKED.as_bytes()).await?;
        state.record(id, "BLOCKED_CMD", 0);
        return Ok(Flow::Continue);
    }

    let cwd = session.working_directory.clone();
    match tokio::fs::metadata(&cwd).await {
        Ok(meta) if meta.is_dir() => {}
        outcome => {
            let reason = match outcome {
                Err(e) => os_error_text(&e),
                Ok(_) => "Not a directory".to_string(),
            };
            let out = format!("Failed to chdir to {}: {}\n", cwd, reason);
            session.send(out.as_bytes()).await?;
            state.record(id, command, out.len());
            return Ok(Flow::Continue);
        }
    }

    info!("{} runs '{}' in {}", session.label(), command, cwd);
    let output = match run_shell_command(command, &cwd, max_output).await {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run '{}': {}", command, e);
            format!("Failed to run command: {}\n", os_error_text(&e)).into_bytes()
        }
    };

    session.send(&output).await?;
    state.record(id, command, output.len());
    state.count_execution(id);
    Ok(Flow::Continue)
}
