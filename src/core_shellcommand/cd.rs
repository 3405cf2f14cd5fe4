use crate::core_network::error::FrameError;
use crate::helpers::{os_error_text, resolve_path};
use crate::server::{Flow, ServerState};
use crate::session::SessionId;
use log::{debug, warn};
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Resolves `target` to a canonical directory the server can enter.
///
/// Fails like `chdir` would: missing paths, non-directories and directories
/// without search permission are rejected.
pub async fn change_directory(target: &Path) -> io::Result<String> {
    let canonical = tokio::fs::canonicalize(target).await?;
    let metadata = tokio::fs::metadata(&canonical).await?;
    if !metadata.is_dir() {
        return Err(io::Error::from_raw_os_error(libc::ENOTDIR));
    }
    check_searchable(&canonical)?;
    Ok(canonical.to_string_lossy().into_owned())
}

fn check_searchable(dir: &Path) -> io::Result<()> {
    let c_path = CString::new(dir.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"))?;
    // `c_path` stays alive for the duration of the call
    let rc = unsafe { libc::access(c_path.as_ptr(), libc::X_OK) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Handles `cd <dir>`. The working directory only changes on success.
pub async fn handle_cd_command(
    state: &mut ServerState,
    id: SessionId,
    command: &str,
    dir: &str,
) -> Result<Flow, FrameError> {
    let Some(session) = state.sessions.get_mut(id) else {
        return Ok(Flow::Close);
    };

    let target = resolve_path(&session.working_directory, dir);
    let msg = match change_directory(&target).await {
        Ok(new_dir) => {
            debug!("{} changed directory to {}", session.label(), new_dir);
            session.working_directory = new_dir;
            format!("Current directory: {}\n", session.working_directory)
        }
        Err(e) => {
            warn!("{} failed to cd to {:?}: {}", session.label(), target, e);
            format!("cd: {}: {}\n", dir, os_error_text(&e))
        }
    };

    session.send(msg.as_bytes()).await?;
    state.record(id, command, msg.len());
    Ok(Flow::Continue)
}
