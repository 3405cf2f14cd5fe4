use crate::config::Config;
use crate::constants::USERNAME_PROMPT;
use crate::core_auth::state_machine::advance;
use crate::core_auth::{AuthStage, AuthStep, CredentialStore};
use crate::core_log::AuditLog;
use crate::core_network::error::FrameError;
use crate::core_network::network;
use crate::core_quota::RateLimiter;
use crate::core_shellcommand::handlers::dispatch_command;
use crate::helpers::log_config;
use crate::session::{SessionId, SessionTable, SessionWriter};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncRead;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// What the connection loop does after a frame has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Everything sessions share. Guarded by a single lock, so frames are
/// processed one at a time across all connections.
#[derive(Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub sessions: SessionTable,
    pub credentials: CredentialStore,
    pub audit: AuditLog,
    pub rate_limiter: RateLimiter,
    pub home_dir: String,
    pub commands_executed: u64,
}

pub type SharedState = Arc<Mutex<ServerState>>;

impl ServerState {
    pub fn new(config: Config, home_dir: String, audit: AuditLog) -> Self {
        let credentials = CredentialStore::from_entries(&config.users);
        if credentials.is_empty() {
            warn!("No usable accounts configured, every login will fail");
        } else {
            debug!("Loaded {} account(s)", credentials.len());
        }
        let rate_limiter =
            RateLimiter::new(config.limits.rate_max_commands, config.limits.rate_window_secs);
        Self {
            sessions: SessionTable::new(config.server.max_sessions),
            credentials,
            audit,
            rate_limiter,
            home_dir,
            commands_executed: 0,
            config: Arc::new(config),
        }
    }

    /// Registers a freshly accepted connection and sends the username prompt.
    ///
    /// Returns `None` if the table is full or the prompt could not be sent.
    pub async fn open_session(&mut self, peer: SocketAddr, writer: SessionWriter) -> Option<SessionId> {
        let id = match self
            .sessions
            .insert(peer, self.home_dir.clone(), writer, Instant::now())
        {
            Some(id) => id,
            None => {
                warn!("Too many clients, rejecting {}", peer);
                return None;
            }
        };
        info!("New connection {} from {}", id, peer);

        if let Err(e) = self.reply(id, USERNAME_PROMPT.as_bytes()).await {
            error!("Failed to send username prompt to {}: {}", peer, e);
            self.close_session(id);
            return None;
        }
        Some(id)
    }

    /// Feeds one inbound frame to the session's auth state machine or dispatcher.
    pub async fn handle_frame<R>(
        &mut self,
        id: SessionId,
        frame: &[u8],
        reader: &mut R,
    ) -> Result<Flow, FrameError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let stage = match self.sessions.get(id) {
            Some(session) => session.auth_stage,
            None => return Ok(Flow::Close),
        };

        match stage {
            AuthStage::AwaitingUsername | AuthStage::AwaitingPassword => {
                self.handle_login_frame(id, frame).await
            }
            AuthStage::Authenticated => dispatch_command(self, id, frame, reader).await,
            AuthStage::Terminated => Ok(Flow::Close),
        }
    }

    async fn handle_login_frame(&mut self, id: SessionId, frame: &[u8]) -> Result<Flow, FrameError> {
        let Some(session) = self.sessions.get_mut(id) else {
            return Ok(Flow::Close);
        };
        let Some(step) = advance(session, frame, &self.credentials) else {
            return Ok(Flow::Close);
        };
        let reply = step.reply(session);
        session.send(reply.as_bytes()).await?;

        match step {
            AuthStep::LoggedIn(_) => self.record(id, "LOGIN", reply.len()),
            AuthStep::Locked => self.record(id, "AUTH_FAIL", 0),
            AuthStep::AskPassword | AuthStep::Retry => {}
        }

        if step.terminates() {
            Ok(Flow::Close)
        } else {
            Ok(Flow::Continue)
        }
    }

    /// Sends one frame to a session. A missing session is not an error.
    pub async fn reply(&mut self, id: SessionId, payload: &[u8]) -> Result<(), FrameError> {
        match self.sessions.get_mut(id) {
            Some(session) => session.send(payload).await,
            None => Ok(()),
        }
    }

    /// Appends an audit line for the session.
    pub fn record(&mut self, id: SessionId, command: &str, bytes_out: usize) {
        if let Some(session) = self.sessions.get(id) {
            self.audit.record(session, command, bytes_out);
        }
    }

    /// Bumps the per-session and global executed-command counters.
    pub fn count_execution(&mut self, id: SessionId) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.commands_executed += 1;
            self.commands_executed += 1;
        }
    }

    pub fn close_session(&mut self, id: SessionId) {
        if let Some(session) = self.sessions.remove(id) {
            info!("Closing {} ({})", session.id, session.label());
        }
    }
}

/// Runs the shell server with the provided configuration.
///
/// Binds the listener, opens the audit sink and hands over to the accept loop.
pub async fn run(config: Config) -> Result<()> {
    let home_dir = config.home_dir()?;
    log_config(&config, &home_dir);

    let address = format!("{}:{}", config.server.listen_address, config.server.listen_port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Remote shell server listening on {}", address);

    let audit = AuditLog::open(config.server.audit_log.as_deref());
    if !audit.is_enabled() {
        warn!("Audit trail is disabled");
    }
    let state = Arc::new(Mutex::new(ServerState::new(config, home_dir, audit)));
    debug!("Server state initialised");

    match network::start_server(listener, state).await {
        Ok(_) => info!("Server stopped."),
        Err(e) => {
            error!("Server failed: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
