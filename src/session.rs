use crate::constants::MAX_REPLY_LEN;
use crate::core_auth::{AuthStage, Role};
use crate::core_network::codec::write_frame;
use crate::core_network::error::FrameError;
use crate::core_quota::RateWindow;
use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::io::AsyncWrite;

/// Send half of a client connection.
pub type SessionWriter = Box<dyn AsyncWrite + Send + Sync + Unpin>;

/// Connection handle. Allocated in accept order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct Session {
    pub id: SessionId,
    pub auth_stage: AuthStage,
    pub auth_failures: u32,
    pub username: String,         // Empty until the client sends one
    pub role: Option<Role>,       // Set only on successful login
    pub peer_address: String,
    pub peer_port: u16,
    pub working_directory: String,
    pub rate_window: RateWindow,
    pub commands_executed: u64,
    pub writer: SessionWriter,
}

impl Session {
    pub fn new(
        id: SessionId,
        peer: SocketAddr,
        working_directory: String,
        writer: SessionWriter,
        now: Instant,
    ) -> Self {
        Self {
            id,
            auth_stage: AuthStage::AwaitingUsername,
            auth_failures: 0,
            username: String::new(),
            role: None,
            peer_address: peer.ip().to_string(),
            peer_port: peer.port(),
            working_directory,
            rate_window: RateWindow::new(now),
            commands_executed: 0,
            writer,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_stage == AuthStage::Authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.role.map(|role| role.is_admin()).unwrap_or(false)
    }

    /// `user@addr:port`, for log lines.
    pub fn label(&self) -> String {
        let username = if self.username.is_empty() {
            "UNKNOWN"
        } else {
            self.username.as_str()
        };
        format!("{}@{}:{}", username, self.peer_address, self.peer_port)
    }

    /// Sends one reply frame to this client.
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), FrameError> {
        write_frame(&mut self.writer, payload, MAX_REPLY_LEN).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("auth_stage", &self.auth_stage)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("peer", &format_args!("{}:{}", self.peer_address, self.peer_port))
            .field("working_directory", &self.working_directory)
            .field("commands_executed", &self.commands_executed)
            .finish_non_exhaustive()
    }
}

/// Registry of live sessions, bounded by `capacity`.
///
/// Ordered by `SessionId`, so iteration follows accept order.
#[derive(Debug)]
pub struct SessionTable {
    sessions: BTreeMap<SessionId, Session>,
    capacity: usize,
    next_id: u64,
}

impl SessionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: BTreeMap::new(),
            capacity,
            next_id: 1,
        }
    }

    /// Registers a new connection. Returns `None` when the table is full.
    pub fn insert(
        &mut self,
        peer: SocketAddr,
        working_directory: String,
        writer: SessionWriter,
        now: Instant,
    ) -> Option<SessionId> {
        if self.is_full() {
            return None;
        }
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions
            .insert(id, Session::new(id, peer, working_directory, writer, now));
        Some(id)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    pub fn authenticated(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values().filter(|s| s.is_authenticated())
    }

    pub fn authenticated_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut().filter(|s| s.is_authenticated())
    }

    pub fn authenticated_count(&self) -> usize {
        self.authenticated().count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sessions.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(table: &mut SessionTable, port: u16) -> Option<SessionId> {
        table.insert(
            format!("127.0.0.1:{}", port).parse().unwrap(),
            "/tmp".to_string(),
            Box::new(tokio::io::sink()),
            Instant::now(),
        )
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut table = SessionTable::new(2);
        assert!(insert(&mut table, 1000).is_some());
        assert!(insert(&mut table, 1001).is_some());
        assert!(table.is_full());
        assert!(insert(&mut table, 1002).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut table = SessionTable::new(4);
        let first = insert(&mut table, 1000).unwrap();
        table.remove(first);
        let second = insert(&mut table, 1001).unwrap();
        assert_ne!(first, second);
        assert!(table.get(first).is_none());
    }

    #[test]
    fn test_new_session_state() {
        let mut table = SessionTable::new(4);
        let id = insert(&mut table, 4242).unwrap();
        let session = table.get(id).unwrap();

        assert_eq!(session.auth_stage, AuthStage::AwaitingUsername);
        assert_eq!(session.peer_address, "127.0.0.1");
        assert_eq!(session.peer_port, 4242);
        assert_eq!(session.working_directory, "/tmp");
        assert!(session.username.is_empty());
        assert!(session.role.is_none());
        assert_eq!(session.label(), "UNKNOWN@127.0.0.1:4242");
    }

    #[test]
    fn test_authenticated_filter_keeps_accept_order() {
        let mut table = SessionTable::new(8);
        let a = insert(&mut table, 1).unwrap();
        let _pending = insert(&mut table, 2).unwrap();
        let c = insert(&mut table, 3).unwrap();

        for id in [c, a] {
            let session = table.get_mut(id).unwrap();
            session.auth_stage = AuthStage::Authenticated;
            session.role = Some(Role::User);
        }

        let ports: Vec<u16> = table.authenticated().map(|s| s.peer_port).collect();
        assert_eq!(ports, vec![1, 3]);
        assert_eq!(table.authenticated_count(), 2);
        assert_eq!(table.len(), 3);
    }
}
