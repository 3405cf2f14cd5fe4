use crate::constants::{MAX_AUTH_FAILURES, PASSWORD_MAX_LEN, PASSWORD_PROMPT, USERNAME_MAX_LEN, USERNAME_PROMPT};
use crate::core_auth::core_auth::{CredentialStore, Role};
use crate::core_auth::helper::truncate_field;
use crate::session::Session;
use log::{info, warn};

/// Where a connection stands in the login handshake.
///
/// The stage only moves `AwaitingUsername -> AwaitingPassword -> Authenticated`,
/// back to `AwaitingUsername` on a recoverable failure, or to `Terminated`.
/// Nothing leaves `Authenticated` except `Terminated`, and nothing leaves `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    AwaitingUsername,
    AwaitingPassword,
    Authenticated,
    Terminated,
}

/// Result of feeding one frame to a session that is still logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    AskPassword,
    LoggedIn(Role),
    Retry,
    Locked,
}

impl AuthStep {
    pub fn reply(&self, session: &Session) -> String {
        match self {
            AuthStep::AskPassword => PASSWORD_PROMPT.to_string(),
            AuthStep::LoggedIn(role) => format!(
                "Authentication successful. Welcome {} (role={}).\nType 'help' for commands.\n",
                session.username, role
            ),
            AuthStep::Retry => format!("Invalid credentials. Try again.\n{}", USERNAME_PROMPT),
            AuthStep::Locked => "Authentication failed too many times. Bye.\n".to_string(),
        }
    }

    /// The session must be closed once the reply is sent.
    pub fn terminates(&self) -> bool {
        matches!(self, AuthStep::Locked)
    }
}

/// Consumes `input` as whichever field the session is waiting for.
///
/// Returns `None` when the session is not in a login stage.
pub fn advance(session: &mut Session, input: &[u8], store: &CredentialStore) -> Option<AuthStep> {
    let text = String::from_utf8_lossy(input);

    match session.auth_stage {
        AuthStage::AwaitingUsername => {
            session.username = truncate_field(&text, USERNAME_MAX_LEN);
            session.auth_stage = AuthStage::AwaitingPassword;
            Some(AuthStep::AskPassword)
        }
        AuthStage::AwaitingPassword => {
            let password = truncate_field(&text, PASSWORD_MAX_LEN);
            match store.lookup(&session.username, &password) {
                Some(role) => {
                    session.role = Some(role);
                    session.auth_failures = 0;
                    session.auth_stage = AuthStage::Authenticated;
                    info!("{} logged in with role {}", session.label(), role);
                    Some(AuthStep::LoggedIn(role))
                }
                None => {
                    session.auth_failures += 1;
                    warn!(
                        "Failed login for {} ({}/{})",
                        session.label(),
                        session.auth_failures,
                        MAX_AUTH_FAILURES
                    );
                    if session.auth_failures >= MAX_AUTH_FAILURES {
                        session.auth_stage = AuthStage::Terminated;
                        Some(AuthStep::Locked)
                    } else {
                        session.auth_stage = AuthStage::AwaitingUsername;
                        Some(AuthStep::Retry)
                    }
                }
            }
        }
        AuthStage::Authenticated | AuthStage::Terminated => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::{Session, SessionId};
    use std::time::Instant;

    fn new_session() -> Session {
        Session::new(
            SessionId(1),
            "127.0.0.1:40000".parse().unwrap(),
            "/tmp".to_string(),
            Box::new(tokio::io::sink()),
            Instant::now(),
        )
    }

    fn store() -> CredentialStore {
        CredentialStore::from_entries(&Config::default().users)
    }

    #[test]
    fn test_successful_login() {
        let store = store();
        let mut session = new_session();

        assert_eq!(advance(&mut session, b"admin", &store), Some(AuthStep::AskPassword));
        assert_eq!(session.auth_stage, AuthStage::AwaitingPassword);
        assert!(session.role.is_none());

        let step = advance(&mut session, b"123456", &store).unwrap();
        assert_eq!(step, AuthStep::LoggedIn(Role::Admin));
        assert_eq!(session.auth_stage, AuthStage::Authenticated);
        assert_eq!(session.role, Some(Role::Admin));
        assert_eq!(
            step.reply(&session),
            "Authentication successful. Welcome admin (role=admin).\nType 'help' for commands.\n"
        );
    }

    #[test]
    fn test_failure_returns_to_username_prompt() {
        let store = store();
        let mut session = new_session();

        advance(&mut session, b"user", &store);
        let step = advance(&mut session, b"wrong", &store).unwrap();
        assert_eq!(step, AuthStep::Retry);
        assert!(!step.terminates());
        assert_eq!(session.auth_stage, AuthStage::AwaitingUsername);
        assert_eq!(session.auth_failures, 1);
        assert_eq!(step.reply(&session), "Invalid credentials. Try again.\nEnter username: ");
    }

    #[test]
    fn test_three_failures_terminate() {
        let store = store();
        let mut session = new_session();

        for _ in 0..2 {
            advance(&mut session, b"user", &store);
            assert_eq!(advance(&mut session, b"nope", &store), Some(AuthStep::Retry));
        }
        advance(&mut session, b"user", &store);
        let step = advance(&mut session, b"nope", &store).unwrap();
        assert_eq!(step, AuthStep::Locked);
        assert!(step.terminates());
        assert_eq!(session.auth_stage, AuthStage::Terminated);

        // A terminated session never comes back, even with valid credentials
        assert_eq!(advance(&mut session, b"usth", &store), None);
        assert_eq!(session.auth_stage, AuthStage::Terminated);
        assert!(session.role.is_none());
    }

    #[test]
    fn test_success_resets_failures() {
        let store = store();
        let mut session = new_session();

        advance(&mut session, b"user", &store);
        advance(&mut session, b"bad", &store);
        advance(&mut session, b"user", &store);
        advance(&mut session, b"usth", &store);
        assert_eq!(session.auth_failures, 0);
        assert_eq!(session.role, Some(Role::User));
    }

    #[test]
    fn test_authenticated_session_ignores_auth_input() {
        let store = store();
        let mut session = new_session();

        advance(&mut session, b"user", &store);
        advance(&mut session, b"usth", &store);
        assert_eq!(advance(&mut session, b"admin", &store), None);
        assert_eq!(session.username, "user");
        assert_eq!(session.role, Some(Role::User));
    }

    #[test]
    fn test_long_username_is_truncated() {
        let store = store();
        let mut session = new_session();

        let long = "x".repeat(100);
        advance(&mut session, long.as_bytes(), &store);
        assert_eq!(session.username.len(), USERNAME_MAX_LEN);
    }

    #[test]
    fn test_fields_are_taken_literally() {
        let store = store();
        let mut session = new_session();

        advance(&mut session, b"admin\n", &store);
        assert_eq!(session.username, "admin\n");
        assert_eq!(advance(&mut session, b"123456", &store), Some(AuthStep::Retry));
    }
}
