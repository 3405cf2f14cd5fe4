use crate::config::UserEntry;
use crate::core_auth::helper::verify_password;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization level of an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
enum Secret {
    Plain(String),
    Bcrypt(String),
}

#[derive(Debug, Clone)]
pub struct Credential {
    username: String,
    secret: Secret,
    role: Role,
}

impl Credential {
    pub fn from_entry(entry: &UserEntry) -> Option<Self> {
        let secret = match (&entry.password_hash, &entry.password) {
            (Some(hash), _) => Secret::Bcrypt(hash.clone()),
            (None, Some(password)) => Secret::Plain(password.clone()),
            (None, None) => return None,
        };

        Some(Credential {
            username: entry.username.clone(),
            secret,
            role: entry.role,
        })
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        if self.username != username {
            return false;
        }
        match &self.secret {
            Secret::Plain(expected) => expected == password,
            Secret::Bcrypt(hashed) => verify_password(password, hashed),
        }
    }
}

/// Read-only (username, password) -> role mapping, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: Vec<Credential>,
}

impl CredentialStore {
    pub fn from_entries(entries: &[UserEntry]) -> Self {
        let mut store = CredentialStore::default();
        for entry in entries {
            match Credential::from_entry(entry) {
                Some(credential) => store.entries.push(credential),
                None => warn!(
                    "Ignoring account '{}': neither password nor password_hash is set",
                    entry.username
                ),
            }
        }
        store
    }

    pub fn lookup(&self, username: &str, password: &str) -> Option<Role> {
        self.entries
            .iter()
            .find(|credential| credential.matches(username, password))
            .map(|credential| credential.role)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn entry(username: &str, password: Option<&str>, hash: Option<String>, role: Role) -> UserEntry {
        UserEntry {
            username: username.to_string(),
            password: password.map(str::to_string),
            password_hash: hash,
            role,
        }
    }

    #[test]
    fn test_default_accounts() {
        let store = CredentialStore::from_entries(&Config::default().users);
        assert_eq!(store.lookup("admin", "123456"), Some(Role::Admin));
        assert_eq!(store.lookup("user", "usth"), Some(Role::User));
        assert_eq!(store.lookup("user", "123456"), None);
        assert_eq!(store.lookup("nobody", "usth"), None);
    }

    #[test]
    fn test_password_is_compared_exactly() {
        let store = CredentialStore::from_entries(&Config::default().users);
        assert_eq!(store.lookup("admin", "123456 "), None);
        assert_eq!(store.lookup("Admin", "123456"), None);
    }

    #[test]
    fn test_bcrypt_entry() {
        let hashed = bcrypt::hash("s3cret", 4).unwrap();
        let store =
            CredentialStore::from_entries(&[entry("ops", None, Some(hashed), Role::Admin)]);
        assert_eq!(store.lookup("ops", "s3cret"), Some(Role::Admin));
        assert_eq!(store.lookup("ops", "wrong"), None);
    }

    #[test]
    fn test_entry_without_secret_is_skipped() {
        let store = CredentialStore::from_entries(&[
            entry("ghost", None, None, Role::User),
            entry("user", Some("usth"), None, Role::User),
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("ghost", ""), None);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::User.to_string(), "user");
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }
}
