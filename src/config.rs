use crate::constants::{
    DEFAULT_LISTEN_PORT, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_OUTPUT_SIZE, DEFAULT_MAX_SESSIONS,
    DEFAULT_RATE_MAX_COMMANDS, DEFAULT_RATE_WINDOW_SECS,
};
use crate::core_auth::core_auth::Role;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub max_sessions: usize,
    pub home_dir: Option<String>, // Falls back to the process directory
    pub audit_log: Option<String>, // No sink, no audit trail
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub rate_window_secs: u64,
    pub rate_max_commands: u32,
    pub max_file_size: u64,
    pub max_output_size: usize,
}

/// One account of the static credential store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserEntry {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub users: Vec<UserEntry>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: DEFAULT_LISTEN_PORT,
            max_sessions: DEFAULT_MAX_SESSIONS,
            home_dir: None,
            audit_log: Some(String::from("server.log")),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rate_window_secs: DEFAULT_RATE_WINDOW_SECS,
            rate_max_commands: DEFAULT_RATE_MAX_COMMANDS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_output_size: DEFAULT_MAX_OUTPUT_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            limits: LimitsConfig::default(),
            users: vec![
                UserEntry {
                    username: String::from("admin"),
                    password: Some(String::from("123456")),
                    password_hash: None,
                    role: Role::Admin,
                },
                UserEntry {
                    username: String::from("user"),
                    password: Some(String::from("usth")),
                    password_hash: None,
                    role: Role::User,
                },
            ],
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }

    /// The directory new sessions start in.
    pub fn home_dir(&self) -> Result<String> {
        match &self.server.home_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let cwd = std::env::current_dir()
                    .context("Failed to determine the server directory")?;
                Ok(cwd.to_string_lossy().into_owned())
            }
        }
    }
}
