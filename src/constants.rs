// src/constants.rs

/// Inbound frames must be strictly shorter than this.
pub const MAX_FRAME_LEN: usize = 4096;
/// Cap for frames the server sends; command output and `who` listings outgrow the inbound cap.
pub const MAX_REPLY_LEN: usize = 256 * 1024;

pub const USERNAME_MAX_LEN: usize = 31;
pub const PASSWORD_MAX_LEN: usize = 63;
pub const MAX_AUTH_FAILURES: u32 = 3;

pub const DEFAULT_LISTEN_PORT: u16 = 12345;
pub const DEFAULT_MAX_SESSIONS: usize = 256;
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 5;
pub const DEFAULT_RATE_MAX_COMMANDS: u32 = 10;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_OUTPUT_SIZE: usize = 16 * 1024;

pub const USERNAME_PROMPT: &str = "Enter username: ";
pub const PASSWORD_PROMPT: &str = "Enter password: ";

/// Substrings that make a shell command off-limits for the `user` role.
pub const BANNED_FOR_USER: &[&str] = &[
    "rm ", " rm", "rm -", "shutdown", "reboot", "mkfs", "iptables", "poweroff",
];
