//! Append-only audit trail of session actions.
//!
//! One line per action. Write failures are ignored so that auditing can never
//! take a session down; without a sink nothing is recorded.

use crate::session::Session;
use chrono::Local;
use log::{error, info};
use std::fs::{File, OpenOptions};
use std::io::Write;

#[derive(Debug, Default)]
pub struct AuditLog {
    sink: Option<File>,
}

impl AuditLog {
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Opens `path` for appending. An unopenable file disables auditing.
    pub fn open(path: Option<&str>) -> Self {
        let Some(path) = path else {
            info!("No audit log configured, auditing disabled");
            return Self::disabled();
        };

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                info!("Audit log: {}", path);
                Self { sink: Some(file) }
            }
            Err(e) => {
                error!("Failed to open audit log {}: {}", path, e);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn record(&mut self, session: &Session, command: &str, bytes_out: usize) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let line = format_line(
            &Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            session,
            command,
            bytes_out,
        );
        let _ = sink.write_all(line.as_bytes()).and_then(|_| sink.flush());
    }
}

fn format_line(timestamp: &str, session: &Session, command: &str, bytes_out: usize) -> String {
    let username = if session.username.is_empty() {
        "UNKNOWN"
    } else {
        session.username.as_str()
    };
    let role = session.role.map(|r| r.as_str()).unwrap_or("?");

    format!(
        "[{}] user={} role={} ip={}:{} cwd=\"{}\" cmd=\"{}\" bytes_out={}\n",
        timestamp,
        username,
        role,
        session.peer_address,
        session.peer_port,
        session.working_directory,
        command,
        bytes_out
    )
}
