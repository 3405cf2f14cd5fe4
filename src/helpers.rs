use crate::config::Config;
use log::info;
use std::path::{Path, PathBuf};

/// Strips trailing spaces, tabs, CR and LF.
pub fn trim_end(input: &str) -> &str {
    input.trim_end_matches([' ', '\t', '\r', '\n'])
}

/// Resolves a client-supplied path against a session's working directory.
pub fn resolve_path(working_directory: &str, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(working_directory).join(path)
    }
}

/// The OS description of an I/O error, without the "(os error N)" suffix.
pub fn os_error_text(e: &std::io::Error) -> String {
    let text = e.to_string();
    match text.find(" (os error ") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

// Helper function to log configuration options
pub fn log_config(config: &Config, home_dir: &str) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  Max Sessions: {}", config.server.max_sessions);
    info!("  Home Directory: {}", home_dir);
    info!(
        "  Audit Log: {}",
        config.server.audit_log.as_deref().unwrap_or("(disabled)")
    );
    info!(
        "  Rate Limit: {} commands / {} s",
        config.limits.rate_max_commands, config.limits.rate_window_secs
    );
    info!(
        "  Max File Size: {} KB",
        config.limits.max_file_size / 1024
    );
    info!(
        "  Max Output Size: {} KB",
        config.limits.max_output_size / 1024
    );
    info!("  Accounts: {}", config.users.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_end() {
        assert_eq!(trim_end("ls -la \r\n"), "ls -la");
        assert_eq!(trim_end("  who\t"), "  who");
        assert_eq!(trim_end(" \n\t"), "");
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("/srv", "a.txt"), PathBuf::from("/srv/a.txt"));
        assert_eq!(resolve_path("/srv", "../etc"), PathBuf::from("/srv/../etc"));
        assert_eq!(resolve_path("/srv", "/tmp/x"), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_os_error_text() {
        let e = std::io::Error::from_raw_os_error(2);
        assert_eq!(os_error_text(&e), "No such file or directory");

        let custom = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(os_error_text(&custom), "boom");
    }
}
