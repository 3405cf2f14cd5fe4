use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rouilleshd", about = "A multi-client remote shell server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Override the listening port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the audit log path
    #[arg(short, long)]
    pub audit_log: Option<String>,

    /// Print a bcrypt hash for the given password and exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["rouilleshd"]);
        assert!(cli.config.is_empty());
        assert!(cli.port.is_none());
        assert!(cli.audit_log.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "rouilleshd",
            "--config",
            "/tmp/shell.conf",
            "-p",
            "2222",
            "--audit-log",
            "/var/log/shell.log",
            "-v",
        ]);
        assert_eq!(cli.config, "/tmp/shell.conf");
        assert_eq!(cli.port, Some(2222));
        assert_eq!(cli.audit_log.as_deref(), Some("/var/log/shell.log"));
        assert!(cli.verbose);
    }
}
