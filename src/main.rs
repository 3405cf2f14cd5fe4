mod config;
mod constants;
mod core_auth;
mod core_cli;
mod core_log;
mod core_network;
mod core_quota;
mod core_shellcommand;
mod helpers;
mod server;
mod session;

use crate::config::Config;
use crate::core_auth::helper::hash_password;
use crate::core_cli::Cli;
use crate::core_log::logger::init_logger;
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "/etc/rouilleshd.conf";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    init_logger(args.verbose);

    if let Some(password) = args.hash_password.as_deref() {
        let hashed = hash_password(password).context("Failed to hash password")?;
        println!("{}", hashed);
        return Ok(());
    }

    let mut config = load_config(&args.config)?;

    // CLI flags win over the configuration file
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }
    if let Some(audit_log) = args.audit_log {
        config.server.audit_log = Some(audit_log);
    }

    server::run(config).await?;

    Ok(())
}

/// An explicit `--config` must exist; the default path may be absent.
fn load_config(path: &str) -> Result<Config> {
    if !path.is_empty() {
        info!("Loading configuration from {}", path);
        return Config::load_from_file(path);
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        info!("Loading configuration from {}", DEFAULT_CONFIG_PATH);
        Config::load_from_file(DEFAULT_CONFIG_PATH)
    } else {
        warn!(
            "{} not found, running with built-in defaults",
            DEFAULT_CONFIG_PATH
        );
        Ok(Config::default())
    }
}
