// Here's the list of the built-in commands implemented
pub mod broadcast;
pub mod cd;
pub mod download;
pub mod exec;
pub mod exit;
pub mod help;
pub mod stats;
pub mod upload;
pub mod who;

pub mod error;
pub mod filter;
pub mod handlers;
pub mod shellcommand;
