pub mod audit;
pub mod logger;

pub use audit::AuditLog;
