// Limitation du nombre de commandes par session
pub mod rate_limit;

mod test_quota;

pub use rate_limit::{RateDecision, RateLimiter, RateWindow};
