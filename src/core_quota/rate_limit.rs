//! Fixed-window command rate limiting, evaluated per session.

use std::time::{Duration, Instant};

/// Per-session window state.
#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    pub start: Instant,
    pub count: u32,
}

impl RateWindow {
    pub fn new(now: Instant) -> Self {
        Self { start: now, count: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// Rejected; the client should retry in roughly `wait_secs` seconds.
    Limited { wait_secs: u64 },
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    max_commands: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_commands: u32, window_secs: u64) -> Self {
        Self {
            max_commands,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Resets an expired window, then admits the command if the window has room.
    ///
    /// A rejected command does not count against the window.
    pub fn check(&self, window: &mut RateWindow, now: Instant) -> RateDecision {
        let elapsed = now.saturating_duration_since(window.start);
        if elapsed >= self.window {
            window.start = now;
            window.count = 0;
        }

        if window.count >= self.max_commands {
            let elapsed_secs = now.saturating_duration_since(window.start).as_secs();
            let wait_secs = self.window.as_secs().saturating_sub(elapsed_secs).max(1);
            return RateDecision::Limited { wait_secs };
        }

        window.count += 1;
        RateDecision::Allowed
    }

    pub fn limit_message(&self, wait_secs: u64) -> String {
        format!(
            "Rate limit exceeded: max {} commands / {} seconds.\nPlease wait ~{} seconds...\n",
            self.max_commands,
            self.window.as_secs(),
            wait_secs
        )
    }
}
