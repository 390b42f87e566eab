use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Counts failed logins per username inside a sliding window.
///
/// Keys are whatever username was typed, registered or not.
#[derive(Debug)]
pub struct LoginThrottle {
    failures: HashMap<String, (u64, DateTime<Utc>)>, // failed attempts and time of the last one
    max_failures: u64,
    window: Duration,
}

impl LoginThrottle {
    /// `max_failures == 0` disables throttling.
    pub fn new(max_failures: u64, window: Duration) -> Self {
        Self {
            failures: HashMap::new(),
            max_failures,
            window,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0, Duration::zero())
    }

    pub fn is_enabled(&self) -> bool {
        self.max_failures > 0
    }

    pub fn is_locked(&self, username: &str) -> bool {
        self.is_locked_at(username, Utc::now())
    }

    pub(crate) fn is_locked_at(&self, username: &str, now: DateTime<Utc>) -> bool {
        if !self.is_enabled() {
            return false;
        }
        match self.failures.get(username) {
            Some((count, last_failure)) => {
                *count >= self.max_failures && now - *last_failure <= self.window
            }
            None => false,
        }
    }

    pub fn record_failure(&mut self, username: &str) {
        self.record_failure_at(username, Utc::now())
    }

    pub(crate) fn record_failure_at(&mut self, username: &str, now: DateTime<Utc>) {
        if !self.is_enabled() {
            return;
        }
        let window = self.window;
        // Entries whose window has passed no longer lock anything.
        self.failures.retain(|_, (_, last)| now - *last <= window);

        let entry = self
            .failures
            .entry(username.to_string())
            .or_insert((0, now));

        entry.0 += 1;
        entry.1 = now;
    }

    /// Forget failures for `username`, e.g. after a successful login.
    pub fn reset(&mut self, username: &str) {
        self.failures.remove(username);
    }
}
