//! Crop version tokens
//!
//! A token is the wall-clock time in milliseconds, bumped past the previous
//! token when two resyncs land in the same millisecond (or the clock steps
//! back), so no two tokens from one clock are ever equal.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of cache-busting crop version tokens
#[derive(Debug, Default)]
pub struct CropVersionClock {
    last: AtomicU64,
}

impl CropVersionClock {
    /// Create clock
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next token, strictly greater than every token issued before
    pub fn next_token(&self) -> String {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange(prev, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_strictly_increase() {
        let clock = CropVersionClock::new();
        let mut prev = 0u64;
        for _ in 0..1_000 {
            let token: u64 = clock.next_token().parse().unwrap();
            assert!(token > prev);
            prev = token;
        }
    }

    #[test]
    fn tokens_track_wall_clock() {
        let before = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap();
        let token: u64 = CropVersionClock::new().next_token().parse().unwrap();
        assert!(token >= before);
    }
}
