//! Edit rate limiting.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Kick reason for clients that edit too quickly.
pub const BLOCK_SPAM_KICK: &str = "You were kicked by antigrief system. Slow down.";

/// Sliding window over a connection's most recent edit times.
#[derive(Debug, Clone)]
pub struct SpamChecker {
    blocks: VecDeque<Instant>,
    max_blocks: usize,
    interval: Duration,
}

impl SpamChecker {
    /// Allow `max_blocks` edits per `interval`.
    pub fn new(max_blocks: usize, interval: Duration) -> Self {
        Self {
            blocks: VecDeque::with_capacity(max_blocks.min(1024)),
            max_blocks,
            interval,
        }
    }

    /// Record an edit at `now`; true when the window is already full.
    pub fn check_block_spam(&mut self, now: Instant) -> bool {
        if self.max_blocks == 0 {
            return false;
        }
        if self.blocks.len() < self.max_blocks {
            self.blocks.push_back(now);
            return false;
        }
        match self.blocks.front() {
            Some(&oldest) if now.saturating_duration_since(oldest) > self.interval => {
                self.blocks.pop_front();
                self.blocks.push_back(now);
                false
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_window_inside_interval_is_spam() {
        let mut checker = SpamChecker::new(3, Duration::from_secs(5));
        let start = Instant::now();
        for i in 0..3 {
            assert!(!checker.check_block_spam(start + Duration::from_millis(i)));
        }
        assert!(checker.check_block_spam(start + Duration::from_secs(1)));
    }

    #[test]
    fn window_slides_once_oldest_expires() {
        let mut checker = SpamChecker::new(2, Duration::from_secs(5));
        let start = Instant::now();
        assert!(!checker.check_block_spam(start));
        assert!(!checker.check_block_spam(start + Duration::from_secs(1)));
        assert!(!checker.check_block_spam(start + Duration::from_secs(6)));
        assert!(checker.check_block_spam(start + Duration::from_secs(6)));
    }

    #[test]
    fn zero_disables_the_check() {
        let mut checker = SpamChecker::new(0, Duration::from_secs(5));
        let now = Instant::now();
        assert!((0..1000).all(|_| !checker.check_block_spam(now)));
    }
}
