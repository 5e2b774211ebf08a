//! # Fibonacci Backoff
//!
//! Progressive retry delay for failed reconciliations. Grows more slowly than
//! exponential backoff so transient store or inventory failures are retried
//! promptly without hammering either.
//!
//! Sequence: 1s, 1s, 2s, 3s, 5s, 8s, ... capped at the maximum.

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each backoff is the sum of the previous two, capped at `max_seconds`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Previous backoff in seconds
    prev_seconds: u64,
    /// Current backoff in seconds
    current_seconds: u64,
    /// Maximum backoff in seconds
    max_seconds: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff with the given bounds in seconds.
    ///
    /// * `min_seconds` - first two values of the sequence (typically 1)
    /// * `max_seconds` - cap of the sequence (typically 60)
    #[must_use]
    pub fn new(min_seconds: u64, max_seconds: u64) -> Self {
        Self {
            prev_seconds: 0,
            current_seconds: min_seconds,
            max_seconds,
        }
    }

    /// Get the next backoff in seconds and advance the sequence.
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result = self.current_seconds;

        let next = self.prev_seconds.saturating_add(self.current_seconds);
        self.prev_seconds = self.current_seconds;
        self.current_seconds = next.min(self.max_seconds);

        result
    }

    /// Get the next backoff as a `Duration` and advance the sequence.
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(1, 60);

        let sequence: Vec<u64> = (0..10).map(|_| backoff.next_backoff_seconds()).collect();
        assert_eq!(sequence, vec![1, 1, 2, 3, 5, 8, 13, 21, 34, 55]);
    }

    #[test]
    fn test_fibonacci_backoff_max_cap() {
        let mut backoff = FibonacciBackoff::new(1, 60);

        for _ in 0..10 {
            backoff.next_backoff_seconds();
        }
        // 34 + 55 = 89, capped
        assert_eq!(backoff.next_backoff_seconds(), 60);
        assert_eq!(backoff.next_backoff_seconds(), 60);
        assert_eq!(backoff.next_backoff(), Duration::from_secs(60));
    }
}
