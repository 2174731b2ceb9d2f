//! Failure Window Module
//!
//! Fixed-size sliding window of recent call outcomes feeding the circuit
//! breaker's state transitions.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Default number of outcomes kept in the window.
pub const DEFAULT_WINDOW_SIZE: usize = 100;

// == Failure Window ==
/// The most recent N outcomes with running success/failure counts.
///
/// Counts always equal the number of `true`/`false` values in the window.
#[derive(Debug, Clone)]
pub struct FailureWindow {
    capacity: usize,
    /// `true` = success
    outcomes: VecDeque<bool>,
    success_count: usize,
    failure_count: usize,
    last_failure_time: Option<DateTime<Utc>>,
}

impl FailureWindow {
    /// Creates an empty window holding up to `capacity` outcomes (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            outcomes: VecDeque::with_capacity(capacity),
            success_count: 0,
            failure_count: 0,
            last_failure_time: None,
        }
    }

    pub fn record_success(&mut self) {
        self.push(true);
    }

    pub fn record_failure(&mut self) {
        self.push(false);
        self.last_failure_time = Some(Utc::now());
    }

    fn push(&mut self, success: bool) {
        if self.outcomes.len() >= self.capacity {
            match self.outcomes.pop_front() {
                Some(true) => self.success_count -= 1,
                Some(false) => self.failure_count -= 1,
                None => {}
            }
        }

        self.outcomes.push_back(success);
        if success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
    }

    /// Fraction of failures in the window, 0.0 when empty.
    pub fn failure_rate(&self) -> f64 {
        let total = self.outcomes.len();
        if total == 0 {
            0.0
        } else {
            self.failure_count as f64 / total as f64
        }
    }

    /// Number of outcomes currently in the window.
    pub fn total_requests(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wall-clock time of the most recent failure, even if it has left the window.
    pub fn last_failure_time(&self) -> Option<DateTime<Utc>> {
        self.last_failure_time
    }
}

impl Default for FailureWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_window() {
        let window = FailureWindow::default();
        assert_eq!(window.capacity(), DEFAULT_WINDOW_SIZE);
        assert_eq!(window.total_requests(), 0);
        assert_eq!(window.failure_rate(), 0.0);
        assert!(window.last_failure_time().is_none());
    }

    #[test]
    fn test_failure_rate() {
        let mut window = FailureWindow::new(10);
        window.record_success();
        window.record_failure();
        window.record_failure();
        window.record_success();

        assert_eq!(window.total_requests(), 4);
        assert_eq!(window.failure_count(), 2);
        assert_eq!(window.success_count(), 2);
        assert_eq!(window.failure_rate(), 0.5);
        assert!(window.last_failure_time().is_some());
    }

    #[test]
    fn test_oldest_outcome_evicted_when_full() {
        let mut window = FailureWindow::new(3);
        window.record_failure();
        window.record_success();
        window.record_success();
        window.record_success();

        assert_eq!(window.total_requests(), 3);
        assert_eq!(window.failure_count(), 0);
        assert_eq!(window.success_count(), 3);
        // Last failure timestamp survives eviction from the window
        assert!(window.last_failure_time().is_some());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut window = FailureWindow::new(0);
        window.record_failure();
        window.record_failure();
        assert_eq!(window.total_requests(), 1);
        assert_eq!(window.failure_rate(), 1.0);
    }

    proptest! {
        // Running counts always match the outcomes actually held.
        #[test]
        fn prop_counts_match_contents(
            capacity in 1usize..20,
            outcomes in prop::collection::vec(any::<bool>(), 0..100)
        ) {
            let mut window = FailureWindow::new(capacity);
            for ok in &outcomes {
                if *ok { window.record_success() } else { window.record_failure() }
            }

            let kept: Vec<bool> = outcomes
                .iter()
                .rev()
                .take(capacity)
                .copied()
                .collect();
            let failures = kept.iter().filter(|ok| !**ok).count();

            prop_assert_eq!(window.total_requests(), kept.len());
            prop_assert_eq!(window.failure_count(), failures);
            prop_assert_eq!(window.success_count(), kept.len() - failures);
            prop_assert!((0.0..=1.0).contains(&window.failure_rate()));
        }
    }
}
