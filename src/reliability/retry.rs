use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, first one included.
    pub max_attempts: u32,
    /// Fixed pause after a failed attempt.
    pub backoff: Duration,
    /// Wall-clock budget for the whole attempt sequence.
    pub deadline: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: DEFAULT_BACKOFF,
            deadline: DEFAULT_DEADLINE,
        }
    }
}

impl RetryConfig {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum RetryOutcome<T, E> {
    Completed { value: T, attempts: u32 },
    Failed { error: E, attempts: u32, timed_out: bool },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Completed { attempts, .. } | RetryOutcome::Failed { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Runs one bounded attempt sequence on the calling thread.
#[derive(Debug, Clone)]
pub struct RetryManager {
    config: RetryConfig,
}

impl RetryManager {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config: RetryConfig {
                max_attempts: config.max_attempts.max(1),
                ..config
            },
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Calls `attempt(n, remaining)` until it succeeds, the attempts run out
    /// or the deadline passes. `on_error` sees every failure as it happens.
    ///
    /// An `Ok` ends the sequence regardless of what it carries; callers
    /// decide separately whether a completed value counts as success.
    pub fn run<T, E, F, R>(&self, mut attempt: F, mut on_error: R) -> RetryOutcome<T, E>
    where
        F: FnMut(u32, Duration) -> Result<T, E>,
        R: FnMut(u32, &E),
    {
        let deadline = Instant::now() + self.config.deadline;
        let mut number = 0;

        loop {
            number += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());

            let error = match attempt(number, remaining) {
                Ok(value) => {
                    return RetryOutcome::Completed {
                        value,
                        attempts: number,
                    };
                }
                Err(error) => error,
            };
            on_error(number, &error);

            let timed_out = Instant::now() >= deadline;
            if timed_out || number >= self.config.max_attempts {
                return RetryOutcome::Failed {
                    error,
                    attempts: number,
                    timed_out,
                };
            }

            thread::sleep(self.config.backoff);
            if Instant::now() >= deadline {
                return RetryOutcome::Failed {
                    error,
                    attempts: number,
                    timed_out: true,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(max_attempts: u32, backoff_ms: u64, deadline_ms: u64) -> RetryManager {
        RetryManager::new(RetryConfig {
            max_attempts,
            backoff: Duration::from_millis(backoff_ms),
            deadline: Duration::from_millis(deadline_ms),
        })
    }

    #[test]
    fn test_success_on_first_attempt() {
        let outcome: RetryOutcome<u8, ()> = manager(3, 10, 1000).run(|_, _| Ok(7), |_, _| {});
        assert_eq!(outcome, RetryOutcome::Completed { value: 7, attempts: 1 });
    }

    #[test]
    fn test_exhausts_attempts_with_backoff_between() {
        let mut calls = Vec::new();
        let started = Instant::now();

        let outcome: RetryOutcome<(), &str> = manager(3, 50, 5000).run(
            |n, _| {
                calls.push((n, started.elapsed()));
                Err("refused")
            },
            |_, _| {},
        );

        assert_eq!(outcome.attempts(), 3);
        assert!(matches!(outcome, RetryOutcome::Failed { timed_out: false, .. }));
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(50));
        }
    }

    #[test]
    fn test_recovers_after_transient_failures() {
        let outcome = manager(5, 1, 1000).run(
            |n, _| if n < 3 { Err(n) } else { Ok("delivered") },
            |_, _| {},
        );
        assert_eq!(
            outcome,
            RetryOutcome::Completed {
                value: "delivered",
                attempts: 3
            }
        );
    }

    #[test]
    fn test_deadline_abandons_remaining_attempts() {
        let outcome: RetryOutcome<(), ()> = manager(10, 10, 60).run(
            |_, _| {
                thread::sleep(Duration::from_millis(80));
                Err(())
            },
            |_, _| {},
        );

        assert_eq!(outcome.attempts(), 1);
        assert!(matches!(outcome, RetryOutcome::Failed { timed_out: true, .. }));
    }

    #[test]
    fn test_remaining_budget_shrinks() {
        let mut budgets = Vec::new();
        let _: RetryOutcome<(), ()> = manager(3, 20, 1000).run(
            |_, remaining| {
                budgets.push(remaining);
                Err(())
            },
            |_, _| {},
        );

        assert_eq!(budgets.len(), 3);
        assert!(budgets[0] <= Duration::from_millis(1000));
        assert!(budgets[2] < budgets[0]);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let mut calls = 0;
        let _: RetryOutcome<(), ()> = manager(0, 1, 1000).run(
            |_, _| {
                calls += 1;
                Err(())
            },
            |_, _| {},
        );
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_on_error_sees_every_failure() {
        let mut seen = Vec::new();
        let _: RetryOutcome<(), String> = manager(3, 1, 1000).run(
            |n, _| Err(format!("attempt {n}")),
            |n, e| seen.push((n, e.clone())),
        );
        assert_eq!(
            seen,
            vec![
                (1, "attempt 1".to_string()),
                (2, "attempt 2".to_string()),
                (3, "attempt 3".to_string())
            ]
        );
    }
}
