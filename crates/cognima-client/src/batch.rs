//! Sequential batch orchestration with throttling and partial failures.

use std::future::Future;
use std::time::Duration;

use cognima_core::{BatchOutcome, BatchReport, RetrievalError, RetrievalResult};
use tokio::time::Instant;

use crate::transport::Deadline;

/// How a batch is paced and bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Delay between consecutive calls. No delay follows the last call.
    pub throttle: Duration,
    /// Budget for the whole batch. Inputs not started in time are skipped.
    pub deadline: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            throttle: Duration::from_secs(1),
            deadline: None,
        }
    }
}

impl BatchOptions {
    #[must_use]
    pub const fn with_throttle(throttle: Duration) -> Self {
        Self {
            throttle,
            deadline: None,
        }
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Run `op` once per input, strictly in order, one at a time.
///
/// Every input yields exactly one outcome. A failing input never stops the
/// batch; once the deadline is exhausted the remaining inputs are marked
/// [`RetrievalError::Skipped`] without being attempted, and an input that
/// is running when it expires fails with `Timeout`.
pub async fn run_batch<I, T, F, Fut>(
    inputs: Vec<I>,
    mut op: F,
    options: &BatchOptions,
) -> BatchReport<I, T>
where
    F: FnMut(&I) -> Fut,
    Fut: Future<Output = RetrievalResult<T>>,
{
    let started = Instant::now();
    let deadline = Deadline::start(options.deadline);
    let total = inputs.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, input) in inputs.into_iter().enumerate() {
        if index > 0 {
            let pause = match deadline.remaining() {
                Ok(None) => options.throttle,
                Ok(Some(left)) => options.throttle.min(left),
                Err(_) => Duration::ZERO,
            };
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        let result = match deadline.remaining() {
            Err(_) => Err(RetrievalError::Skipped),
            Ok(None) => op(&input).await,
            Ok(Some(left)) => tokio::time::timeout(left, op(&input))
                .await
                .unwrap_or_else(|_| Err(deadline.error())),
        };

        match &result {
            Ok(_) => tracing::debug!(index, total, "Batch input succeeded"),
            Err(RetrievalError::Skipped) => {}
            Err(e) => tracing::warn!(index, total, error = %e, "Batch input failed"),
        }
        outcomes.push(BatchOutcome {
            index,
            input,
            result,
        });
    }

    let report = BatchReport {
        outcomes,
        elapsed: started.elapsed(),
    };
    let summary = report.summary();
    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
        "Batch finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_keeps_order_and_throttles() {
        let throttle = Duration::from_millis(1500);
        let report = run_batch(
            vec!["i1", "i2", "i3"],
            |input| {
                let input = *input;
                async move {
                    if input == "i2" {
                        Err(RetrievalError::provider("unavailable"))
                    } else {
                        Ok(input.len())
                    }
                }
            },
            &BatchOptions::with_throttle(throttle),
        )
        .await;

        let results: Vec<bool> = report.outcomes.iter().map(BatchOutcome::is_success).collect();
        assert_eq!(results, vec![true, false, true]);
        assert_eq!(report.outcomes[1].input, "i2");
        assert!(report.elapsed >= throttle * 2);
        // No pause after the last input.
        assert!(report.elapsed < throttle * 3);

        let summary = report.summary();
        assert_eq!((summary.succeeded, summary.failed, summary.skipped), (2, 1, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_sequential() {
        let log = Mutex::new(Vec::new());
        run_batch(
            vec![1, 2, 3],
            |n| {
                let n = *n;
                let log = &log;
                async move {
                    log.lock().unwrap().push(format!("start {n}"));
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    log.lock().unwrap().push(format!("end {n}"));
                    Ok::<_, RetrievalError>(n)
                }
            },
            &BatchOptions::with_throttle(Duration::ZERO),
        )
        .await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["start 1", "end 1", "start 2", "end 2", "start 3", "end 3"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_times_out_running_input_and_skips_rest() {
        let attempted = Mutex::new(Vec::new());
        let report = run_batch(
            vec![1, 2, 3],
            |n| {
                let n = *n;
                let attempted = &attempted;
                async move {
                    attempted.lock().unwrap().push(n);
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    Ok::<_, RetrievalError>(n)
                }
            },
            &BatchOptions::with_throttle(Duration::from_secs(1))
                .with_deadline(Duration::from_secs(5)),
        )
        .await;

        assert!(report.outcomes[0].is_success());
        assert_eq!(
            report.outcomes[1].result,
            Err(RetrievalError::timeout(Duration::from_secs(5)))
        );
        assert!(report.outcomes[2].is_skipped());
        assert_eq!(*attempted.lock().unwrap(), vec![1, 2]);
        assert_eq!(report.summary().total(), 3);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = run_batch(
            Vec::<u32>::new(),
            |_| async { Ok::<_, RetrievalError>(()) },
            &BatchOptions::default(),
        )
        .await;
        assert!(report.outcomes.is_empty());
        assert_eq!(report.summary().total(), 0);
    }
}
