use std::future::Future;
use std::time::Duration;

use log::debug;

use crate::error::AppError;

/// Awaits `future` for at most `timeout`, mapping its error into an
/// [`AppError`].
pub async fn with_deadline<T, E, F, M>(
    timeout: Duration,
    operation: &'static str,
    future: F,
    map_error: M,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, E>>,
    M: FnOnce(E) -> AppError,
{
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| AppError::timeout(operation, timeout.as_secs()))?
        .map_err(map_error)
}

/// Attempt schedule for network work: one attempt per entry of
/// `delays_secs`, each preceded by a pause of that many seconds and bounded
/// by `timeout`.
#[derive(Debug, Clone, Copy)]
pub struct Attempts<'a> {
    operation: &'static str,
    delays_secs: &'a [u64],
    timeout: Duration,
}

impl<'a> Attempts<'a> {
    pub fn new(operation: &'static str, delays_secs: &'a [u64], timeout: Duration) -> Self {
        Self {
            operation,
            delays_secs,
            timeout,
        }
    }

    /// Runs `attempt` until it succeeds, fails with a non-retryable error or
    /// the schedule is exhausted. The last error is returned in the latter
    /// two cases.
    pub async fn run<T, E, Op, Fut, M>(&self, mut attempt: Op, map_error: M) -> Result<T, AppError>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        M: Fn(E) -> AppError,
    {
        let mut last_error = None;

        for (number, &delay_secs) in self.delays_secs.iter().enumerate() {
            if delay_secs > 0 {
                debug!("Waiting {delay_secs}s before retrying {}", self.operation);
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            }

            let error =
                match with_deadline(self.timeout, self.operation, attempt(), &map_error).await {
                    Ok(value) => return Ok(value),
                    Err(error) => error,
                };
            debug!(
                "{} attempt {}/{} failed: {error}",
                self.operation,
                number + 1,
                self.delays_secs.len()
            );
            if !error.is_retryable() {
                return Err(error);
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::message(format!("{} was not attempted", self.operation))
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::{Attempts, with_deadline};
    use crate::error::AppError;

    fn transient() -> AppError {
        AppError::timeout("Publish", 1)
    }

    #[tokio::test]
    async fn deadline_passes_value_and_maps_errors() {
        let value = with_deadline(
            Duration::from_secs(1),
            "Feedback",
            async { Ok::<_, &'static str>("sent") },
            AppError::from,
        )
        .await
        .expect("value should pass through");
        assert_eq!(value, "sent");

        let error = with_deadline(
            Duration::from_secs(1),
            "Feedback",
            async { Err::<(), _>("endpoint refused") },
            AppError::from,
        )
        .await;
        assert_eq!(error, Err(AppError::message("endpoint refused")));
    }

    #[tokio::test]
    async fn deadline_reports_timeout_with_operation_name() {
        let result = with_deadline(
            Duration::from_millis(5),
            "Feedback",
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, AppError>(())
            },
            |error| error,
        )
        .await;

        assert_eq!(
            result,
            Err(AppError::Timeout {
                operation: "Feedback",
                seconds: 0,
            })
        );
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let schedule = [0, 0, 0];
        let attempts = Attempts::new("Publish", &schedule, Duration::from_secs(1));

        let result = attempts
            .run(
                move || async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(transient())
                    } else {
                        Ok(3)
                    }
                },
                |error| error,
            )
            .await
            .expect("third attempt should succeed");

        assert_eq!(result, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejected_upload_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let schedule = [0, 0, 0];
        let attempts = Attempts::new("Publish", &schedule, Duration::from_secs(1));

        let result = attempts
            .run(
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(AppError::message("401 Unauthorized"))
                },
                |error| error,
            )
            .await;

        assert_eq!(result, Err(AppError::message("401 Unauthorized")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_schedule_returns_last_error() {
        let schedule = [0, 0];
        let attempts = Attempts::new("Publish", &schedule, Duration::from_secs(1));

        let result = attempts
            .run(|| async { Err::<(), _>(transient()) }, |error| error)
            .await;

        assert_eq!(result, Err(transient()));
    }

    #[tokio::test]
    async fn empty_schedule_never_runs() {
        let attempts = Attempts::new("Publish", &[], Duration::from_secs(1));

        let result = attempts
            .run(|| async { Ok::<_, AppError>(()) }, |error| error)
            .await;

        assert_eq!(
            result,
            Err(AppError::message("Publish was not attempted"))
        );
    }
}
