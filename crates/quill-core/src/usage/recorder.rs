//! Best-effort usage recording.
//!
//! `UsageRecorder` resolves "today", forwards the sample to the repository,
//! and swallows repository failures after logging them. An aggregation fault
//! must never fail the user-facing exchange.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use quill_types::usage::ExchangeSample;

use crate::usage::repository::UsageRepository;

/// Records per-exchange usage samples against "today" in UTC.
///
/// Daily boundaries use UTC midnight so "today" is the same day regardless
/// of the server's timezone.
pub struct UsageRecorder<U: UsageRepository> {
    repo: Arc<U>,
}

impl<U: UsageRepository + 'static> UsageRecorder<U> {
    pub fn new(repo: U) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    /// Access the underlying repository (stats queries).
    pub fn repo(&self) -> &U {
        &self.repo
    }

    /// Record one exchange against today's roll-up.
    ///
    /// The write runs on a detached task so it completes even when the
    /// caller is dropped mid-request (client disconnect). Failures are
    /// logged, never propagated.
    pub async fn record(&self, sample: ExchangeSample) {
        let today = Utc::now().date_naive();
        let repo = Arc::clone(&self.repo);
        let write = tokio::spawn(async move {
            if let Err(err) = repo.record_exchange(today, sample).await {
                warn!(%today, error = %err, "failed to record usage sample");
            }
        });
        // Awaited in the normal path; cancellation leaves the task running.
        let _ = write.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use quill_types::error::RepositoryError;
    use quill_types::usage::DailyUsage;
    use std::sync::Mutex;

    /// Repository double that either accumulates samples or always fails.
    struct StubUsageRepo {
        fail: bool,
        recorded: Mutex<Vec<(NaiveDate, ExchangeSample)>>,
    }

    impl StubUsageRepo {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                recorded: Mutex::new(Vec::new()),
            }
        }
    }

    impl UsageRepository for StubUsageRepo {
        async fn record_exchange(
            &self,
            day: NaiveDate,
            sample: ExchangeSample,
        ) -> Result<(), RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Connection);
            }
            self.recorded.lock().unwrap().push((day, sample));
            Ok(())
        }

        async fn usage_for_day(
            &self,
            _day: NaiveDate,
        ) -> Result<Option<DailyUsage>, RepositoryError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_record_forwards_sample_with_utc_today() {
        let recorder = UsageRecorder::new(StubUsageRepo::new(false));
        recorder
            .record(ExchangeSample {
                message_count: 2,
                response_time_ms: 120,
                had_error: false,
            })
            .await;

        let recorded = recorder.repo().recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, Utc::now().date_naive());
        assert_eq!(recorded[0].1.message_count, 2);
    }

    #[tokio::test]
    async fn test_record_write_outlives_cancelled_caller() {
        use std::future::Future;

        let recorder = UsageRecorder::new(StubUsageRepo::new(false));
        {
            let mut fut = Box::pin(recorder.record(ExchangeSample {
                message_count: 1,
                response_time_ms: 5,
                had_error: true,
            }));
            // Poll once so the write task is spawned, then drop the
            // future, as a client disconnect would.
            std::future::poll_fn(|cx| {
                let _ = fut.as_mut().poll(cx);
                std::task::Poll::Ready(())
            })
            .await;
        }

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let recorded = recorder.repo().recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].1.had_error);
    }

    #[tokio::test]
    async fn test_record_swallows_repository_failure() {
        let recorder = UsageRecorder::new(StubUsageRepo::new(true));
        // Must not panic or propagate.
        recorder
            .record(ExchangeSample {
                message_count: 1,
                response_time_ms: 0,
                had_error: true,
            })
            .await;
    }
}
