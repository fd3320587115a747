//! SQLite usage repository implementation.
//!
//! Implements `UsageRepository` with a single upsert statement per exchange.
//! All increments happen inside `ON CONFLICT .. DO UPDATE`, so concurrent
//! recorders for the same day never lose an update.

use chrono::NaiveDate;
use quill_core::usage::repository::UsageRepository;
use quill_types::error::RepositoryError;
use quill_types::usage::{DailyUsage, ExchangeSample};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UsageRepository`.
pub struct SqliteUsageRepository {
    pool: DatabasePool,
}

impl SqliteUsageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Days are stored as ISO dates (`YYYY-MM-DD`).
fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

impl UsageRepository for SqliteUsageRepository {
    async fn record_exchange(
        &self,
        day: NaiveDate,
        sample: ExchangeSample,
    ) -> Result<(), RepositoryError> {
        let error_inc: i64 = sample.had_error as i64;
        let (time_inc, sample_inc): (i64, i64) = if sample.response_time_ms > 0 {
            (sample.response_time_ms as i64, 1)
        } else {
            (0, 0)
        };

        sqlx::query(
            r#"INSERT INTO daily_usage (day, total_messages, error_count, response_time_total_ms, response_time_samples)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(day) DO UPDATE SET
                   total_messages = total_messages + excluded.total_messages,
                   error_count = error_count + excluded.error_count,
                   response_time_total_ms = response_time_total_ms + excluded.response_time_total_ms,
                   response_time_samples = response_time_samples + excluded.response_time_samples"#,
        )
        .bind(format_day(day))
        .bind(sample.message_count as i64)
        .bind(error_inc)
        .bind(time_inc)
        .bind(sample_inc)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn usage_for_day(&self, day: NaiveDate) -> Result<Option<DailyUsage>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM daily_usage WHERE day = ?")
            .bind(format_day(day))
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let total_messages: i64 = row
            .try_get("total_messages")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let error_count: i64 = row
            .try_get("error_count")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let response_time_total_ms: i64 = row
            .try_get("response_time_total_ms")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let response_time_samples: i64 = row
            .try_get("response_time_samples")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Some(DailyUsage {
            day,
            total_messages: total_messages as u64,
            error_count: error_count as u64,
            response_time_total_ms: response_time_total_ms as u64,
            response_time_samples: response_time_samples as u64,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[tokio::test]
    async fn test_first_exchange_creates_row_lazily() {
        let repo = SqliteUsageRepository::new(test_pool().await);

        assert!(repo.usage_for_day(day()).await.unwrap().is_none());

        repo.record_exchange(
            day(),
            ExchangeSample {
                message_count: 2,
                response_time_ms: 150,
                had_error: false,
            },
        )
        .await
        .unwrap();

        let usage = repo.usage_for_day(day()).await.unwrap().unwrap();
        assert_eq!(usage.total_messages, 2);
        assert_eq!(usage.error_count, 0);
        assert_eq!(usage.response_time_total_ms, 150);
        assert_eq!(usage.response_time_samples, 1);
    }

    #[tokio::test]
    async fn test_increments_accumulate() {
        let repo = SqliteUsageRepository::new(test_pool().await);

        repo.record_exchange(
            day(),
            ExchangeSample {
                message_count: 2,
                response_time_ms: 100,
                had_error: false,
            },
        )
        .await
        .unwrap();
        repo.record_exchange(
            day(),
            ExchangeSample {
                message_count: 1,
                response_time_ms: 300,
                had_error: true,
            },
        )
        .await
        .unwrap();

        let usage = repo.usage_for_day(day()).await.unwrap().unwrap();
        assert_eq!(usage.total_messages, 3);
        assert_eq!(usage.error_count, 1);
        assert_eq!(usage.response_time_total_ms, 400);
        assert_eq!(usage.response_time_samples, 2);
        assert_eq!(usage.average_response_time_ms(), Some(200));
    }

    #[tokio::test]
    async fn test_zero_response_time_not_sampled() {
        let repo = SqliteUsageRepository::new(test_pool().await);

        repo.record_exchange(
            day(),
            ExchangeSample {
                message_count: 1,
                response_time_ms: 0,
                had_error: true,
            },
        )
        .await
        .unwrap();

        let usage = repo.usage_for_day(day()).await.unwrap().unwrap();
        assert_eq!(usage.response_time_samples, 0);
        assert_eq!(usage.average_response_time_ms(), None);
    }

    #[tokio::test]
    async fn test_days_are_independent() {
        let repo = SqliteUsageRepository::new(test_pool().await);
        let other_day = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();

        repo.record_exchange(
            day(),
            ExchangeSample {
                message_count: 2,
                response_time_ms: 100,
                had_error: false,
            },
        )
        .await
        .unwrap();

        assert!(repo.usage_for_day(other_day).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_recorders_lose_no_increment() {
        let repo = Arc::new(SqliteUsageRepository::new(test_pool().await));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.record_exchange(
                    day(),
                    ExchangeSample {
                        message_count: 1,
                        response_time_ms: 50,
                        had_error: false,
                    },
                )
                .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let usage = repo.usage_for_day(day()).await.unwrap().unwrap();
        assert_eq!(usage.total_messages, 2);
        assert_eq!(usage.response_time_samples, 2);
    }
}
