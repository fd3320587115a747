//! UsageRepository trait definition.
//!
//! One roll-up row per calendar day, incremented atomically. The storage
//! layer must use an upsert-with-increment primitive, not read-modify-write
//! in application code, so concurrent exchanges never lose an update.

use chrono::NaiveDate;
use quill_types::error::RepositoryError;
use quill_types::usage::{DailyUsage, ExchangeSample};

/// Repository trait for daily usage roll-ups.
pub trait UsageRepository: Send + Sync {
    /// Atomically apply one exchange's increments to a day's record.
    ///
    /// Creates the row lazily on the first exchange of the day. The response
    /// time is recorded as a sample only when greater than zero.
    fn record_exchange(
        &self,
        day: NaiveDate,
        sample: ExchangeSample,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch the roll-up for a day, `None` when no exchange happened.
    fn usage_for_day(
        &self,
        day: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Option<DailyUsage>, RepositoryError>> + Send;
}
