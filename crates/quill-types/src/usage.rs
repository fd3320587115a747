//! Daily usage roll-up types.
//!
//! One `DailyUsage` row exists per calendar day (UTC), created lazily on the
//! first exchange of that day and incremented additively afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregated usage counters for one calendar day.
///
/// Response times are stored as a running sum plus a sample count so the
/// average can be computed without keeping individual samples. All counters
/// are monotonic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// Calendar day (UTC midnight boundary).
    pub day: NaiveDate,
    pub total_messages: u64,
    pub error_count: u64,
    pub response_time_total_ms: u64,
    pub response_time_samples: u64,
}

impl DailyUsage {
    /// Empty roll-up for a day.
    pub fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            total_messages: 0,
            error_count: 0,
            response_time_total_ms: 0,
            response_time_samples: 0,
        }
    }

    /// Average backend response time in milliseconds, `None` with no samples.
    pub fn average_response_time_ms(&self) -> Option<u64> {
        if self.response_time_samples == 0 {
            None
        } else {
            Some(self.response_time_total_ms / self.response_time_samples)
        }
    }
}

/// One exchange's contribution to the daily roll-up.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeSample {
    /// Messages persisted by the exchange (2 on success, 1 on failure).
    pub message_count: u32,
    /// Backend latency; recorded as a sample only when > 0.
    pub response_time_ms: u64,
    /// Whether the generation call failed.
    pub had_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_no_samples() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(DailyUsage::empty(day).average_response_time_ms(), None);
    }

    #[test]
    fn test_average_with_samples() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let usage = DailyUsage {
            response_time_total_ms: 900,
            response_time_samples: 3,
            ..DailyUsage::empty(day)
        };
        assert_eq!(usage.average_response_time_ms(), Some(300));
    }

    #[test]
    fn test_daily_usage_serde() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let usage = DailyUsage::empty(day);
        let json = serde_json::to_string(&usage).unwrap();
        assert!(json.contains("\"day\":\"2026-08-30\""));
        let parsed: DailyUsage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, usage);
    }
}
