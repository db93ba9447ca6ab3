//! Activity subsystem configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Window in which a repeated LOGIN for the same workspace and user is
    /// suppressed. Applies to every LOGIN write.
    #[serde(with = "humantime_serde")]
    pub cooling_period: Duration,
    /// Upper bound on a fire-and-forget `record` call
    #[serde(with = "humantime_serde")]
    pub record_timeout: Duration,
    /// Reject metadata keys outside the per-kind allow-list instead of
    /// warning about them
    pub strict_metadata: bool,
    pub default_page_size: i64,
    pub max_page_size: i64,
    /// Size of the most-active-members ranking in stats
    pub most_active_members: i64,
    /// Lookback for the member ranking and type breakdown
    pub stats_lookback_days: i64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            cooling_period: Duration::from_secs(60 * 60),
            record_timeout: Duration::from_secs(5),
            strict_metadata: false,
            default_page_size: 50,
            max_page_size: 100,
            most_active_members: 5,
            stats_lookback_days: 30,
        }
    }
}

impl ActivityConfig {
    pub fn cooling_window(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.cooling_period)
            .unwrap_or_else(|_| chrono::Duration::minutes(60))
    }

    /// Normalize a requested page: a missing or non-positive limit becomes
    /// the default, anything above the maximum is clamped, and a negative
    /// offset becomes zero.
    pub fn page_bounds(&self, limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
        let limit = match limit {
            Some(l) if l > 0 => l.min(self.max_page_size),
            _ => self.default_page_size,
        };
        (limit, offset.unwrap_or(0).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        let config = ActivityConfig::default();
        assert_eq!(config.page_bounds(None, None), (50, 0));
        assert_eq!(config.page_bounds(Some(0), Some(-5)), (50, 0));
        assert_eq!(config.page_bounds(Some(500), Some(20)), (100, 20));
        assert_eq!(config.page_bounds(Some(10), Some(30)), (10, 30));
    }

    #[test]
    fn test_durations_parse_humantime() {
        let config: ActivityConfig =
            serde_json::from_str(r#"{"cooling_period":"3m","record_timeout":"250ms"}"#).unwrap();
        assert_eq!(config.cooling_period, Duration::from_secs(180));
        assert_eq!(config.record_timeout, Duration::from_millis(250));
        assert_eq!(config.max_page_size, 100);
    }
}
