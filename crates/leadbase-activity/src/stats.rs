//! Calendar windows for activity statistics
//!
//! Boundaries follow the server's local calendar: "today" starts at local
//! midnight, the week starts on Sunday, the month on its first day.
//! Workspace time zones are not applied.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindows {
    pub today: DateTime<Utc>,
    pub week: DateTime<Utc>,
    pub month: DateTime<Utc>,
    /// Start of the ranking/breakdown lookback
    pub lookback: DateTime<Utc>,
}

impl StatsWindows {
    /// Windows containing `now`, on the calendar of `tz`.
    pub fn at<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz, lookback_days: i64) -> Self {
        let today = now.with_timezone(tz).date_naive();
        let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
        let month_start = today.with_day(1).unwrap_or(today);

        Self {
            today: midnight(tz, today),
            week: midnight(tz, week_start),
            month: midnight(tz, month_start),
            lookback: now - Duration::days(lookback_days),
        }
    }
}

/// Start of `date` in `tz`. When midnight does not exist (a DST gap) the
/// earliest valid instant of the day is used.
fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
