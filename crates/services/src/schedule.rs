//! Weekly trigger arithmetic for the digest job.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use domains::{DomainError, Result};

/// A fixed weekday and wall-clock time, evaluated in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    weekday: Weekday,
    time: NaiveTime,
}

impl WeeklySchedule {
    pub fn new(weekday: Weekday, hour: u32, minute: u32) -> Result<Self> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            DomainError::validation(format!("invalid schedule time {hour:02}:{minute:02}"))
        })?;
        Ok(Self { weekday, time })
    }

    /// Accepts chrono's weekday spellings (`mon`, `Monday`, ...).
    pub fn parse(weekday: &str, hour: u32, minute: u32) -> Result<Self> {
        let weekday = weekday
            .parse::<Weekday>()
            .map_err(|_| DomainError::validation(format!("invalid weekday `{weekday}`")))?;
        Self::new(weekday, hour, minute)
    }

    /// The first trigger instant strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let days_ahead = (7 + self.weekday.num_days_from_monday() as i64
            - today.weekday().num_days_from_monday() as i64)
            % 7;
        let candidate = (today + Duration::days(days_ahead))
            .and_time(self.time)
            .and_utc();
        if candidate > now {
            candidate
        } else {
            candidate + Duration::days(7)
        }
    }
}

impl Default for WeeklySchedule {
    /// Mondays at 08:00.
    fn default() -> Self {
        Self {
            weekday: Weekday::Mon,
            time: NaiveTime::MIN + Duration::hours(8),
        }
    }
}
