use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Which publish instants an ingestion cycle treats as current
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceWindow {
    /// The UTC calendar day containing the cycle start
    #[default]
    CalendarDay,
    /// The 24 hours ending at the cycle start
    #[serde(rename = "rolling_24h")]
    Rolling24h,
}

/// Inclusive bounds resolved once per cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WindowBounds {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

impl AcceptanceWindow {
    pub fn bounds(self, now: DateTime<Utc>) -> WindowBounds {
        match self {
            AcceptanceWindow::CalendarDay => {
                let day = now.date_naive();
                let start = day.and_time(NaiveTime::MIN).and_utc();
                let end = start + Duration::days(1) - Duration::milliseconds(1);
                WindowBounds { start, end }
            }
            AcceptanceWindow::Rolling24h => WindowBounds {
                start: now - Duration::hours(24),
                end: now,
            },
        }
    }
}
