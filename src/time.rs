use crate::data::ScoringError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use num::Integer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// How finely a day is cut into intervals.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Resolution {
    interval_minutes: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution {
            interval_minutes: 15,
        }
    }
}

impl Resolution {
    /// The interval must evenly divide a day.
    ///
    /// # Examples
    /// ```
    /// use zeitplan_slots::time::Resolution;
    ///
    /// assert_eq!(Resolution::new(15).unwrap().size(), 96);
    /// assert_eq!(Resolution::new(60).unwrap().size(), 24);
    /// assert!(Resolution::new(7).is_err());
    /// assert!(Resolution::new(0).is_err());
    /// ```
    pub fn new(interval_minutes: u32) -> Result<Resolution, ScoringError> {
        if interval_minutes == 0 || MINUTES_PER_DAY % interval_minutes != 0 {
            return Err(ScoringError::invalid(format!(
                "an interval of {} minutes does not divide a day",
                interval_minutes
            )));
        }

        Ok(Resolution { interval_minutes })
    }

    pub fn interval_minutes(self) -> u32 {
        self.interval_minutes
    }

    /// Number of intervals in a day
    pub fn size(self) -> usize {
        (MINUTES_PER_DAY / self.interval_minutes) as usize
    }

    pub fn interval(self) -> Duration {
        Duration::minutes(i64::from(self.interval_minutes))
    }

    fn interval_seconds(self) -> i64 {
        i64::from(self.interval_minutes) * 60
    }

    /// Index of the interval containing `seconds` past midnight, clamped to
    /// `[0, size]`.
    pub fn floor_index(self, seconds: i64) -> usize {
        let index = Integer::div_floor(&seconds, &self.interval_seconds());
        index.clamp(0, self.size() as i64) as usize
    }

    /// Index of the first interval boundary at or after `seconds` past
    /// midnight, clamped to `[0, size]`.
    pub fn ceil_index(self, seconds: i64) -> usize {
        let index = -Integer::div_floor(&-seconds, &self.interval_seconds());
        index.clamp(0, self.size() as i64) as usize
    }

    /// Number of whole intervals needed to hold `duration`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Duration;
    /// use zeitplan_slots::time::Resolution;
    ///
    /// let quarter_hours = Resolution::default();
    /// assert_eq!(quarter_hours.intervals_for(Duration::minutes(60)), 4);
    /// assert_eq!(quarter_hours.intervals_for(Duration::minutes(50)), 4);
    /// assert_eq!(quarter_hours.intervals_for(Duration::minutes(1)), 1);
    /// ```
    pub fn intervals_for(self, duration: Duration) -> usize {
        let intervals = -Integer::div_floor(&-duration.num_seconds(), &self.interval_seconds());
        intervals.max(0) as usize
    }

    pub fn time_floor_index(self, time: NaiveTime) -> usize {
        self.floor_index(i64::from(time.num_seconds_from_midnight()))
    }

    pub fn time_ceil_index(self, time: NaiveTime) -> usize {
        self.ceil_index(i64::from(time.num_seconds_from_midnight()))
    }
}

/// Half-open `[start, end)` range of interval indices within one day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimeRange(pub usize, pub usize);

impl TimeRange {
    /// Construct a new Time Range
    /// Range is half-open on [start, end)
    /// # Examples
    /// ```
    /// use zeitplan_slots::time::TimeRange;
    ///
    /// let test = TimeRange::new(36, 68);
    ///
    /// assert_eq!(test.start(), 36);
    /// assert_eq!(test.end(), 68);
    /// assert_eq!(test.len(), 32);
    /// ```
    pub fn new(start: usize, end: usize) -> TimeRange {
        TimeRange(start, end)
    }

    pub fn start(self) -> usize {
        self.0
    }

    pub fn end(self) -> usize {
        self.1
    }

    pub fn len(self) -> usize {
        self.1.saturating_sub(self.0)
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn contains(self, index: usize) -> bool {
        self.0 <= index && index < self.1
    }

    /// The intervals of the day starting at `day_start` that `[start, end)`
    /// touches, or `None` if it misses the day entirely.
    pub fn within_day(
        day_start: DateTime<Tz>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Option<TimeRange> {
        let day_start = day_start.with_timezone(&Utc);
        let range = TimeRange(
            resolution.floor_index((start - day_start).num_seconds()),
            resolution.ceil_index((end - day_start).num_seconds()),
        );

        if range.is_empty() {
            None
        } else {
            Some(range)
        }
    }
}

/// The instant a local date begins in `tz`. Zones that skip midnight resolve
/// to the earliest instant of that day.
pub fn local_midnight(date: NaiveDate, tz: &Tz) -> Result<DateTime<Tz>, ScoringError> {
    tz.from_local_datetime(&date.and_time(NaiveTime::default()))
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&date.and_time(NaiveTime::from_hms_opt(1, 0, 0)?))
                .earliest()
        })
        .ok_or_else(|| {
            ScoringError::invalid(format!("{} has no local start in {}", date, tz.name()))
        })
}
