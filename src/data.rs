use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Vector dimensions differ. Expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl ScoringError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ScoringError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// The working window of a single day of the week, in the local time of the
/// request's timezone.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", tag = "kind"))]
pub enum WorkingDay {
    #[default]
    Off,
    AllDay,
    /// An `end` of 00:00 reads as midnight at the end of the day.
    Hours { start: NaiveTime, end: NaiveTime },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorkingHours {
    pub days: HashMap<Weekday, WorkingDay>,
}

impl WorkingHours {
    pub fn new(days: HashMap<Weekday, WorkingDay>) -> Self {
        WorkingHours { days }
    }

    /// The same `start..end` window on Monday through Friday, weekends off.
    ///
    /// # Examples
    /// ```
    /// use chrono::{NaiveTime, Weekday};
    /// use zeitplan_slots::{WorkingDay, WorkingHours};
    ///
    /// let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    /// let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
    /// let hours = WorkingHours::weekdays(nine, five);
    ///
    /// assert_eq!(hours.get(Weekday::Wed), WorkingDay::Hours { start: nine, end: five });
    /// assert_eq!(hours.get(Weekday::Sun), WorkingDay::Off);
    /// ```
    pub fn weekdays(start: NaiveTime, end: NaiveTime) -> Self {
        let days = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ]
        .into_iter()
        .map(|day| (day, WorkingDay::Hours { start, end }))
        .collect();

        WorkingHours { days }
    }

    pub fn with_day(mut self, weekday: Weekday, day: WorkingDay) -> Self {
        self.days.insert(weekday, day);
        self
    }

    /// Days without an entry are days off.
    pub fn get(&self, weekday: Weekday) -> WorkingDay {
        self.days.get(&weekday).copied().unwrap_or_default()
    }
}

/// A period on the user's calendar. Blocks are facts handed to us by the
/// calendar source and are never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Block {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub all_day: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_recipients: bool,
}

impl Block {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Block {
            start,
            end,
            all_day: false,
            has_recipients: false,
        }
    }

    pub fn all_day(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Block {
            all_day: true,
            ..Block::new(start, end)
        }
    }

    pub fn with_recipients(mut self) -> Self {
        self.has_recipients = true;
        self
    }

    /// All-day entries (holidays, reminders, out-of-office banners) do not
    /// occupy time.
    pub fn is_busy(&self) -> bool {
        !self.all_day && self.end > self.start
    }

    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start < to && from < self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SlotSuggestion {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub score: f64,
}

pub type BlocksByDate = BTreeMap<NaiveDate, Vec<Block>>;

/// Files every block under each local date it touches in `tz`. A block ending
/// exactly at local midnight does not touch the following date.
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use chrono_tz::Tz;
/// use zeitplan_slots::{bucket_by_date, Block};
///
/// let overnight = Block::new(
///     Utc.with_ymd_and_hms(2021, 6, 1, 22, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2021, 6, 2, 2, 0, 0).unwrap(),
/// );
/// let buckets = bucket_by_date(&[overnight], &Tz::UTC);
///
/// assert_eq!(
///     buckets.keys().copied().collect::<Vec<_>>(),
///     vec![
///         NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2021, 6, 2).unwrap(),
///     ]
/// );
/// ```
pub fn bucket_by_date(blocks: &[Block], tz: &Tz) -> BlocksByDate {
    let mut buckets = BlocksByDate::new();

    for block in blocks.iter().filter(|block| block.end > block.start) {
        let first = block.start.with_timezone(tz).date_naive();
        let last = (block.end - Duration::nanoseconds(1))
            .with_timezone(tz)
            .date_naive();

        for date in first.iter_days().take_while(|date| *date <= last) {
            buckets.entry(date).or_default().push(block.clone());
        }
    }

    buckets
}
