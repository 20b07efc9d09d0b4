use crate::config::SuggestionConfig;
use crate::data::{bucket_by_date, Block, ScoringError, SlotSuggestion, WorkingHours};
use crate::heat::{historical_heat, user_heat};
use crate::suggest::{suggest, SearchWindow};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What the caller asks for. `start` defaults to now and `end` to
/// `horizon_days` past `start`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SuggestionRequest {
    pub duration_minutes: u32,
    pub timezone: Tz,
    pub count: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end: Option<DateTime<Utc>>,
}

impl SuggestionRequest {
    pub fn new(duration_minutes: u32, timezone: Tz, count: usize) -> Self {
        SuggestionRequest {
            duration_minutes,
            timezone,
            count,
            start: None,
            end: None,
        }
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Fills in defaults and checks the request.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use chrono_tz::Tz;
    /// use zeitplan_slots::{SuggestionConfig, SuggestionRequest};
    ///
    /// let now = Utc.with_ymd_and_hms(2021, 5, 31, 0, 0, 0).unwrap();
    /// let window = SuggestionRequest::new(60, Tz::UTC, 3)
    ///     .resolve(now, &SuggestionConfig::default())
    ///     .unwrap();
    ///
    /// assert_eq!(window.start, now);
    /// assert_eq!(window.end, now + Duration::days(14));
    /// assert_eq!(window.duration, Duration::minutes(60));
    ///
    /// assert!(SuggestionRequest::new(0, Tz::UTC, 3)
    ///     .resolve(now, &SuggestionConfig::default())
    ///     .is_err());
    /// ```
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        config: &SuggestionConfig,
    ) -> Result<SearchWindow, ScoringError> {
        if self.duration_minutes == 0 {
            return Err(ScoringError::invalid("meeting duration must be positive"));
        }

        let start = self.start.unwrap_or(now);
        let end = self
            .end
            .unwrap_or_else(|| start + Duration::days(i64::from(config.horizon_days)));

        if end < start {
            return Err(ScoringError::invalid(format!(
                "search ends at {} before it starts at {}",
                end, start
            )));
        }

        Ok(SearchWindow {
            timezone: self.timezone,
            start,
            end,
            duration: Duration::minutes(i64::from(self.duration_minutes)),
            count: self.count,
        })
    }
}

/// Where the user's weekly working hours come from.
pub trait WorkingHoursSource {
    fn working_hours(&self) -> WorkingHours;
}

impl WorkingHoursSource for WorkingHours {
    fn working_hours(&self) -> WorkingHours {
        self.clone()
    }
}

/// Where calendar blocks come from. Implementations return every block
/// overlapping `[from, to)`.
pub trait BlockSource {
    fn blocks_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Block>;
}

impl BlockSource for [Block] {
    fn blocks_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Block> {
        self.iter()
            .filter(|block| block.overlaps(from, to))
            .cloned()
            .collect()
    }
}

impl BlockSource for Vec<Block> {
    fn blocks_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Block> {
        self.as_slice().blocks_between(from, to)
    }
}

/// Runs the whole pipeline for one user: history into heat, heat into user
/// heat for the searched dates, user heat into suggestions.
pub struct Suggester<W, B> {
    pub working_hours: W,
    pub blocks: B,
    pub config: SuggestionConfig,
}

impl<W, B> Suggester<W, B>
where
    W: WorkingHoursSource,
    B: BlockSource,
{
    pub fn new(working_hours: W, blocks: B, config: SuggestionConfig) -> Self {
        Suggester {
            working_hours,
            blocks,
            config,
        }
    }

    pub fn suggest(
        &self,
        request: &SuggestionRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<SlotSuggestion>, ScoringError> {
        self.config.validate()?;

        let window = request.resolve(now, &self.config)?;
        let tz = window.timezone;
        let working_hours = self.working_hours.working_hours();

        let lookback = now - Duration::days(i64::from(self.config.lookback_days));
        let history = bucket_by_date(&self.blocks.blocks_between(lookback, now), &tz);
        let upcoming = bucket_by_date(&self.blocks.blocks_between(window.start, window.end), &tz);
        debug!(
            "{} days of history, {} days with upcoming blocks",
            history.len(),
            upcoming.len()
        );

        let historical = historical_heat(&history, &tz, &self.config)?;
        let heat = user_heat(
            &historical,
            &working_hours,
            &upcoming,
            window.dates(),
            &tz,
            &self.config,
        )?;

        let suggestions = suggest(&heat, &working_hours, &upcoming, &window, &self.config)?;
        info!(
            "suggested {} of {} slots of {} minutes in {}",
            suggestions.len(),
            request.count,
            request.duration_minutes,
            tz.name()
        );

        Ok(suggestions)
    }
}
