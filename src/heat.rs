use crate::config::SuggestionConfig;
use crate::data::{Block, BlocksByDate, ScoringError, WorkingHours};
use crate::mask::{block_heat, working_hour_mask, Masked};
use crate::time::{local_midnight, TimeRange};
use crate::vector::{Compose, DayVector};
use chrono::{Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DayKind {
    Workday,
    Weekend,
}

impl From<Weekday> for DayKind {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat | Weekday::Sun => DayKind::Weekend,
            Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu | Weekday::Fri => {
                DayKind::Workday
            }
        }
    }
}

/// Day vectors keyed by weekday, by concrete date, or both. A date entry wins
/// over the weekday entry for that date.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct HeatMap {
    pub by_weekday: HashMap<Weekday, DayVector>,
    pub by_date: BTreeMap<NaiveDate, DayVector>,
}

impl HeatMap {
    pub fn new() -> Self {
        HeatMap::default()
    }

    pub fn insert_weekday(&mut self, weekday: Weekday, heat: DayVector) {
        self.by_weekday.insert(weekday, heat);
    }

    pub fn insert_date(&mut self, date: NaiveDate, heat: DayVector) {
        self.by_date.insert(date, heat);
    }

    pub fn weekday(&self, weekday: Weekday) -> Option<&DayVector> {
        self.by_weekday.get(&weekday)
    }

    pub fn date(&self, date: NaiveDate) -> Option<&DayVector> {
        self.by_date.get(&date)
    }

    /// # Examples
    /// ```
    /// use chrono::{NaiveDate, Weekday};
    /// use zeitplan_slots::{DayVector, HeatMap};
    ///
    /// let mut heat = HeatMap::new();
    /// heat.insert_weekday(Weekday::Mon, DayVector::zeroes(96));
    ///
    /// let monday = NaiveDate::from_ymd_opt(2021, 5, 31).unwrap();
    /// assert_eq!(heat.lookup(monday), Some(&DayVector::zeroes(96)));
    ///
    /// heat.insert_date(monday, DayVector::ones(96));
    /// assert_eq!(heat.lookup(monday), Some(&DayVector::ones(96)));
    /// assert_eq!(heat.lookup(monday.succ_opt().unwrap()), None);
    /// ```
    pub fn lookup(&self, date: NaiveDate) -> Option<&DayVector> {
        self.date(date).or_else(|| self.weekday(date.weekday()))
    }
}

fn counts_toward_history(block: &Block, config: &SuggestionConfig) -> bool {
    block.is_busy() && (block.has_recipients || !config.meetings_only)
}

/// Accumulates how busy each interval has historically been, pooled into
/// workdays and weekends. Every weekday gets its own copy of its pool.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc, Weekday};
/// use chrono_tz::Tz;
/// use zeitplan_slots::{bucket_by_date, historical_heat, Block, SuggestionConfig};
///
/// // Tuesday 10:00 - 11:00
/// let block = Block::new(
///     Utc.with_ymd_and_hms(2021, 6, 1, 10, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2021, 6, 1, 11, 0, 0).unwrap(),
/// );
/// let history = bucket_by_date(&[block], &Tz::UTC);
/// let heat = historical_heat(&history, &Tz::UTC, &SuggestionConfig::default()).unwrap();
///
/// assert_eq!(heat.weekday(Weekday::Fri).unwrap().get(40), Some(0.1));
/// assert_eq!(heat.weekday(Weekday::Sat).unwrap().get(40), Some(0.0));
/// ```
pub fn historical_heat(
    history: &BlocksByDate,
    tz: &Tz,
    config: &SuggestionConfig,
) -> Result<HeatMap, ScoringError> {
    let resolution = config.resolution()?;
    let size = resolution.size();
    let mut pools: HashMap<DayKind, DayVector> = HashMap::new();

    for (date, blocks) in history {
        let day_start = local_midnight(*date, tz)?;

        let heat = blocks
            .iter()
            .filter(|block| counts_toward_history(block, config))
            .filter_map(|block| TimeRange::within_day(day_start, block.start, block.end, resolution))
            .map(|range| block_heat(range, resolution, config.block_heat))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .add_all(size)?;

        let pool = pools
            .entry(DayKind::from(date.weekday()))
            .or_insert_with(|| DayVector::zeroes(size));
        *pool = pool.add(&heat)?;
    }

    debug!(
        "built historical heat from {} days of blocks, peak workday heat {:.2}",
        history.len(),
        pools.get(&DayKind::Workday).map(DayVector::max).unwrap_or(0.0)
    );

    let mut heat_map = HeatMap::new();
    for weekday in WEEKDAYS {
        let pool = pools
            .get(&DayKind::from(weekday))
            .cloned()
            .unwrap_or_else(|| DayVector::zeroes(size));
        heat_map.insert_weekday(weekday, pool);
    }

    Ok(heat_map)
}

/// Expected availability for every date in `dates`: how free the date's
/// weekday historically is, lifted inside working hours, then closed by the
/// blocks already on the calendar for that date. Values lie in `[0, 1]`.
pub fn user_heat<I>(
    historical: &HeatMap,
    working_hours: &WorkingHours,
    upcoming: &BlocksByDate,
    dates: I,
    tz: &Tz,
    config: &SuggestionConfig,
) -> Result<HeatMap, ScoringError>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let size = config.resolution()?.size();
    let mut heat_map = HeatMap::new();

    for date in dates {
        let freedom = historical
            .weekday(date.weekday())
            .map(|busy| busy.normalize().complement())
            .unwrap_or_else(|| DayVector::ones(size));

        let working = working_hour_mask(&working_hours.get(date.weekday()), config)?;
        let blocks = match upcoming.get(&date) {
            Some(blocks) => blocks.as_slice().mask(date, tz, config)?,
            None => DayVector::ones(size),
        };

        let heat = freedom.add(&working)?.normalize().multiply(&blocks)?;
        trace!("user heat for {}: peak {:.2}", date, heat.max());

        heat_map.insert_date(date, heat);
    }

    Ok(heat_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bucket_by_date;
    use chrono::{NaiveTime, TimeZone, Utc};

    fn block(day: u32, from: u32, to: u32) -> Block {
        Block::new(
            Utc.with_ymd_and_hms(2021, 6, day, from, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 6, day, to, 0, 0).unwrap(),
        )
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, day).unwrap()
    }

    #[test]
    fn day_kinds() {
        assert_eq!(DayKind::from(Weekday::Mon), DayKind::Workday);
        assert_eq!(DayKind::from(Weekday::Fri), DayKind::Workday);
        assert_eq!(DayKind::from(Weekday::Sat), DayKind::Weekend);
        assert_eq!(DayKind::from(Weekday::Sun), DayKind::Weekend);
    }

    #[test]
    fn history_pools_workdays_and_weekends() {
        let config = SuggestionConfig::default();
        // Tue 1st and Wed 2nd overlap at 10:00; Sat 5th is a weekend
        let history = bucket_by_date(
            &[block(1, 9, 11), block(2, 10, 12), block(5, 14, 15)],
            &Tz::UTC,
        );
        let heat = historical_heat(&history, &Tz::UTC, &config).unwrap();

        let monday = heat.weekday(Weekday::Mon).unwrap();
        assert_eq!(monday.get(36), Some(0.1));
        assert!((monday.get(40).unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(monday.get(56), Some(0.0));
        assert_eq!(heat.weekday(Weekday::Thu), Some(monday));

        let sunday = heat.weekday(Weekday::Sun).unwrap();
        assert_eq!(sunday.get(56), Some(0.1));
        assert_eq!(sunday.get(40), Some(0.0));
    }

    #[test]
    fn history_ignores_all_day_and_optionally_solo_blocks() {
        let all_day = Block::all_day(
            Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 6, 2, 0, 0, 0).unwrap(),
        );
        let meeting = block(1, 9, 10).with_recipients();
        let focus = block(1, 14, 15);
        let history = bucket_by_date(&[all_day, meeting, focus], &Tz::UTC);

        let config = SuggestionConfig {
            meetings_only: true,
            ..SuggestionConfig::default()
        };
        let heat = historical_heat(&history, &Tz::UTC, &config).unwrap();
        let tuesday = heat.weekday(Weekday::Tue).unwrap();

        assert_eq!(tuesday.get(36), Some(0.1));
        assert_eq!(tuesday.get(56), Some(0.0));
        assert_eq!(tuesday.get(0), Some(0.0));
    }

    #[test]
    fn empty_history_is_all_zero() {
        let heat =
            historical_heat(&BlocksByDate::new(), &Tz::UTC, &SuggestionConfig::default()).unwrap();

        assert_eq!(heat.by_weekday.len(), 7);
        assert!(heat.by_weekday.values().all(|v| *v == DayVector::zeroes(96)));
    }

    #[test]
    fn user_heat_prefers_quiet_working_hours() {
        let config = SuggestionConfig::default();
        let working_hours = WorkingHours::weekdays(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        );
        // Historically busy 10:00 - 11:00 on workdays
        let history = bucket_by_date(&[block(1, 10, 11)], &Tz::UTC);
        let historical = historical_heat(&history, &Tz::UTC, &config).unwrap();
        // Already booked 14:00 - 15:00 on Monday the 7th
        let upcoming = bucket_by_date(&[block(7, 14, 15)], &Tz::UTC);

        let heat = user_heat(
            &historical,
            &working_hours,
            &upcoming,
            vec![date(7), date(12)],
            &Tz::UTC,
            &config,
        )
        .unwrap();

        let monday = heat.date(date(7)).unwrap();
        // quiet and working: (1 + 1) / 2
        assert_eq!(monday.get(48), Some(1.0));
        // historically busy but working: (0 + 1) / 2
        assert_eq!(monday.get(40), Some(0.5));
        // quiet, outside working hours: (1 + 0) / 2
        assert_eq!(monday.get(80), Some(0.5));
        // booked
        assert_eq!(monday.get(56), Some(0.0));

        // Saturday: nobody works, the day is as free as it ever was
        let saturday = heat.date(date(12)).unwrap();
        assert_eq!(saturday, &DayVector::ones(96));
        assert!(heat.date(date(8)).is_none());
    }
}
