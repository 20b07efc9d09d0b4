use crate::config::SuggestionConfig;
use crate::data::{BlocksByDate, ScoringError, SlotSuggestion, WorkingHours};
use crate::heat::HeatMap;
use crate::mask::{end_time_mask, start_time_mask, Masked};
use crate::time::{local_midnight, Resolution};
use crate::vector::DayVector;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use itertools::Itertools;
use log::{debug, trace};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A validated search: where to look, how long the meeting runs, and how many
/// suggestions to return.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchWindow {
    pub timezone: Tz,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration: Duration,
    pub count: usize,
}

impl SearchWindow {
    /// First and last local dates the half-open range `[start, end)` occupies.
    /// An `end` on local midnight does not occupy the date it falls on.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start.with_timezone(&self.timezone);
        let end = self.end.with_timezone(&self.timezone);

        let first = start.date_naive();
        let last = if end.time() == NaiveTime::default() {
            end.date_naive().pred_opt()?
        } else {
            end.date_naive()
        };

        if last < first {
            None
        } else {
            Some((first, last))
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        match self.date_span() {
            Some((first, last)) => first.iter_days().take_while(|date| *date <= last).collect(),
            None => vec![],
        }
    }
}

struct DayContext<'a> {
    heat: &'a HeatMap,
    working_hours: &'a WorkingHours,
    blocks: &'a BlocksByDate,
    window: &'a SearchWindow,
    config: &'a SuggestionConfig,
    resolution: Resolution,
    first: NaiveDate,
    last: NaiveDate,
}

impl DayContext<'_> {
    fn boundary(&self, date: NaiveDate) -> Result<DayVector, ScoringError> {
        let size = self.resolution.size();
        let mut boundary = DayVector::ones(size);

        if date == self.first {
            let start = self.window.start.with_timezone(&self.window.timezone).time();
            boundary = boundary.multiply(&start_time_mask(start, self.resolution)?)?;
        }

        let end = self.window.end.with_timezone(&self.window.timezone);
        if date == self.last && end.time() != NaiveTime::default() {
            boundary = boundary.multiply(&end_time_mask(end.time(), self.resolution)?)?;
        }

        Ok(boundary)
    }

    /// Availability of one date: heat re-weights it, everything else gates it.
    fn signal(&self, date: NaiveDate) -> Result<DayVector, ScoringError> {
        let size = self.resolution.size();
        let tz = &self.window.timezone;

        let boundary = self.boundary(date)?;
        let working = self
            .working_hours
            .get(date.weekday())
            .mask(date, tz, self.config)?;
        let blocks = match self.blocks.get(&date) {
            Some(blocks) => blocks.as_slice().mask(date, tz, self.config)?,
            None => DayVector::ones(size),
        };
        let heat = self
            .heat
            .lookup(date)
            .cloned()
            .unwrap_or_else(|| DayVector::ones(size));

        DayVector::ones(size)
            .multiply(&heat)?
            .multiply(&boundary)?
            .multiply(&working)?
            .multiply(&blocks)
    }
}

/// Picks at most `count` candidates in descending score order, earliest start
/// first among equal scores. Zero scores never qualify. Unless
/// `allow_overlap`, a candidate sharing an interval with one already taken is
/// skipped.
fn rank(scores: &DayVector, width: usize, count: usize, allow_overlap: bool) -> Vec<(usize, f64)> {
    let mut taken: Vec<(usize, f64)> = Vec::with_capacity(count.min(scores.len()));

    for (index, score) in scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| *score > 0.0)
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
    {
        if taken.len() == count {
            break;
        }

        let overlaps = taken
            .iter()
            .any(|(other, _)| index < other + width && *other < index + width);

        if allow_overlap || !overlaps {
            taken.push((index, score));
        }
    }

    taken
}

/// Scores every possible start of a `window.duration` meeting inside the
/// window and returns the best `window.count` of them.
///
/// The window is assumed valid (positive duration, end not before start);
/// `SuggestionRequest::resolve` is where that is checked. Fewer than `count`
/// suggestions come back when the calendar has no more room.
///
/// # Errors
/// Propagates `DimensionMismatch` when a heat vector does not match the
/// configured resolution, and `InvalidArgument` from mask construction.
pub fn suggest(
    heat: &HeatMap,
    working_hours: &WorkingHours,
    blocks: &BlocksByDate,
    window: &SearchWindow,
    config: &SuggestionConfig,
) -> Result<Vec<SlotSuggestion>, ScoringError> {
    let resolution = config.resolution()?;
    let width = resolution.intervals_for(window.duration);

    let (first, last) = match window.date_span() {
        Some(span) => span,
        None => return Ok(vec![]),
    };
    let dates = window.dates();

    let context = DayContext {
        heat,
        working_hours,
        blocks,
        window,
        config,
        resolution,
        first,
        last,
    };

    #[cfg(feature = "rayon")]
    let days = dates
        .par_iter()
        .map(|date| context.signal(*date))
        .collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "rayon"))]
    let days = dates
        .iter()
        .map(|date| context.signal(*date))
        .collect::<Result<Vec<_>, _>>()?;

    let timeline = DayVector::concat(days);
    let scores = timeline.zip_multiplying(width)?;
    trace!(
        "scored {} candidate starts over {} days",
        scores.len(),
        dates.len()
    );

    let ranked = rank(&scores, width, window.count, config.allow_overlap);
    debug!(
        "kept {} of {} requested suggestions between {} and {}",
        ranked.len(),
        window.count,
        window.start,
        window.end
    );

    let size = resolution.size();
    let interval = resolution.interval();

    ranked
        .into_iter()
        .map(|(index, score)| {
            // each date starts at its own local midnight, which moves across DST
            let midnight = local_midnight(dates[index / size], &window.timezone)?;
            let start = midnight.with_timezone(&Utc) + interval * (index % size) as i32;

            Ok(SlotSuggestion {
                start,
                end: start + window.duration,
                score,
            })
        })
        .collect()
}
