mod config;
mod data;
mod heat;
mod input;
mod mask;
mod suggest;
pub mod time;
mod vector;
#[cfg(feature = "wasm")]
mod wasm;

pub use config::SuggestionConfig;
pub use data::{
    bucket_by_date, Block, BlocksByDate, ScoringError, SlotSuggestion, WorkingDay, WorkingHours,
};
pub use heat::{historical_heat, user_heat, DayKind, HeatMap, WEEKDAYS};
pub use input::{BlockSource, Suggester, SuggestionRequest, WorkingHoursSource};
pub use mask::{
    block_heat, block_mask, cliff_mask, end_time_mask, slope_mask, start_time_mask,
    working_hour_mask, Kernel, Masked, SlopeRange,
};
pub use suggest::{suggest, SearchWindow};
pub use vector::{Compose, DayVector};

#[cfg(test)]
mod tests {
    use crate::{Block, SlotSuggestion, Suggester, SuggestionConfig, SuggestionRequest, WorkingHours};
    use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
    use chrono_tz::Tz;

    fn nine_to_five() -> WorkingHours {
        WorkingHours::weekdays(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        )
    }

    fn utc(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, month, day, hour, minute, 0).unwrap()
    }

    fn slot(month: u32, day: u32, hour: u32, minute: u32) -> SlotSuggestion {
        let start = utc(month, day, hour, minute);
        SlotSuggestion {
            start,
            end: start + Duration::minutes(60),
            score: 1.0,
        }
    }

    // Mon-Fri 09:00 - 17:00 UTC, no blocks, three one hour slots from Monday
    // 2021-05-31. The 09:00 interval sits on the working hours taper at 0.5, so
    // 09:00, 13:00 and 2021-06-07 10:00 are not what comes back; the first
    // fully open hours from 09:30 are.
    #[test]
    fn suggests_from_0930_not_0900_1300_or_next_monday() {
        let suggester = Suggester::new(nine_to_five(), Vec::<Block>::new(), SuggestionConfig::default());
        let now = utc(5, 31, 0, 0);

        let suggestions = suggester
            .suggest(&SuggestionRequest::new(60, Tz::UTC, 3), now)
            .unwrap();

        assert_eq!(
            suggestions,
            vec![slot(5, 31, 9, 30), slot(5, 31, 10, 30), slot(5, 31, 11, 30)]
        );
    }

    #[test]
    fn all_day_blocks_change_nothing() {
        let now = utc(5, 31, 0, 0);
        let holidays: Vec<Block> = (0..14)
            .map(|day| {
                let start = now + Duration::days(day);
                Block::all_day(start, start + Duration::days(1))
            })
            .collect();

        let with_holidays = Suggester::new(nine_to_five(), holidays, SuggestionConfig::default());
        let without = Suggester::new(nine_to_five(), Vec::<Block>::new(), SuggestionConfig::default());
        let request = SuggestionRequest::new(60, Tz::UTC, 3);

        assert_eq!(
            with_holidays.suggest(&request, now).unwrap(),
            without.suggest(&request, now).unwrap()
        );
    }

    #[test]
    fn fully_booked_calendar_suggests_nothing() {
        let now = utc(5, 31, 0, 0);
        let booked = vec![Block::new(now, now + Duration::days(14))];
        let suggester = Suggester::new(nine_to_five(), booked, SuggestionConfig::default());

        let suggestions = suggester
            .suggest(&SuggestionRequest::new(30, Tz::UTC, 5), now)
            .unwrap();

        assert!(suggestions.is_empty());
    }

    #[test]
    fn suggestions_are_ordered_and_bounded() {
        let now = utc(5, 31, 0, 0);
        let blocks = vec![
            Block::new(utc(5, 24, 13, 0), utc(5, 24, 15, 0)).with_recipients(),
            Block::new(utc(5, 31, 10, 0), utc(5, 31, 11, 30)),
            Block::new(utc(6, 1, 14, 0), utc(6, 1, 16, 0)),
        ];
        let suggester = Suggester::new(nine_to_five(), blocks, SuggestionConfig::default());
        let request = SuggestionRequest::new(45, Tz::UTC, 10);

        let suggestions = suggester.suggest(&request, now).unwrap();

        assert_eq!(suggestions.len(), 10);
        assert!(suggestions
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
        assert!(suggestions
            .iter()
            .all(|s| s.score > 0.0 && s.score <= 1.0 && s.end - s.start == Duration::minutes(45)));

        // the same inputs always produce the same answer
        assert_eq!(suggester.suggest(&request, now).unwrap(), suggestions);
    }

    #[test]
    fn suggestions_never_overlap_by_default() {
        let now = utc(5, 31, 0, 0);
        let suggester = Suggester::new(nine_to_five(), Vec::<Block>::new(), SuggestionConfig::default());

        let suggestions = suggester
            .suggest(&SuggestionRequest::new(90, Tz::UTC, 20), now)
            .unwrap();

        for (i, a) in suggestions.iter().enumerate() {
            for b in &suggestions[i + 1..] {
                assert!(a.end <= b.start || b.end <= a.start);
            }
        }

        let overlapping = Suggester::new(
            nine_to_five(),
            Vec::<Block>::new(),
            SuggestionConfig {
                allow_overlap: true,
                ..SuggestionConfig::default()
            },
        );
        let suggestions = overlapping
            .suggest(&SuggestionRequest::new(90, Tz::UTC, 2), now)
            .unwrap();
        assert_eq!(suggestions[1].start - suggestions[0].start, Duration::minutes(15));
    }

    #[test]
    fn oversized_counts_are_not_an_error() {
        let suggester = Suggester::new(nine_to_five(), Vec::<Block>::new(), SuggestionConfig::default());

        let suggestions = suggester
            .suggest(&SuggestionRequest::new(60, Tz::UTC, usize::MAX / 2), utc(5, 31, 0, 0))
            .unwrap();

        assert!(!suggestions.is_empty());
        assert!(suggestions.len() < 14 * 96);
    }

    #[test]
    fn working_hours_follow_the_requested_timezone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // local midnight on Monday May 31st
        let now = utc(5, 31, 4, 0);
        let suggester = Suggester::new(nine_to_five(), Vec::<Block>::new(), SuggestionConfig::default());

        let suggestions = suggester
            .suggest(&SuggestionRequest::new(60, tz, 1), now)
            .unwrap();

        assert_eq!(suggestions, vec![slot(5, 31, 13, 30)]);
    }
}
