#![no_main]
use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Tz;
use libfuzzer_sys::fuzz_target;
use zeitplan_slots::{Block, Suggester, SuggestionConfig, SuggestionRequest, WorkingHours};

fuzz_target!(|data: (Vec<(u16, u8)>, u8, u8)| {
    #[cfg(feature = "log")]
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stdout())
        .apply();

    let now = Utc.with_ymd_and_hms(2021, 5, 31, 0, 0, 0).unwrap();
    // blocks as (quarter hours from now, length in quarter hours)
    let blocks: Vec<Block> = data
        .0
        .iter()
        .map(|(offset, length)| {
            let start = now + Duration::minutes(15 * i64::from(*offset % 1344));
            Block::new(start, start + Duration::minutes(15 * i64::from(*length)))
        })
        .collect();

    let hours = WorkingHours::weekdays(
        chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    );
    let suggester = Suggester::new(hours, blocks.clone(), SuggestionConfig::default());
    let request = SuggestionRequest::new(u32::from(data.1.max(1)), Tz::UTC, data.2 as usize);

    let suggestions = suggester
        .suggest(&request, now)
        .expect("Valid requests should always be scored");

    assert!(suggestions.len() <= data.2 as usize);
    for (i, s) in suggestions.iter().enumerate() {
        assert!(s.score > 0.0 && s.score <= 1.0, "Score out of range: {:?}", s);
        assert!(
            !blocks.iter().any(|b| b.is_busy() && b.overlaps(s.start, s.end)),
            "Suggestion {:?} overlaps a block",
            s
        );
        for other in &suggestions[i + 1..] {
            assert!(other.score <= s.score, "Suggestions out of order");
            assert!(
                other.end <= s.start || s.end <= other.start,
                "Overlapping suggestions {:?} and {:?}",
                s,
                other
            );
        }
    }
});
