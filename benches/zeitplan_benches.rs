use chrono::{Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zeitplan_slots::{
    bucket_by_date, historical_heat, slope_mask, time::TimeRange, working_hour_mask, Block,
    DayVector, Kernel, SlopeRange, Suggester, SuggestionConfig, SuggestionRequest, WorkingDay,
    WorkingHours,
};

fn nine_to_five() -> WorkingHours {
    WorkingHours::weekdays(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    )
}

/// Three meetings a day, every day, for the 90 days before `2021-05-31`
fn busy_calendar() -> Vec<Block> {
    let origin = Utc.with_ymd_and_hms(2021, 3, 2, 0, 0, 0).unwrap();

    (0..90)
        .flat_map(|day| {
            [(9, 60), (13, 30), (15, 90)].into_iter().map(move |(hour, minutes)| {
                let start = origin + Duration::days(day) + Duration::hours(hour);
                Block::new(start, start + Duration::minutes(minutes)).with_recipients()
            })
        })
        .collect()
}

fn masks(c: &mut Criterion) {
    let config = SuggestionConfig::default();

    c.bench_function("slope_mask", |b| {
        b.iter(|| {
            black_box(slope_mask(
                96,
                TimeRange::new(36, 68),
                SlopeRange::new(-2, 2),
                Kernel::Sigmoid,
                1.0,
                0.0,
            ))
        })
    });

    c.bench_function("working_hour_mask", |b| {
        let day = WorkingDay::Hours {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        };

        b.iter(|| black_box(working_hour_mask(&day, &config)))
    });

    c.bench_function("zip_multiplying", |b| {
        let timeline = DayVector::concat((0..14).map(|_| DayVector::filled(96, 0.9)));

        b.iter(|| black_box(timeline.zip_multiplying(4)))
    });
}

fn heat(c: &mut Criterion) {
    let config = SuggestionConfig::default();
    let history = bucket_by_date(&busy_calendar(), &Tz::UTC);

    c.bench_function("historical_heat", |b| {
        b.iter(|| black_box(historical_heat(&history, &Tz::UTC, &config)))
    });
}

fn suggest(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2021, 5, 31, 0, 0, 0).unwrap();
    let suggester = Suggester::new(nine_to_five(), busy_calendar(), SuggestionConfig::default());
    let request = SuggestionRequest::new(60, Tz::UTC, 3);

    c.bench_function("suggest_two_weeks", |b| {
        b.iter(|| black_box(suggester.suggest(&request, now)))
    });

    let month = SuggestionRequest::new(30, Tz::UTC, 10).between(now, now + Duration::days(30));
    c.bench_function("suggest_month", |b| {
        b.iter(|| black_box(suggester.suggest(&month, now)))
    });
}

criterion_group!(benches, masks, heat, suggest);
criterion_main!(benches);
