#![no_main]
use libfuzzer_sys::fuzz_target;
use zeitplan_slots::{slope_mask, time::TimeRange, Kernel, SlopeRange};

fuzz_target!(|data: (u8, u8, SlopeRange, Kernel)| {
    let range = TimeRange::new(data.0 as usize, data.1 as usize);

    if let Ok(mask) = slope_mask(96, range, data.2, data.3, 1.0, 0.0) {
        assert_eq!(mask.len(), 96);
        assert!(
            mask.iter().all(|v| (0.0..=1.0).contains(v)),
            "Mask values leave [0, 1]: {:?}",
            mask
        );
        assert!(
            (range.start()..range.end())
                .filter(|i| {
                    *i as i64 - range.start() as i64 >= data.2.inward()
                        && range.end() as i64 - 1 - *i as i64 >= data.2.inward()
                })
                .all(|i| mask.get(i) == Some(1.0)),
            "The core of the range should be fully open"
        );
    }
});
