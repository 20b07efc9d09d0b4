#![no_main]
use libfuzzer_sys::fuzz_target;
use zeitplan_slots::DayVector;

fuzz_target!(|data: (Vec<f64>, u8)| {
    let values: Vec<f64> = data.0.into_iter().filter(|v| v.is_finite()).collect();
    let window = data.1 as usize;
    let vector = DayVector::from(values);

    let normalized = vector.normalize();
    if vector.max() > 0.0 {
        assert!(
            normalized.iter().all(|v| *v <= 1.0),
            "Normalized values should not exceed 1: {:?}",
            normalized
        );
    } else {
        assert_eq!(normalized, vector, "Vectors without a peak are left alone");
    }

    match vector.zip_multiplying(window) {
        Ok(scores) => assert_eq!(
            scores.len(),
            (vector.len() + 1).saturating_sub(window),
            "One score per window position"
        ),
        Err(_) => assert_eq!(window, 0, "Only an empty window is rejected"),
    }
});
