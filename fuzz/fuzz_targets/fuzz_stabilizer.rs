#![no_main]
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stabilizer_core::{MAX_WINDOW_SIZE, Stabilizer};

#[derive(Debug, Arbitrary)]
struct Input {
    window_size: u32,
    weight_threshold: f64,
    resolution: f64,
    decimal_places: u8,
    readings: Vec<f64>,
}

fuzz_target!(|input: Input| {
    let n = usize::try_from(input.window_size).unwrap_or(usize::MAX);
    let Ok(mut s) = Stabilizer::new(n, input.weight_threshold) else {
        return;
    };
    assert!(n <= MAX_WINDOW_SIZE);
    for r in input.readings {
        let _ = s.add(r);
        assert!(s.abort_counter().unwrap_or(0) <= n / 2);
        let a = s
            .stabilized_reading_with(input.resolution, u32::from(input.decimal_places))
            .unwrap_or(0.0);
        let b = s
            .stabilized_reading_with(input.resolution, u32::from(input.decimal_places))
            .unwrap_or(0.0);
        assert!(a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()));
    }
});
