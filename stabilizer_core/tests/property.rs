use proptest::prelude::*;
use stabilizer_core::{Admission, Stabilizer};

prop_compose! {
    fn trace_strategy()(
        len in 1usize..300,
        level in -50.0f64..500.0,
        noise in 0.0f64..2.0,
        spike_every in 3usize..40,
        spike in -100.0f64..100.0,
        seed in any::<u64>(),
    ) -> Vec<f64> {
        // deterministic xorshift noise around `level` with periodic spikes
        let mut x = seed | 1;
        let mut v = Vec::with_capacity(len);
        for i in 0..len {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            let unit = (x >> 11) as f64 / (1u64 << 53) as f64;
            let mut r = level + (unit * 2.0 - 1.0) * noise;
            if i % spike_every == spike_every - 1 {
                r += spike;
            }
            v.push(r);
        }
        v
    }
}

proptest! {
    #[test]
    fn state_stays_within_bounds(
        trace in trace_strategy(),
        n in 3usize..24,
        t in 0.0f64..5.0,
        decimals in 0u32..4,
    ) {
        let mut s = Stabilizer::new(n, t).unwrap();
        let scale = 10f64.powi(decimals as i32);

        for r in &trace {
            s.add(*r).unwrap();
            prop_assert!(s.abort_counter().unwrap() <= n / 2);
            prop_assert_eq!(s.window().unwrap().len(), n);

            let out = s.stabilized_reading_with(0.1, decimals).unwrap();
            // zero-clamped or at least the clamp boundary, and on the decimal grid
            prop_assert!(out == 0.0 || out >= 0.5 - 1e-9, "out = {}", out);
            prop_assert!(((out * scale) - (out * scale).round()).abs() < 1e-6, "out = {}", out);

            // presentation is idempotent between adds
            prop_assert_eq!(s.stabilized_reading_with(0.1, decimals).unwrap(), out);
        }
    }

    #[test]
    fn window_only_holds_zeros_or_fed_readings(trace in trace_strategy(), n in 3usize..16) {
        let mut s = Stabilizer::new(n, 0.5).unwrap();
        for r in &trace {
            s.add(*r).unwrap();
        }
        for slot in s.window().unwrap() {
            prop_assert!(*slot == 0.0 || trace.contains(slot), "unexpected slot {}", slot);
        }
        let tel = s.telemetry();
        // recoveries are counted among the rejections that triggered them
        prop_assert!(tel.stuck_recoveries <= tel.rejected);
        prop_assert_eq!(
            tel.forced + tel.accepted + tel.rejected + tel.genuine_changes,
            trace.len() as u64
        );
    }

    #[test]
    fn non_finite_readings_change_nothing(trace in trace_strategy(), n in 3usize..16, at in 0usize..300) {
        let mut s = Stabilizer::new(n, 0.5).unwrap();
        let at = at.min(trace.len());
        for r in &trace[..at] {
            s.add(*r).unwrap();
        }
        let before = s.clone();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            prop_assert_eq!(s.add(bad).unwrap(), Admission::Dropped);
        }
        prop_assert_eq!(s.window(), before.window());
        prop_assert_eq!(s.force_overwrite_remaining(), before.force_overwrite_remaining());
        prop_assert_eq!(s.abort_counter(), before.abort_counter());
        prop_assert_eq!(s.telemetry().dropped, 3);
    }
}
