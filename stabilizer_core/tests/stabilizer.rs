use rstest::rstest;
use stabilizer_core::{Admission, Stabilizer};

/// Fresh stabilizer with the forced fill consumed at a constant `level`.
fn settled(n: usize, t: f64, level: f64) -> Stabilizer {
    let mut s = Stabilizer::new(n, t).expect("valid parameters");
    for _ in 0..n {
        s.add(level).unwrap();
    }
    assert!(s.is_settled());
    s
}

#[rstest]
#[case(3, 0.1)]
#[case(5, 0.5)]
#[case(10, 2.0)]
fn begin_yields_zero_window_and_zero_display(#[case] n: usize, #[case] t: f64) {
    let mut s = Stabilizer::new(n, t).unwrap();
    assert_eq!(s.window().unwrap(), vec![0.0; n].as_slice());
    assert_eq!(s.stabilized_reading().unwrap(), 0.0);
    assert_eq!(s.force_overwrite_remaining(), Some(n));
    assert_eq!(s.abort_counter(), Some(n / 2));
}

#[rstest]
#[case(5, 12.34, 1, 12.3)]
#[case(10, 7.0, 2, 7.0)]
#[case(3, 0.75, 1, 0.8)]
#[case(7, 1000.126, 2, 1000.13)]
fn fill_then_converge(
    #[case] n: usize,
    #[case] v: f64,
    #[case] decimals: u32,
    #[case] expected: f64,
) {
    let mut s = Stabilizer::new(n, 0.5).unwrap();
    for _ in 0..n {
        assert_eq!(s.add(v).unwrap(), Admission::Forced);
    }
    assert_eq!(s.force_overwrite_remaining(), Some(0));
    assert_eq!(s.stabilized_reading_with(0.1, decimals).unwrap(), expected);
}

#[rstest]
fn single_spike_is_rejected_and_display_holds() {
    let (n, t, m) = (10, 0.5, 100.0);
    let mut s = settled(n, t, m);
    assert_eq!(s.stabilized_reading().unwrap(), 100.0);

    assert_eq!(s.add(m + 2.0 * t).unwrap(), Admission::Rejected);
    assert!(!s.window().unwrap().contains(&(m + 2.0 * t)));

    for (i, r) in [100.1, 99.9, 100.0].iter().cycle().take(30).enumerate() {
        assert_eq!(s.add(*r).unwrap(), Admission::Accepted, "sample {i}");
        let shown = s.stabilized_reading().unwrap();
        assert!((shown - m).abs() <= 0.1 + 1e-9, "display drifted to {shown}");
    }
}

#[rstest]
#[case(5)]
#[case(8)]
#[case(10)]
fn step_change_converges_within_patience_plus_refill(#[case] n: usize) {
    let (t, m) = (0.5, 100.0);
    let target = m + 10.0 * t;
    let mut s = settled(n, t, m);
    assert_eq!(s.stabilized_reading().unwrap(), m);

    // the old level never leaves the previous slot, so the step is absorbed by
    // patience exhaustion (n / 2 rejections) followed by a refill of n writes
    let bound = n / 2 + n;
    let mut converged_at = None;
    for i in 1..=bound {
        s.add(target).unwrap();
        if s.stabilized_reading().unwrap() == target {
            converged_at = Some(i);
            break;
        }
    }
    let at = converged_at.expect("display must reach the new level");
    assert!(at <= bound);
    assert_eq!(s.telemetry().stuck_recoveries, 1);
}

#[rstest]
fn load_placed_during_fill_triggers_genuine_change_refill() {
    let n = 5;
    let mut s = Stabilizer::new(n, 1.0).unwrap();
    for v in [0.0, 0.0, 0.0, 10.0, 10.0] {
        s.add(v).unwrap();
    }
    assert_eq!(s.add(10.0).unwrap(), Admission::GenuineChange);
    assert_eq!(s.force_overwrite_remaining(), Some(n * 6));

    for _ in 0..n {
        s.add(10.0).unwrap();
    }
    assert_eq!(s.stabilized_reading().unwrap(), 10.0);
    assert!(!s.is_settled(), "refill keeps running for six window lengths");
}

#[rstest]
fn small_shift_recovers_through_patience() {
    // 0.8 above the settled level: never within threshold, never drift-flagged
    let (n, t) = (10, 0.5);
    let mut s = settled(n, t, 100.0);
    let _ = s.stabilized_reading().unwrap();

    for _ in 0..(n / 2 + n) {
        s.add(100.8).unwrap();
    }
    assert_eq!(s.telemetry().stuck_recoveries, 1);
    assert_eq!(s.telemetry().genuine_changes, 0);
    assert_eq!(s.stabilized_reading().unwrap(), 100.8);
}

#[rstest]
fn alternating_outliers_force_recovery_and_keep_filter_live() {
    let (n, t) = (10, 0.5);
    let mut s = settled(n, t, 100.0);
    let pattern = [102.0, 98.0];

    for (i, r) in pattern.iter().cycle().take(n / 2).enumerate() {
        let adm = s.add(*r).unwrap();
        if i + 1 < n / 2 {
            assert_eq!(adm, Admission::Rejected);
        } else {
            assert_eq!(adm, Admission::Recovered);
        }
    }
    assert_eq!(s.force_overwrite_remaining(), Some(n));
    assert_eq!(s.abort_counter(), Some(n / 2));

    for r in pattern.iter().cycle().take(n) {
        assert_eq!(s.add(*r).unwrap(), Admission::Forced);
    }
    assert!(
        s.window()
            .unwrap()
            .iter()
            .all(|v| *v == 102.0 || *v == 98.0)
    );

    for r in pattern.iter().cycle().take(200) {
        s.add(*r).unwrap();
    }
    let tel = s.telemetry();
    assert_eq!(tel.stuck_recoveries, 1);
    assert!(tel.genuine_changes >= 1);
    assert!(tel.forced + tel.accepted > 150, "telemetry: {tel:?}");
}

#[rstest]
#[case(0.3)]
#[case(0.49)]
#[case(0.0)]
#[case(-2.0)]
fn settled_mean_below_half_displays_zero(#[case] level: f64) {
    let mut s = settled(5, 0.5, level);
    assert_eq!(s.stabilized_reading().unwrap(), 0.0);
    assert_eq!(s.stabilized_reading_with(0.0, 3).unwrap(), 0.0);
}

#[rstest]
fn half_unit_is_not_clamped() {
    let mut s = settled(5, 0.5, 0.5);
    assert_eq!(s.stabilized_reading().unwrap(), 0.5);
}

#[rstest]
#[case(42.0)]
#[case(3.25)]
#[case(0.2)]
fn consecutive_reads_are_identical(#[case] level: f64) {
    let mut s = settled(6, 0.5, level);
    let a = s.stabilized_reading().unwrap();
    let b = s.stabilized_reading().unwrap();
    assert_eq!(a, b);
}

#[rstest]
#[case(1.25, 1.3)]
#[case(1.2499, 1.2)]
#[case(2.35, 2.4)]
#[case(0.55, 0.6)]
fn rounding_is_half_away_from_zero(#[case] mean: f64, #[case] expected: f64) {
    // window of 3: the trimmed mean is the single remaining slot, exactly `mean`
    let mut s = settled(3, 0.5, mean);
    assert_eq!(s.trimmed_mean().unwrap(), mean);
    assert_eq!(s.stabilized_reading_with(0.1, 1).unwrap(), expected);
}

#[test]
fn huge_settled_level_is_displayed_as_is() {
    let mut s = settled(3, 0.5, 1e300);
    assert_eq!(s.stabilized_reading_with(0.1, 9).unwrap(), 1e300);
    assert_eq!(s.stabilized_reading_with(0.1, 9).unwrap(), 1e300);
}

#[rstest]
fn tie_break_excludes_first_minimum_and_first_maximum() {
    let mut s = Stabilizer::new(5, 0.5).unwrap();
    // writes land in slots 1, 2, 3, 4, 0
    for v in [1.0, 9.0, 1.0, 9.0, 3.0] {
        s.add(v).unwrap();
    }
    assert_eq!(s.window().unwrap(), &[3.0, 1.0, 9.0, 1.0, 9.0]);
    // slot 1 (first 1.0) and slot 2 (first 9.0) are excluded
    let mean = s.trimmed_mean().unwrap();
    assert!((mean - 13.0 / 3.0).abs() < 1e-12, "mean = {mean}");
}

#[rstest]
fn display_resolution_gates_commits_per_call() {
    let mut s = settled(3, 5.0, 10.0);
    assert_eq!(s.stabilized_reading().unwrap(), 10.0);
    for _ in 0..3 {
        s.add(10.6).unwrap();
    }
    // moved 0.6: held with a coarse resolution, committed with a fine one
    assert_eq!(s.stabilized_reading_with(1.0, 1).unwrap(), 10.0);
    assert_eq!(s.stabilized_reading_with(0.5, 1).unwrap(), 10.6);
}
