use ab_insight::{compare, describe, AnalysisError, GroupSample, Verdict, DEFAULT_ALPHA};

const SAMPLES: [(u64, u64); 8] = [
    (0, 1),
    (1, 1),
    (0, 10),
    (3, 10),
    (30, 150),
    (45, 150),
    (999, 1000),
    (12, 5000),
];

#[test]
fn test_rates_and_p_values_stay_in_range() {
    for &(sc, nc) in &SAMPLES {
        for &(st, nt) in &SAMPLES {
            let result =
                compare(GroupSample::new(sc, nc), GroupSample::new(st, nt), DEFAULT_ALPHA).unwrap();

            assert!((0.0..=1.0).contains(&result.rate_control));
            assert!((0.0..=1.0).contains(&result.rate_treatment));
            assert!((-1.0..=1.0).contains(&result.uplift));
            assert!((0.0..=1.0).contains(&result.p_value));
            assert!(result.ci_lower <= result.uplift && result.uplift <= result.ci_upper);
            assert_eq!(result.significant, result.p_value < DEFAULT_ALPHA);
        }
    }
}

#[test]
fn test_swapping_groups_mirrors_result() {
    for &(sc, nc) in &SAMPLES {
        for &(st, nt) in &SAMPLES {
            let a = GroupSample::new(sc, nc);
            let b = GroupSample::new(st, nt);
            let forward = compare(a, b, DEFAULT_ALPHA).unwrap();
            let backward = compare(b, a, DEFAULT_ALPHA).unwrap();

            assert_eq!(forward.uplift, -backward.uplift);
            assert_eq!(forward.z_score, -backward.z_score);
            assert_eq!(forward.p_value, backward.p_value);
            assert_eq!(forward.significant, backward.significant);
        }
    }
}

#[test]
fn test_equal_samples_never_significant() {
    for &(s, n) in &SAMPLES {
        let result = compare(GroupSample::new(s, n), GroupSample::new(s, n), DEFAULT_ALPHA).unwrap();

        assert_eq!(result.uplift, 0.0);
        assert_eq!(result.z_score, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
        assert!(!result.significant);
        assert_eq!(describe(&result, DEFAULT_ALPHA).verdict, Verdict::NotSignificant);
    }
}

#[test]
fn test_out_of_range_samples_fail_fast() {
    let cases = [
        (GroupSample::new(0, 0), GroupSample::new(0, 10)),
        (GroupSample::new(0, 10), GroupSample::new(0, 0)),
        (GroupSample::new(11, 10), GroupSample::new(0, 10)),
        (GroupSample::new(0, 10), GroupSample::new(101, 100)),
    ];
    for (control, treatment) in cases {
        let err = compare(control, treatment, DEFAULT_ALPHA).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }
}

#[test]
fn test_larger_samples_tighten_interval() {
    let small = compare(GroupSample::new(20, 100), GroupSample::new(30, 100), DEFAULT_ALPHA).unwrap();
    let large =
        compare(GroupSample::new(200, 1000), GroupSample::new(300, 1000), DEFAULT_ALPHA).unwrap();

    assert!((small.uplift - large.uplift).abs() < 1e-12);
    assert!(large.ci_upper - large.ci_lower < small.ci_upper - small.ci_lower);
    assert!(large.p_value < small.p_value);
    assert!(large.significant);
}
