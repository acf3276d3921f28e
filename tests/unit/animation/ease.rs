use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?} at 0");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?} at 1");
    }
}

#[test]
fn out_of_range_input_is_clamped() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(-3.0), 0.0);
        assert_eq!(ease.apply(4.0), 1.0);
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in [
        Ease::Linear,
        Ease::EaseIn,
        Ease::EaseOut,
        Ease::EaseInOut,
        Ease::EaseInCubic,
        Ease::EaseOutCubic,
        Ease::EaseInOutCubic,
    ] {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease:?}");
        assert!(b < c, "{ease:?}");
    }
}

#[test]
fn quadratic_closed_forms() {
    assert!((Ease::EaseIn.apply(0.5) - 0.25).abs() < 1e-12);
    assert!((Ease::EaseOut.apply(0.5) - 0.75).abs() < 1e-12);
    assert!((Ease::EaseInOut.apply(0.25) - 0.125).abs() < 1e-12);
    assert!((Ease::EaseInOut.apply(0.75) - 0.875).abs() < 1e-12);
}

#[test]
fn bounce_is_continuous_at_segment_thresholds() {
    for threshold in [1.0 / 2.75, 2.0 / 2.75, 2.5 / 2.75] {
        let before = Ease::Bounce.apply(threshold - 1e-9);
        let after = Ease::Bounce.apply(threshold + 1e-9);
        assert!((before - after).abs() < 1e-6, "jump at {threshold}");
    }
}

#[test]
fn elastic_overshoots_then_settles() {
    let peak = (1..100)
        .map(|i| Ease::Elastic.apply(f64::from(i) / 100.0))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.0);
    assert!((Ease::Elastic.apply(0.99) - 1.0).abs() < 0.01);
}

#[test]
fn serde_names_are_camel_case() {
    let e: Ease = serde_json::from_str("\"easeInOut\"").unwrap();
    assert_eq!(e, Ease::EaseInOut);
    let e: Ease = serde_json::from_str("\"bounce\"").unwrap();
    assert_eq!(e, Ease::Bounce);
}
