use super::*;
use crate::animation::anim::{FillMode, Timing, Tween};
use crate::animation::ease::Ease;

fn tween(property: Property, from: f64, to: f64, fill: FillMode) -> Animation {
    let mut timing = Timing::new(1.0, 1.0);
    timing.fill = fill;
    Animation::Tween(Tween {
        property,
        from,
        to,
        easing: Ease::Linear,
        timing,
    })
}

#[test]
fn default_snapshot_is_identity() {
    let s = TransformSnapshot::default();
    assert!(s.is_geometric_identity());
    assert_eq!(s.to_affine(640.0, 360.0), Affine::IDENTITY);
    assert_eq!(s.clamped_opacity(), 1.0);
}

#[test]
fn animations_fold_over_base_values() {
    let base = TransformSnapshot {
        x: 7.0,
        ..TransformSnapshot::default()
    };
    let anims = vec![
        tween(Property::Opacity, 0.0, 1.0, FillMode::Both),
        tween(Property::Scale, 1.0, 2.0, FillMode::Both),
    ];
    let s = TransformSnapshot::evaluate(&base, &anims, 1.5);
    assert_eq!(s.x, 7.0);
    assert!((s.opacity - 0.5).abs() < 1e-9);
    assert!((s.scale_x - 1.5).abs() < 1e-9);
    assert!((s.scale_y - 1.5).abs() < 1e-9);
}

#[test]
fn animations_outside_fill_window_keep_base_value() {
    let base = TransformSnapshot {
        opacity: 0.8,
        ..TransformSnapshot::default()
    };
    let anims = vec![tween(Property::Opacity, 0.0, 1.0, FillMode::None)];
    assert_eq!(TransformSnapshot::evaluate(&base, &anims, 0.0).opacity, 0.8);
    assert_eq!(TransformSnapshot::evaluate(&base, &anims, 5.0).opacity, 0.8);
    assert!((TransformSnapshot::evaluate(&base, &anims, 1.25).opacity - 0.25).abs() < 1e-9);
}

#[test]
fn later_animation_on_same_property_wins() {
    let anims = vec![
        tween(Property::X, 0.0, 10.0, FillMode::Both),
        tween(Property::X, 100.0, 200.0, FillMode::Both),
    ];
    let s = TransformSnapshot::evaluate(&TransformSnapshot::default(), &anims, 2.0);
    assert_eq!(s.x, 200.0);
}

#[test]
fn translation_maps_origin() {
    let s = TransformSnapshot {
        x: 10.0,
        y: -5.0,
        ..TransformSnapshot::default()
    };
    let p = s.to_affine(100.0, 100.0) * kurbo::Point::new(0.0, 0.0);
    assert!((p.x - 10.0).abs() < 1e-9);
    assert!((p.y + 5.0).abs() < 1e-9);
}

#[test]
fn scale_pivots_around_center() {
    let s = TransformSnapshot {
        scale_x: 2.0,
        scale_y: 2.0,
        ..TransformSnapshot::default()
    };
    let a = s.to_affine(100.0, 50.0);
    let center = a * kurbo::Point::new(50.0, 25.0);
    assert!((center.x - 50.0).abs() < 1e-9);
    assert!((center.y - 25.0).abs() < 1e-9);
    let corner = a * kurbo::Point::new(0.0, 0.0);
    assert!((corner.x + 50.0).abs() < 1e-9);
    assert!((corner.y + 25.0).abs() < 1e-9);
}

#[test]
fn rotate_y_ninety_degrees_collapses_width() {
    let s = TransformSnapshot {
        rotate_y: 90.0,
        ..TransformSnapshot::default()
    };
    let a = s.to_affine(100.0, 100.0);
    let left = a * kurbo::Point::new(0.0, 50.0);
    let right = a * kurbo::Point::new(100.0, 50.0);
    assert!((left.x - right.x).abs() < 1e-6);
}
