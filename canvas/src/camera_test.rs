#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point / Size ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn size_center_is_half_extent() {
    assert_eq!(Size::new(800.0, 600.0).center(), Point::new(400.0, 300.0));
}

// --- View defaults ---

#[test]
fn view_default_is_identity() {
    let view = View::default();
    assert_eq!(view.x, 0.0);
    assert_eq!(view.y, 0.0);
    assert_eq!(view.scale, 1.0);
}

// --- screen_to_image / image_to_screen ---

#[test]
fn screen_to_image_identity() {
    let view = View::default();
    let p = view.screen_to_image(Point::new(50.0, 75.0));
    assert!(point_approx_eq(p, Point::new(50.0, 75.0)));
}

#[test]
fn screen_to_image_with_pan_and_scale() {
    let view = View { x: 20.0, y: 10.0, scale: 2.0 };
    let p = view.screen_to_image(Point::new(40.0, 50.0));
    assert!(point_approx_eq(p, Point::new(10.0, 20.0)));
}

#[test]
fn image_to_screen_with_pan_and_scale() {
    let view = View { x: 20.0, y: 10.0, scale: 2.0 };
    let p = view.image_to_screen(Point::new(10.0, 20.0));
    assert!(point_approx_eq(p, Point::new(40.0, 50.0)));
}

#[test]
fn screen_image_screen_round_trip_is_identity() {
    let views = [
        View::default(),
        View { x: -312.5, y: 48.25, scale: 0.1 },
        View { x: 1000.0, y: -2000.0, scale: 50.0 },
        View { x: 7.0, y: 3.0, scale: 0.186_666 },
    ];
    let points = [
        Point::new(0.0, 0.0),
        Point::new(-45.5, 12.0),
        Point::new(799.0, 599.0),
        Point::new(1e5, -1e5),
    ];
    for view in views {
        for p in points {
            let back = view.image_to_screen(view.screen_to_image(p));
            assert!((back.x - p.x).abs() < 1e-6, "{view:?} {p:?} -> {back:?}");
            assert!((back.y - p.y).abs() < 1e-6, "{view:?} {p:?} -> {back:?}");
        }
    }
}

#[test]
fn screen_dist_shrinks_as_zoom_grows() {
    let near = View { scale: 4.0, ..View::default() };
    let far = View { scale: 0.5, ..View::default() };
    assert!(approx_eq(near.screen_dist_to_image(8.0), 2.0));
    assert!(approx_eq(far.screen_dist_to_image(8.0), 16.0));
}

// --- zoom_at ---

#[test]
fn zoom_at_keeps_anchor_point_fixed() {
    let mut view = View { x: 33.0, y: -12.0, scale: 1.3 };
    let anchor = Point::new(250.0, 140.0);
    let before = view.screen_to_image(anchor);

    view.zoom_at(anchor, 0.7);

    assert!(approx_eq(view.scale, 2.0));
    let after = view.screen_to_image(anchor);
    assert!(point_approx_eq(before, after));
}

#[test]
fn zoom_at_keeps_anchor_fixed_when_zooming_out() {
    let mut view = View { x: 100.0, y: 100.0, scale: 3.0 };
    let anchor = Point::new(10.0, 470.0);
    let before = view.screen_to_image(anchor);

    view.zoom_at(anchor, -2.0);

    assert!(approx_eq(view.scale, 1.0));
    assert!(point_approx_eq(view.screen_to_image(anchor), before));
}

#[test]
fn zoom_at_clamps_to_max() {
    let mut view = View { scale: 49.95, ..View::default() };
    view.zoom_at(Point::new(0.0, 0.0), 1.0);
    assert_eq!(view.scale, MAX_SCALE);
}

#[test]
fn zoom_at_clamps_to_min() {
    let mut view = View { scale: 0.15, ..View::default() };
    view.zoom_at(Point::new(0.0, 0.0), -1.0);
    assert_eq!(view.scale, MIN_SCALE);
}

#[test]
fn zoom_at_clamped_request_still_keeps_anchor_fixed() {
    let mut view = View { x: 5.0, y: 5.0, scale: 45.0 };
    let anchor = Point::new(300.0, 200.0);
    let before = view.screen_to_image(anchor);
    view.zoom_at(anchor, 100.0);
    assert_eq!(view.scale, MAX_SCALE);
    assert!(point_approx_eq(view.screen_to_image(anchor), before));
}

// --- pan_by ---

#[test]
fn pan_by_translates_without_scaling() {
    let mut view = View { x: 10.0, y: 20.0, scale: 2.5 };
    view.pan_by(-4.0, 6.0);
    assert_eq!(view.x, 6.0);
    assert_eq!(view.y, 26.0);
    assert_eq!(view.scale, 2.5);
}

// --- fit ---

#[test]
fn fit_large_image_in_small_viewport() {
    let view = View::fit(Size::new(4000.0, 3000.0), Size::new(800.0, 600.0));
    let expected = (760.0_f64 / 4000.0).min(560.0 / 3000.0);
    assert!(approx_eq(view.scale, expected));
    assert!((view.scale - 0.1867).abs() < 1e-4);
    assert!(approx_eq(view.x, (800.0 - 4000.0 * expected) / 2.0));
    assert!(approx_eq(view.y, (600.0 - 3000.0 * expected) / 2.0));
}

#[test]
fn fit_centers_image() {
    let view = View::fit(Size::new(4000.0, 3000.0), Size::new(800.0, 600.0));
    let center = view.image_to_screen(Point::new(2000.0, 1500.0));
    assert!(point_approx_eq(center, Point::new(400.0, 300.0)));
}

#[test]
fn fit_never_upscales_small_image() {
    let view = View::fit(Size::new(100.0, 50.0), Size::new(800.0, 600.0));
    assert_eq!(view.scale, 1.0);
    assert_eq!(view.x, 350.0);
    assert_eq!(view.y, 275.0);
}

#[test]
fn fit_clamps_tiny_scale_to_minimum() {
    let view = View::fit(Size::new(100_000.0, 100_000.0), Size::new(800.0, 600.0));
    assert_eq!(view.scale, MIN_SCALE);
}

#[test]
fn fit_with_unlaid_out_viewport_stays_in_range() {
    let view = View::fit(Size::new(640.0, 480.0), Size::new(0.0, 0.0));
    assert_eq!(view.scale, MIN_SCALE);
}

// --- clamp_scale ---

#[test]
fn clamp_scale_handles_nan() {
    assert_eq!(clamp_scale(f64::NAN), MIN_SCALE);
}

#[test]
fn clamp_scale_passes_through_in_range() {
    assert_eq!(clamp_scale(2.5), 2.5);
}
