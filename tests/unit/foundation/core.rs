use super::*;

#[test]
fn time_window_is_inclusive_on_both_ends() {
    let w = TimeWindow::new(150, 250);
    assert!(!w.contains(149.999));
    assert!(w.contains(150.0));
    assert!(w.contains(250.0));
    assert!(!w.contains(250.001));
}

#[test]
fn inverted_window_contains_nothing() {
    let w = TimeWindow::new(300, 100);
    assert!(w.is_inverted());
    for t in [50.0, 100.0, 200.0, 300.0, 400.0] {
        assert!(!w.contains(t));
    }
}

#[test]
fn nan_time_is_never_contained() {
    assert!(!TimeWindow::new(i64::MIN, i64::MAX).contains(f64::NAN));
}

#[test]
fn shift_saturates() {
    let w = TimeWindow::new(i64::MAX - 1, i64::MAX).shift(10);
    assert_eq!(w.end, i64::MAX);
}

#[test]
fn lon_lat_serializes_as_pair() {
    let p: LonLat = serde_json::from_str("[12.5, -3.25]").unwrap();
    assert_eq!(p, LonLat::new(12.5, -3.25));
    assert_eq!(serde_json::to_string(&p).unwrap(), "[12.5,-3.25]");
}

#[test]
fn rgba_parses_arrays_and_hex() {
    let a: Rgba8 = serde_json::from_str("[255, 0, 0]").unwrap();
    assert_eq!(a, Rgba8::new(255, 0, 0, 255));
    let b: Rgba8 = serde_json::from_str("\"#00ff0080\"").unwrap();
    assert_eq!(b, Rgba8::new(0, 255, 0, 128));
    assert!(serde_json::from_str::<Rgba8>("[1, 2]").is_err());
    assert!(serde_json::from_str::<Rgba8>("\"#abc\"").is_err());
}

#[test]
fn premultiply_scales_color_channels() {
    assert_eq!(Rgba8::new(255, 128, 0, 255).premultiplied(), [255, 128, 0, 255]);
    assert_eq!(Rgba8::new(255, 255, 255, 0).premultiplied(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::new(200, 100, 50, 128).premultiplied()[3], 128);
}

#[test]
fn canvas_validation_bounds() {
    assert!(Canvas { width: 0, height: 4 }.validate().is_err());
    assert!(Canvas { width: 70_000, height: 4 }.validate().is_err());
    assert!(Canvas { width: 64, height: 64 }.validate().is_ok());
}
