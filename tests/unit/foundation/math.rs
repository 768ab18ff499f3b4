use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn interpolation_hits_endpoints_and_midpoint() {
    assert_eq!(interpolate_time(100.0, 200.0, 0.0), 100.0);
    assert_eq!(interpolate_time(100.0, 200.0, 1.0), 200.0);
    assert_eq!(interpolate_time(100.0, 200.0, 0.5), 150.0);
}

#[test]
fn interpolation_keeps_epoch_millis_precision() {
    let t0 = 1_560_610_823_000.0;
    let t1 = 1_560_610_824_000.0;
    assert_eq!(interpolate_time(t0, t1, 0.25), 1_560_610_823_250.0);
}

#[test]
fn crossing_is_strictly_interior() {
    assert!(approx(crossing_fraction(100.0, 200.0, 180.0).unwrap(), 0.8));
    assert_eq!(crossing_fraction(100.0, 200.0, 100.0), None);
    assert_eq!(crossing_fraction(100.0, 200.0, 250.0), None);
    assert_eq!(crossing_fraction(100.0, 100.0, 100.0), None);
    assert_eq!(crossing_fraction(100.0, f64::NAN, 150.0), None);
}

#[test]
fn visible_range_matches_worked_example() {
    let w = TimeWindow::new(150, 250);
    let (a, b) = visible_fraction_range(100.0, 200.0, w).unwrap();
    assert!(approx(a, 0.5) && approx(b, 1.0));
    let (a, b) = visible_fraction_range(200.0, 300.0, w).unwrap();
    assert!(approx(a, 0.0) && approx(b, 0.5));
}

#[test]
fn visible_range_handles_descending_time() {
    let (a, b) = visible_fraction_range(200.0, 100.0, TimeWindow::new(150, 250)).unwrap();
    assert!(approx(a, 0.0) && approx(b, 0.5));
}

#[test]
fn visible_range_empty_cases() {
    assert_eq!(
        visible_fraction_range(100.0, 200.0, TimeWindow::new(300, 400)),
        None
    );
    assert_eq!(
        visible_fraction_range(100.0, 200.0, TimeWindow::new(250, 150)),
        None
    );
    assert_eq!(
        visible_fraction_range(f64::NAN, 200.0, TimeWindow::new(0, 1000)),
        None
    );
    assert_eq!(
        visible_fraction_range(100.0, 100.0, TimeWindow::new(0, 1000)),
        Some((0.0, 1.0))
    );
}
