use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn world_view() -> Viewport {
    Viewport::new(
        Canvas {
            width: 256,
            height: 256,
        },
        ViewState::default(),
    )
}

#[test]
fn zoom_zero_maps_world_onto_one_tile() {
    let vp = world_view();
    let c = vp.project(LonLat::new(0.0, 0.0));
    assert!(approx(c.x, 128.0) && approx(c.y, 128.0));

    let west = vp.project(LonLat::new(-180.0, 0.0));
    let east = vp.project(LonLat::new(90.0, 0.0));
    assert!(approx(west.x, 0.0));
    assert!(approx(east.x, 192.0));
}

#[test]
fn latitude_is_clamped_to_the_mercator_square() {
    let vp = world_view();
    let north = vp.project(LonLat::new(0.0, 89.9));
    assert!(approx(north.y, 0.0));
}

#[test]
fn view_center_lands_on_canvas_center() {
    let vp = Viewport::new(
        Canvas {
            width: 100,
            height: 60,
        },
        ViewState {
            longitude: 10.0,
            latitude: 50.0,
            zoom: 6.0,
        },
    );
    let c = vp.project(LonLat::new(10.0, 50.0));
    assert!(approx(c.x, 50.0) && approx(c.y, 30.0));
}

#[test]
fn meters_per_pixel_halves_per_zoom_level() {
    let a = Viewport::new(
        Canvas {
            width: 10,
            height: 10,
        },
        ViewState {
            zoom: 3.0,
            ..ViewState::default()
        },
    );
    let b = Viewport::new(
        Canvas {
            width: 10,
            height: 10,
        },
        ViewState {
            zoom: 4.0,
            ..ViewState::default()
        },
    );
    assert!(approx(a.meters_per_pixel() / b.meters_per_pixel(), 2.0));
}

#[test]
fn wrap_longitudes_takes_the_short_way() {
    let mut path = vec![
        LonLat::new(179.0, 0.0),
        LonLat::new(-179.0, 0.0),
        LonLat::new(-170.0, 0.0),
    ];
    wrap_longitudes(&mut path);
    assert!(approx(path[1].lon, 181.0));
    assert!(approx(path[2].lon, 190.0));
}

#[test]
fn wrap_longitudes_leaves_short_hops_alone() {
    let mut path = vec![LonLat::new(-10.0, 0.0), LonLat::new(10.0, 0.0)];
    wrap_longitudes(&mut path);
    assert!(approx(path[1].lon, 10.0));
}
