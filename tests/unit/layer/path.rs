use super::*;
use crate::foundation::core::{Canvas, Point, TimeWindow};
use crate::layer::accessor::TimestampAccessor;
use crate::layer::context::DrawOutput;
use crate::layer::host::{Layer, VesselLayer};
use crate::layer::time_window::TimeWindowProps;
use crate::model::track::TrackSet;
use crate::view::viewport::{ViewState, Viewport};

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);

fn viewport() -> Viewport {
    Viewport::new(
        Canvas {
            width: 256,
            height: 256,
        },
        ViewState::default(),
    )
}

fn equator() -> TrackSet {
    TrackSet::new(vec![Track::from_points(
        "v",
        &[(-90.0, 0.0, 100), (0.0, 0.0, 200), (90.0, 0.0, 300)],
    )])
}

fn highlighted() -> PathProps {
    let window = TimeWindow::new(180, 220);
    PathProps {
        get_color: Accessor::highlight(window, RED, Rgba8::BLACK),
        get_width: Accessor::highlight(window, 5.0, 1.0),
        ..PathProps::default()
    }
}

#[test]
fn spans_carry_projected_endpoints() {
    let mut layer = Layer::new("p", PathCapability::default());
    layer.set_data(equator());
    let out = layer.render(&viewport(), 0).unwrap();

    assert_eq!(out.spans.len(), 2);
    assert_eq!(out.spans[0].from, Point::new(64.0, 128.0));
    assert_eq!(out.spans[0].to, Point::new(128.0, 128.0));
    assert_eq!(out.spans[1].to, Point::new(192.0, 128.0));
    assert!(out.spans.iter().all(|s| s.times.is_none()));
    assert!(out.stages.is_empty());
}

fn highlight_summary(out: &DrawOutput) -> Vec<(usize, (f64, f64), Rgba8, f64)> {
    out.spans
        .iter()
        .map(|s| (s.segment, s.fractions, s.color, s.width_px))
        .collect()
}

fn expected_highlight() -> Vec<(usize, (f64, f64), Rgba8, f64)> {
    vec![
        (0, (0.0, 0.8), Rgba8::BLACK, 1.0),
        (0, (0.8, 1.0), RED, 5.0),
        (1, (0.0, 0.2), RED, 5.0),
        (1, (0.2, 1.0), Rgba8::BLACK, 1.0),
    ]
}

#[test]
fn highlight_splits_without_a_time_window() {
    let mut layer = Layer::new("p", PathCapability::new(highlighted()));
    layer.set_data(equator());
    let out = layer.render(&viewport(), 0).unwrap();

    assert_eq!(highlight_summary(&out), expected_highlight());
    assert!(out.spans.iter().all(|s| s.times.is_none()));
    assert_eq!(out.stages, vec!["highlight".to_owned()]);
}

#[test]
fn highlight_switches_at_interpolated_crossings() {
    let mut layer = VesselLayer::vessel(
        "v",
        highlighted(),
        TimeWindowProps {
            start_time: 0,
            end_time: 1000,
            ..TimeWindowProps::default()
        },
    );
    layer.set_data(equator());
    let out = layer.render(&viewport(), 0).unwrap();

    assert_eq!(highlight_summary(&out), expected_highlight());
    assert_eq!(out.spans[1].times, Some((180.0, 200.0)));
    assert_eq!(out.stages, vec!["time-window".to_owned(), "highlight".to_owned()]);
}

#[test]
fn highlight_follows_raw_timestamps_when_window_times_are_rebased() {
    let mut layer = VesselLayer::vessel(
        "v",
        highlighted(),
        TimeWindowProps {
            start_time: 0,
            end_time: 1000,
            get_timestamps: TimestampAccessor::new(
                |t: &Track| t.timestamps().into_iter().map(|ts| ts - 100).collect(),
                1_i64,
            ),
            ..TimeWindowProps::default()
        },
    );
    layer.set_data(equator());
    let out = layer.render(&viewport(), 0).unwrap();

    assert_eq!(highlight_summary(&out), expected_highlight());
    assert_eq!(out.spans[1].times, Some((80.0, 100.0)));
}

#[test]
fn meter_widths_respect_pixel_bounds() {
    let props = PathProps {
        get_width: Accessor::Constant(1000.0),
        width_units: WidthUnits::Meters,
        width_min_pixels: 2.0,
        ..PathProps::default()
    };
    let mut layer = Layer::new("p", PathCapability::new(props));
    layer.set_data(equator());
    let out = layer.render(&viewport(), 0).unwrap();
    assert!(out.spans.iter().all(|s| s.width_px == 2.0));

    layer.capability_mut().props.get_width = Accessor::Constant(10.0);
    layer.capability_mut().props.width_units = WidthUnits::Pixels;
    layer.capability_mut().props.width_scale = 3.0;
    layer.capability_mut().props.width_max_pixels = 20.0;
    let out = layer.render(&viewport(), 0).unwrap();
    assert!(out.spans.iter().all(|s| s.width_px == 20.0));
}

#[test]
fn zero_width_segments_emit_nothing() {
    let props = PathProps {
        get_width: Accessor::Constant(0.0),
        ..PathProps::default()
    };
    let mut layer = Layer::new("p", PathCapability::new(props));
    layer.set_data(equator());
    assert!(layer.render(&viewport(), 0).unwrap().spans.is_empty());
}

#[test]
fn opacity_scales_alpha() {
    let props = PathProps {
        opacity: 0.5,
        ..PathProps::default()
    };
    let mut layer = Layer::new("p", PathCapability::new(props));
    layer.set_data(equator());
    let out = layer.render(&viewport(), 0).unwrap();
    assert_eq!(out.spans[0].color.a, 128);
}

#[test]
fn short_tracks_draw_nothing() {
    let mut layer = Layer::new("p", PathCapability::default());
    layer.set_data(TrackSet::new(vec![
        Track::from_points("empty", &[]),
        Track::from_points("one", &[(1.0, 1.0, 5)]),
    ]));
    assert!(layer.render(&viewport(), 0).unwrap().spans.is_empty());
}

#[test]
fn wrap_longitude_takes_the_short_way() {
    let data = TrackSet::new(vec![Track::from_points(
        "dateline",
        &[(170.0, 0.0, 0), (-170.0, 0.0, 10)],
    )]);
    let mut layer = Layer::new("p", PathCapability::default());
    layer.set_data(data);
    layer.update().unwrap();
    assert_eq!(
        layer.attributes().instance_value(INSTANCE_END_POSITIONS, 0, 0).unwrap(),
        &[-170.0, 0.0]
    );

    layer.capability_mut().props.wrap_longitude = true;
    layer.update().unwrap();
    assert_eq!(layer.attributes().last_updated(), &["positions".to_owned()]);
    assert_eq!(
        layer.attributes().instance_value(INSTANCE_END_POSITIONS, 0, 0).unwrap(),
        &[190.0, 0.0]
    );
}

#[test]
fn highlight_stage_needs_a_highlight_accessor() {
    assert!(HighlightStage::from_props(&PathProps::default()).is_none());
    assert!(HighlightStage::from_props(&highlighted()).is_some());
}
