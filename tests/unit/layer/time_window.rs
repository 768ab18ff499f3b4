use super::*;
use crate::foundation::core::{Canvas, Rgba8};
use crate::layer::accessor::Accessor;
use crate::layer::host::VesselLayer;
use crate::layer::path::{PathCapability, PathProps};
use crate::shader::slot::ShaderStage;
use crate::view::viewport::{ViewState, Viewport};

fn viewport() -> Viewport {
    Viewport::new(
        Canvas {
            width: 256,
            height: 256,
        },
        ViewState::default(),
    )
}

fn track_set() -> TrackSet {
    TrackSet::new(vec![Track::from_points(
        "v",
        &[(-90.0, 0.0, 100), (0.0, 0.0, 200), (90.0, 0.0, 300)],
    )])
}

fn layer(start_time: i64, end_time: i64) -> VesselLayer {
    let mut layer = VesselLayer::vessel(
        "v",
        PathProps::default(),
        TimeWindowProps {
            start_time,
            end_time,
            ..TimeWindowProps::default()
        },
    );
    layer.set_data(track_set());
    layer
}

#[test]
fn window_keeps_the_inner_fractions() {
    let out = layer(150, 250).render(&viewport(), 0).unwrap();
    let fractions: Vec<_> = out.spans.iter().map(|s| (s.segment, s.fractions)).collect();
    assert_eq!(fractions, vec![(0, (0.5, 1.0)), (1, (0.0, 0.5))]);
    assert_eq!(out.spans[0].from.x, 96.0);
    assert_eq!(out.spans[1].to.x, 160.0);
}

#[test]
fn window_sets_uniforms() {
    let out = layer(150, 250).render(&viewport(), 0).unwrap();
    assert_eq!(out.uniforms.get_f64(START_TIME), Some(150.0));
    assert_eq!(out.uniforms.get_f64(END_TIME), Some(250.0));
}

#[test]
fn inverted_window_shows_nothing() {
    let out = layer(300, 100).render(&viewport(), 0).unwrap();
    assert!(out.spans.is_empty());
}

#[test]
fn window_edges_are_inclusive() {
    let out = layer(300, 400).render(&viewport(), 0).unwrap();
    assert!(out.spans.is_empty());

    let out = layer(100, 300).render(&viewport(), 0).unwrap();
    assert_eq!(out.spans.len(), 2);
    assert_eq!(out.spans[0].fractions, (0.0, 1.0));
}

#[test]
fn moving_the_window_recomputes_no_attribute() {
    let mut l = layer(0, 1000);
    l.update().unwrap();
    assert_eq!(l.attributes().last_updated().len(), 4);

    l.set_time_window(150, 250);
    l.update().unwrap();
    assert!(l.attributes().last_updated().is_empty());
}

#[test]
fn highlight_change_touches_only_color_and_width() {
    let mut l = layer(150, 250);
    let before = l.render(&viewport(), 0).unwrap();

    let window = TimeWindow::new(180, 220);
    let props = l.path_props_mut();
    props.get_color = Accessor::highlight(window, Rgba8::new(255, 0, 0, 255), Rgba8::BLACK);
    props.get_width = Accessor::highlight(window, 5.0, 1.0);
    let after = l.render(&viewport(), 0).unwrap();

    let mut updated = l.attributes().last_updated().to_vec();
    updated.sort();
    assert_eq!(updated, vec!["colors".to_owned(), "widths".to_owned()]);

    let visible = |spans: &[crate::render::plan::PathSpan]| {
        let mut v: Vec<(usize, f64, f64)> = Vec::new();
        for s in spans {
            match v.last_mut() {
                Some(last) if last.0 == s.segment && last.2 == s.fractions.0 => {
                    last.2 = s.fractions.1
                }
                _ => v.push((s.segment, s.fractions.0, s.fractions.1)),
            }
        }
        v
    };
    assert_eq!(visible(&before.spans), visible(&after.spans));
    assert!(after.spans.len() > before.spans.len());
}

#[test]
fn custom_timestamps_invalidate_only_the_timestamp_attribute() {
    let mut l = layer(0, 10_000);
    l.update().unwrap();

    l.capability_mut().props.get_timestamps = TimestampAccessor::new(
        |t: &Track| t.timestamps().iter().map(|ts| ts * 10).collect(),
        1_i64,
    );
    l.update().unwrap();
    assert_eq!(l.attributes().last_updated(), &["timestamps".to_owned()]);
    assert_eq!(
        l.attributes().instance_value(INSTANCE_NEXT_TIMESTAMPS, 0, 1).unwrap(),
        &[3000.0]
    );
}

#[test]
fn segments_cache_follows_the_prop() {
    let mut l = layer(0, 1000);
    l.update().unwrap();
    assert_eq!(l.capability().segments().map(|s| s.len()), Some(1));
    assert_eq!(l.capability().time_origin(), 100);

    l.capability_mut().props.cache_segments = false;
    l.update().unwrap();
    assert!(l.capability().segments().is_none());

    l.capability_mut().props.cache_segments = true;
    l.update().unwrap();
    l.finalize();
    assert!(l.capability().segments().is_none());
}

#[test]
fn shaders_extend_the_inner_program() {
    let cap = TimeWindowed::new(PathCapability::default(), TimeWindowProps::default());
    let set = cap.shaders();
    assert_eq!(set.fragments.len(), 5);
    assert!(set.fragments.iter().all(|f| f.owner == "time-window"));

    for dialect in [ShaderDialect::Wgsl, ShaderDialect::Glsl] {
        let program = set.assemble(dialect).unwrap();
        assert_eq!(program.stage(ShaderStage::Fragment).matches("discard;").count(), 1);
        assert_eq!(program.vertex.matches("instanceNextTimestamps").count(), 2);
        assert!(program.vertex.contains("vTime"));
        assert!(program.fragment.contains("vTime"));
        assert!(!program.vertex.contains("discard"));
    }
}

#[test]
fn vertex_time_does_not_divide_by_segment_length() {
    for dialect in [ShaderDialect::Wgsl, ShaderDialect::Glsl] {
        let fragment = time_window_fragments()
            .into_iter()
            .find(|f| f.slot == ShaderSlot::VsMainEnd)
            .unwrap();
        let source = fragment.source(dialect).unwrap();
        assert!(source.contains("positions.y;"));
        assert!(!source.contains("vPathLength"));
    }
}

#[test]
fn timestamp_attribute_reads_start_and_next_vertex() {
    let mut l = layer(0, 1000);
    l.update().unwrap();
    let attrs = l.attributes();
    assert_eq!(attrs.instance_value(INSTANCE_TIMESTAMPS, 0, 1).unwrap(), &[200.0]);
    assert_eq!(attrs.instance_value(INSTANCE_NEXT_TIMESTAMPS, 0, 1).unwrap(), &[300.0]);
    assert_eq!(
        attrs.instance_buffer_f32(INSTANCE_TIMESTAMPS, l.capability().time_origin() as f64).unwrap(),
        vec![0.0, 100.0]
    );
}
