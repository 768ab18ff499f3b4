use super::*;
use crate::foundation::core::{Canvas, Rgba8};
use crate::layer::path::PathProps;
use crate::layer::time_window::TimeWindowProps;
use crate::model::track::{Track, TrackSet};
use crate::render::backend::RenderSettings;
use crate::render::cpu::CpuBackend;
use crate::view::viewport::ViewState;

fn scene() -> Scene {
    Scene {
        canvas: Canvas {
            width: 256,
            height: 256,
        },
        view: ViewState::default(),
        background: Some(Rgba8::new(255, 255, 255, 255)),
        layers: Vec::new(),
    }
}

fn layer(id: &str, lat: f64) -> VesselLayer {
    let mut layer = VesselLayer::vessel(
        id,
        PathProps::default(),
        TimeWindowProps {
            start_time: 0,
            end_time: 150,
            ..TimeWindowProps::default()
        },
    );
    layer.set_data(TrackSet::new(vec![Track::from_points(
        id,
        &[(-90.0, lat, 100), (0.0, lat, 200), (90.0, lat, 300)],
    )]));
    layer
}

#[test]
fn sweep_windows_shift_by_step() {
    let windows = sweep_windows(TimeWindow::new(0, 10), 5, 3);
    assert_eq!(
        windows,
        vec![
            TimeWindow::new(0, 10),
            TimeWindow::new(5, 15),
            TimeWindow::new(10, 20)
        ]
    );
    assert!(sweep_windows(TimeWindow::new(0, 10), 5, 0).is_empty());
}

#[test]
fn plan_collects_layers_in_order() {
    let mut layers = vec![layer("a", 0.0), layer("b", 10.0)];
    let plan = plan_scene(&scene(), &mut layers).unwrap();
    assert_eq!(plan.clear, Some(Rgba8::new(255, 255, 255, 255)));
    assert_eq!(plan.spans.len(), 2);
    assert_eq!((plan.spans[0].layer, plan.spans[1].layer), (0, 1));
}

#[test]
fn sweep_moves_windows_then_restores_them() {
    let scene = scene();
    let mut layers = vec![layer("a", 0.0)];
    let mut backend = CpuBackend::new(RenderSettings::default());
    let mut seen = Vec::new();

    render_sweep(&scene, &mut layers, &mut backend, 100, 3, |index, windows, frame| {
        assert_eq!((frame.width, frame.height), (256, 256));
        seen.push((index, windows[0]));
        Ok(())
    })
    .unwrap();

    assert_eq!(
        seen,
        vec![
            (0, TimeWindow::new(0, 150)),
            (1, TimeWindow::new(100, 250)),
            (2, TimeWindow::new(200, 350)),
        ]
    );
    assert_eq!(layers[0].capability().props.window(), TimeWindow::new(0, 150));
    assert!(layers[0].attributes().last_updated().is_empty());
}

#[test]
fn sink_errors_stop_the_sweep() {
    let scene = scene();
    let mut layers = vec![layer("a", 0.0)];
    let mut backend = CpuBackend::new(RenderSettings::default());
    let mut calls = 0;
    let err = render_sweep(&scene, &mut layers, &mut backend, 100, 5, |_, _, _| {
        calls += 1;
        Err(crate::foundation::error::VesselError::render("disk full"))
    })
    .unwrap_err();
    assert_eq!(calls, 1);
    assert!(err.to_string().contains("disk full"));
    assert_eq!(layers[0].capability().props.window(), TimeWindow::new(0, 150));
}
