use crate::foundation::core::TimeWindow;
use crate::foundation::error::VesselResult;
use crate::layer::host::VesselLayer;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::plan::RenderPlan;
use crate::scene::document::Scene;
use crate::view::viewport::Viewport;

/// Update and draw every layer, in scene order, into one plan.
///
/// Layers draw bottom to top: spans of later layers paint over earlier ones.
#[tracing::instrument(skip_all, fields(layers = layers.len()))]
pub fn plan_scene(scene: &Scene, layers: &mut [VesselLayer]) -> VesselResult<RenderPlan> {
    let viewport = Viewport::new(scene.canvas, scene.view);
    let mut plan = RenderPlan::new(scene.canvas, scene.background);
    for (index, layer) in layers.iter_mut().enumerate() {
        let out = layer.render(&viewport, index)?;
        plan.spans.extend(out.spans);
    }
    Ok(plan)
}

/// Plan and rasterize one frame.
///
/// Returns a [`FrameRGBA`] containing **premultiplied** RGBA8 pixels.
pub fn render_scene(
    scene: &Scene,
    layers: &mut [VesselLayer],
    backend: &mut dyn RenderBackend,
) -> VesselResult<FrameRGBA> {
    let plan = plan_scene(scene, layers)?;
    backend.render_plan(&plan)
}

/// `frames` successive windows, each shifted by `step` from the previous one.
pub fn sweep_windows(window: TimeWindow, step: i64, frames: usize) -> Vec<TimeWindow> {
    (0..frames)
        .map(|i| window.shift(step.saturating_mul(i64::try_from(i).unwrap_or(i64::MAX))))
        .collect()
}

/// Render `frames` frames, moving every layer's window by `step` per frame.
///
/// Only the window uniforms change between frames; attributes are not recomputed. Each layer's
/// window is restored afterwards.
pub fn render_sweep<F>(
    scene: &Scene,
    layers: &mut [VesselLayer],
    backend: &mut dyn RenderBackend,
    step: i64,
    frames: usize,
    mut sink: F,
) -> VesselResult<()>
where
    F: FnMut(usize, &[TimeWindow], &FrameRGBA) -> VesselResult<()>,
{
    let base: Vec<TimeWindow> = layers
        .iter()
        .map(|l| l.capability().props.window())
        .collect();
    let schedules: Vec<Vec<TimeWindow>> = base
        .iter()
        .map(|&w| sweep_windows(w, step, frames))
        .collect();

    let mut result = Ok(());
    for frame in 0..frames {
        let windows: Vec<TimeWindow> = schedules.iter().map(|s| s[frame]).collect();
        for (layer, w) in layers.iter_mut().zip(&windows) {
            layer.set_time_window(w.start, w.end);
        }
        tracing::info!(frame, "rendering sweep frame");
        result = render_scene(scene, layers, backend)
            .and_then(|image| sink(frame, &windows, &image));
        if result.is_err() {
            break;
        }
    }

    for (layer, w) in layers.iter_mut().zip(base) {
        layer.set_time_window(w.start, w.end);
    }
    result
}

#[cfg(test)]
#[path = "../../tests/unit/scene/pipeline.rs"]
mod tests;
