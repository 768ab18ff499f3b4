use kurbo::{Line, ParamCurveNearest};

use crate::foundation::core::Point;
use crate::render::plan::RenderPlan;

/// What sits under a picked point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickInfo {
    pub layer: usize,
    pub track: usize,
    pub segment: usize,
    /// Fraction along the whole segment.
    pub fraction: f64,
    /// Interpolated time at `fraction`, when the layer carries one.
    pub timestamp: Option<f64>,
}

/// Topmost pickable span within half its width plus `radius` pixels of `point`.
///
/// Only kept spans are in the plan, so discarded fragments are never returned.
pub fn pick(plan: &RenderPlan, point: Point, radius: f64) -> Option<PickInfo> {
    let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    plan.spans.iter().rev().filter(|s| s.pickable).find_map(|span| {
        let line = Line::new(span.from, span.to);
        let nearest = line.nearest(point, 1e-9);
        let reach = span.width_px / 2.0 + radius;
        if nearest.distance_sq > reach * reach {
            return None;
        }
        let (f0, f1) = span.fractions;
        let fraction = f0 + (f1 - f0) * nearest.t;
        Some(PickInfo {
            layer: span.layer,
            track: span.track,
            segment: span.segment,
            fraction,
            timestamp: span.time_at(fraction),
        })
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pick.rs"]
mod tests;
