use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::foundation::math::FRACTION_EPSILON;

/// A kept piece of one segment, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSpan {
    pub layer: usize,
    pub track: usize,
    pub segment: usize,
    pub from: Point,
    pub to: Point,
    /// Fractions along the segment covered by this span.
    pub fractions: (f64, f64),
    /// Interpolated times at both ends, when the layer carries a time varying.
    pub times: Option<(f64, f64)>,
    /// Straight-alpha color with layer opacity applied.
    pub color: Rgba8,
    pub width_px: f64,
    pub cap_rounded: bool,
    pub joint_rounded: bool,
    pub pickable: bool,
}

impl PathSpan {
    /// Interpolated time at fraction `f` of the whole segment, if `f` lies in this span.
    pub fn time_at(&self, f: f64) -> Option<f64> {
        let (t0, t1) = self.times?;
        let (f0, f1) = self.fractions;
        if f1 <= f0 {
            return Some(t0);
        }
        Some(t0 + (t1 - t0) * ((f - f0) / (f1 - f0)))
    }

    /// Return `true` when `next` continues this span on the same track without a gap or a style
    /// change.
    pub fn continues_into(&self, next: &PathSpan) -> bool {
        self.layer == next.layer
            && self.track == next.track
            && self.color == next.color
            && self.width_px == next.width_px
            && self.cap_rounded == next.cap_rounded
            && self.joint_rounded == next.joint_rounded
            && self.touches(next)
    }

    fn touches(&self, next: &PathSpan) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() < FRACTION_EPSILON;
        if next.segment == self.segment {
            close(self.fractions.1, next.fractions.0)
        } else {
            next.segment == self.segment + 1
                && close(self.fractions.1, 1.0)
                && close(next.fractions.0, 0.0)
                && (self.to - next.from).hypot() < 1e-6
        }
    }
}

/// Everything a backend needs to produce one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    pub canvas: Canvas,
    /// Straight-alpha clear color; transparent when `None`.
    pub clear: Option<Rgba8>,
    /// Spans in paint order. Later spans paint over earlier ones.
    pub spans: Vec<PathSpan>,
}

impl RenderPlan {
    pub fn new(canvas: Canvas, clear: Option<Rgba8>) -> Self {
        Self {
            canvas,
            clear,
            spans: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
