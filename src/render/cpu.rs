use kurbo::{BezPath, Cap, Join, PathEl, Stroke, StrokeOpts};

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{VesselError, VesselResult};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
use crate::render::plan::{PathSpan, RenderPlan};

const DEFAULT_STROKE_TOLERANCE: f64 = 0.1;

pub struct CpuBackend {
    settings: RenderSettings,
    tolerance: f64,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        let tolerance = std::env::var("VESSELTRACE_STROKE_TOLERANCE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|&t| t.is_finite() && t > 0.0)
            .unwrap_or(DEFAULT_STROKE_TOLERANCE);
        Self {
            settings,
            tolerance,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip(self, plan), fields(spans = plan.spans.len()))]
    fn render_plan(&mut self, plan: &RenderPlan) -> VesselResult<FrameRGBA> {
        let width_u16: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| VesselError::render("canvas width exceeds u16"))?;
        let height_u16: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| VesselError::render("canvas height exceeds u16"))?;
        if width_u16 == 0 || height_u16 == 0 {
            return Err(VesselError::render("canvas must be non-zero"));
        }

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let clear = self
            .settings
            .clear_rgba
            .map(|[r, g, b, a]| Rgba8::new(r, g, b, a))
            .or(plan.clear);
        if let Some(c) = clear {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width_u16),
                f64::from(height_u16),
            ));
        }

        let groups = coalesce(&plan.spans);
        tracing::debug!(polylines = groups.len(), "coalesced spans");
        for group in &groups {
            let outline = self.stroke_outline(group);
            if outline.elements().is_empty() {
                continue;
            }
            let c = group.color;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.fill_path(&bezpath_to_cpu(&outline));
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl CpuBackend {
    fn stroke_outline(&self, group: &Polyline) -> BezPath {
        let mut centerline = BezPath::new();
        let mut points = group.points.iter();
        let Some(&first) = points.next() else {
            return BezPath::new();
        };
        centerline.move_to(first);
        for &p in points {
            centerline.line_to(p);
        }

        let style = Stroke::new(group.width_px)
            .with_join(if group.joint_rounded {
                Join::Round
            } else {
                Join::Miter
            })
            .with_caps(if group.cap_rounded { Cap::Round } else { Cap::Butt });
        kurbo::stroke(centerline, &style, &StrokeOpts::default(), self.tolerance)
    }
}

/// Contiguous spans of one track sharing a style, drawn as one stroked polyline.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Polyline {
    pub(crate) points: Vec<Point>,
    pub(crate) color: Rgba8,
    pub(crate) width_px: f64,
    pub(crate) cap_rounded: bool,
    pub(crate) joint_rounded: bool,
}

/// Merge spans in paint order. Only directly consecutive spans merge, so paint order is kept.
pub(crate) fn coalesce(spans: &[PathSpan]) -> Vec<Polyline> {
    let mut out: Vec<Polyline> = Vec::new();
    let mut prev: Option<&PathSpan> = None;
    for span in spans {
        let continues = prev.is_some_and(|p| p.continues_into(span));
        if let Some(line) = out.last_mut().filter(|_| continues) {
            line.points.push(span.to);
        } else {
            out.push(Polyline {
                points: vec![span.from, span.to],
                color: span.color,
                width_px: span.width_px,
                cap_rounded: span.cap_rounded,
                joint_rounded: span.joint_rounded,
            });
        }
        prev = Some(span);
    }
    out
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
