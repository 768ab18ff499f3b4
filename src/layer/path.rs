use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{LonLat, Rgba8};
use crate::foundation::error::{VesselError, VesselResult};
use crate::foundation::math::interpolate_time;
use crate::layer::accessor::{Accessor, AttributeValue, HighlightAccessor, TriggerKey};
use crate::layer::attributes::AttributeManager;
use crate::layer::capability::{RenderCapability, UpdateParams};
use crate::layer::context::{
    DrawContext, Fragment, FragmentStage, FragmentVerdict, SegmentVaryings, TIME_VARYING,
};
use crate::model::track::Track;
use crate::render::plan::PathSpan;
use crate::shader::base::INSTANCED_PATH;
use crate::shader::program::ShaderSet;
use crate::view::viewport::wrap_longitudes;

/// Accessor feeding the position attribute.
pub const GET_PATH: &str = "getPath";
/// Accessor feeding the color attribute.
pub const GET_COLOR: &str = "getColor";
/// Accessor feeding the width attribute.
pub const GET_WIDTH: &str = "getWidth";

/// Varying carrying the raw waypoint timestamp, whatever `getTimestamps` returns.
pub const WAYPOINT_TIME_VARYING: &str = "vWaypointTime";

/// Shader attribute for the segment start position.
pub const INSTANCE_START_POSITIONS: &str = "instanceStartPositions";
/// Shader attribute for the segment end position.
pub const INSTANCE_END_POSITIONS: &str = "instanceEndPositions";
/// Shader attribute for the segment color.
pub const INSTANCE_COLORS: &str = "instanceColors";
/// Shader attribute for the segment width.
pub const INSTANCE_STROKE_WIDTHS: &str = "instanceStrokeWidths";

/// Unit of the values returned by `get_width`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthUnits {
    /// Screen pixels.
    #[default]
    Pixels,
    /// Meters on the ground at the view latitude.
    Meters,
}

/// Props of the base path capability.
#[derive(Clone, Debug)]
pub struct PathProps {
    pub get_color: Accessor<Rgba8>,
    pub get_width: Accessor<f64>,
    pub width_units: WidthUnits,
    pub width_scale: f64,
    pub width_min_pixels: f64,
    pub width_max_pixels: f64,
    pub wrap_longitude: bool,
    pub joint_rounded: bool,
    pub cap_rounded: bool,
    pub pickable: bool,
    pub opacity: f32,
}

impl Default for PathProps {
    fn default() -> Self {
        Self {
            get_color: Accessor::Constant(Rgba8::BLACK),
            get_width: Accessor::Constant(1.0),
            width_units: WidthUnits::Pixels,
            width_scale: 1.0,
            width_min_pixels: 0.0,
            width_max_pixels: f64::MAX,
            wrap_longitude: false,
            joint_rounded: false,
            cap_rounded: false,
            pickable: false,
            opacity: 1.0,
        }
    }
}

/// Instanced path rendering: one instance per segment between consecutive waypoints.
#[derive(Clone, Debug, Default)]
pub struct PathCapability {
    pub props: PathProps,
    applied: BTreeMap<&'static str, TriggerKey>,
}

impl PathCapability {
    pub fn new(props: PathProps) -> Self {
        Self {
            props,
            applied: BTreeMap::new(),
        }
    }

    fn trigger_keys(&self) -> [(&'static str, TriggerKey); 3] {
        [
            (GET_PATH, TriggerKey::from(i64::from(self.props.wrap_longitude))),
            (GET_COLOR, self.props.get_color.trigger_key()),
            (GET_WIDTH, self.props.get_width.trigger_key()),
        ]
    }

    fn width_to_pixels(&self, width: f64, meters_per_pixel: f64) -> f64 {
        let per_unit = match self.props.width_units {
            WidthUnits::Pixels => 1.0,
            WidthUnits::Meters => 1.0 / meters_per_pixel,
        };
        (width * self.props.width_scale * per_unit)
            .max(self.props.width_min_pixels)
            .min(self.props.width_max_pixels)
    }
}

impl RenderCapability for PathCapability {
    fn id(&self) -> String {
        "path".to_owned()
    }

    fn shaders(&self) -> ShaderSet {
        ShaderSet::new(INSTANCED_PATH)
    }

    fn initialize_attributes(&self, attributes: &mut AttributeManager) -> VesselResult<()> {
        attributes.add_instanced(
            "positions",
            2,
            GET_PATH,
            &[(INSTANCE_START_POSITIONS, 0), (INSTANCE_END_POSITIONS, 1)],
        )?;
        attributes.add_instanced("colors", Rgba8::SIZE, GET_COLOR, &[(INSTANCE_COLORS, 0)])?;
        attributes.add_instanced("widths", f64::SIZE, GET_WIDTH, &[(INSTANCE_STROKE_WIDTHS, 0)])?;
        Ok(())
    }

    fn evaluate_accessor(&self, accessor: &str, track: &Track, out: &mut Vec<f64>) -> bool {
        match accessor {
            GET_PATH => {
                let mut path = track.path();
                if self.props.wrap_longitude {
                    wrap_longitudes(&mut path);
                }
                for p in path {
                    out.push(p.lon);
                    out.push(p.lat);
                }
                true
            }
            GET_COLOR => {
                self.props.get_color.evaluate(track, out);
                true
            }
            GET_WIDTH => {
                self.props.get_width.evaluate(track, out);
                true
            }
            _ => false,
        }
    }

    fn update_state(&mut self, _params: &UpdateParams<'_>, attributes: &mut AttributeManager) {
        for (accessor, key) in self.trigger_keys() {
            if self.applied.get(accessor) != Some(&key) {
                tracing::debug!(accessor, "update trigger changed");
                attributes.invalidate(accessor);
                self.applied.insert(accessor, key);
            }
        }
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) -> VesselResult<()> {
        let attributes = ctx.attributes();
        let data = ctx.data();
        let viewport = ctx.viewport();
        for name in ["positions", "colors", "widths"] {
            match attributes.get(name) {
                Some(attr) if !attr.needs_update() => {}
                Some(_) => {
                    return Err(VesselError::render(format!(
                        "attribute '{name}' is stale at draw time"
                    )));
                }
                None => {
                    return Err(VesselError::render(format!(
                        "attribute '{name}' is not registered"
                    )));
                }
            }
        }

        let highlight = HighlightStage::from_props(&self.props);
        if let Some(stage) = highlight {
            ctx.push_stage(Box::new(stage));
        }
        let meters_per_pixel = viewport.meters_per_pixel();
        let layer = ctx.layer_index();

        for (track_index, track) in data.tracks.iter().enumerate() {
            for segment in 0..track.segment_count() {
                let read = |name: &str| attributes.instance_value(name, track_index, segment);
                let (Some(start), Some(end)) =
                    (read(INSTANCE_START_POSITIONS), read(INSTANCE_END_POSITIONS))
                else {
                    continue;
                };
                let base = Fragment {
                    color: Rgba8::read(read(INSTANCE_COLORS).unwrap_or_default()),
                    width: f64::read(read(INSTANCE_STROKE_WIDTHS).unwrap_or_default()),
                };

                let mut varyings = ctx.evaluate_varyings(track_index, segment);
                if highlight.is_some()
                    && let Some([w0, w1]) = track.waypoints.get(segment..segment + 2)
                {
                    varyings.insert(
                        WAYPOINT_TIME_VARYING,
                        w0.timestamp as f64,
                        w1.timestamp as f64,
                    );
                }
                let a = viewport.project(LonLat::new(start[0], start[1]));
                let b = viewport.project(LonLat::new(end[0], end[1]));
                let times = varyings.endpoints(TIME_VARYING);

                for span in ctx.resolve_spans(&varyings, base, &[]) {
                    let width_px = self.width_to_pixels(span.fragment.width, meters_per_pixel);
                    if !(width_px > 0.0) || !width_px.is_finite() {
                        continue;
                    }
                    ctx.emit(PathSpan {
                        layer,
                        track: track_index,
                        segment,
                        from: a.lerp(b, span.from),
                        to: a.lerp(b, span.to),
                        fractions: (span.from, span.to),
                        times: times.map(|(t0, t1)| {
                            (
                                interpolate_time(t0, t1, span.from),
                                interpolate_time(t0, t1, span.to),
                            )
                        }),
                        color: span.fragment.color.with_opacity(self.props.opacity),
                        width_px,
                        cap_rounded: self.props.cap_rounded,
                        joint_rounded: self.props.joint_rounded,
                        pickable: self.props.pickable,
                    });
                }
            }
        }
        Ok(())
    }

    fn pickable(&self) -> bool {
        self.props.pickable
    }
}

/// Switches color and width at the exact interpolated crossings of the highlight bounds.
///
/// Bounds are tested against raw waypoint timestamps, so a rebased `getTimestamps` does not move
/// the highlight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightStage {
    color: Option<HighlightAccessor<Rgba8>>,
    width: Option<HighlightAccessor<f64>>,
}

impl HighlightStage {
    /// Stage for the highlight accessors in `props`, if there are any.
    pub fn from_props(props: &PathProps) -> Option<Self> {
        let stage = Self {
            color: props.get_color.as_highlight().copied(),
            width: props.get_width.as_highlight().copied(),
        };
        (stage.color.is_some() || stage.width.is_some()).then_some(stage)
    }
}

impl FragmentStage for HighlightStage {
    fn name(&self) -> &str {
        "highlight"
    }

    fn split_points(&self, varyings: &SegmentVaryings, out: &mut Vec<f64>) {
        let windows = self
            .color
            .map(|h| h.window)
            .into_iter()
            .chain(self.width.map(|h| h.window));
        for window in windows {
            for bound in [window.start, window.end] {
                out.extend(varyings.crossing(WAYPOINT_TIME_VARYING, bound as f64));
            }
        }
    }

    fn shade(&self, varyings: &SegmentVaryings, f: f64, fragment: &mut Fragment)
    -> FragmentVerdict {
        let Some(t) = varyings.value_at(WAYPOINT_TIME_VARYING, f) else {
            return FragmentVerdict::Keep;
        };
        if let Some(h) = &self.color {
            fragment.color = h.value_at(t);
        }
        if let Some(h) = &self.width {
            fragment.width = h.value_at(t);
        }
        FragmentVerdict::Keep
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/path.rs"]
mod tests;
