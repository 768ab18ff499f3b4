//! Time-window filtering as a decorator over any path-like capability.
//!
//! The decorator adds a per-vertex timestamp attribute read at the segment start and at the next
//! vertex, interpolates it into the `vTime` varying, and discards fragments whose `vTime` falls
//! outside `[startTime, endTime]`. Both bounds are inclusive. An inverted window shows nothing.

use std::sync::Arc;

use crate::foundation::core::TimeWindow;
use crate::foundation::error::VesselResult;
use crate::layer::accessor::{TimestampAccessor, TriggerKey};
use crate::layer::attributes::AttributeManager;
use crate::layer::capability::{RenderCapability, UpdateParams};
use crate::layer::context::{
    DrawContext, Fragment, FragmentStage, FragmentVerdict, LinearVarying, SegmentVaryings,
    TIME_VARYING,
};
use crate::model::track::{Track, TrackSet};
use crate::shader::program::ShaderSet;
use crate::shader::slot::{ShaderDialect, ShaderFragment, ShaderSlot};

/// Accessor feeding the timestamp attribute.
pub const GET_TIMESTAMPS: &str = "getTimestamps";
/// Timestamp at the segment start.
pub const INSTANCE_TIMESTAMPS: &str = "instanceTimestamps";
/// Timestamp at the next vertex.
pub const INSTANCE_NEXT_TIMESTAMPS: &str = "instanceNextTimestamps";
/// Uniform holding the window start.
pub const START_TIME: &str = "startTime";
/// Uniform holding the window end.
pub const END_TIME: &str = "endTime";

const OWNER: &str = "time-window";

/// Props added by [`TimeWindowed`].
#[derive(Clone, Debug)]
pub struct TimeWindowProps {
    pub start_time: i64,
    pub end_time: i64,
    pub get_timestamps: TimestampAccessor,
    /// Keep a handle to the last data passed in, exposed by [`TimeWindowed::segments`].
    pub cache_segments: bool,
}

impl Default for TimeWindowProps {
    fn default() -> Self {
        Self {
            start_time: 0,
            end_time: 0,
            get_timestamps: TimestampAccessor::default(),
            cache_segments: true,
        }
    }
}

impl TimeWindowProps {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }
}

/// Wraps a capability and hides every fragment outside the time window.
#[derive(Clone, Debug)]
pub struct TimeWindowed<C> {
    inner: C,
    pub props: TimeWindowProps,
    applied: Option<TriggerKey>,
    segments: Option<Arc<TrackSet>>,
    time_origin: i64,
}

impl<C: RenderCapability> TimeWindowed<C> {
    pub fn new(inner: C, props: TimeWindowProps) -> Self {
        Self {
            inner,
            props,
            applied: None,
            segments: None,
            time_origin: 0,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Move the window. Takes effect on the next draw; no attribute is recomputed.
    pub fn set_time_window(&mut self, start_time: i64, end_time: i64) {
        self.props.start_time = start_time;
        self.props.end_time = end_time;
    }

    /// Last data passed in, when segment caching is enabled.
    pub fn segments(&self) -> Option<&Arc<TrackSet>> {
        self.segments.as_ref()
    }

    /// Earliest timestamp of the current data, or 0 when there is none.
    ///
    /// GPU consumers subtract it from timestamp buffers and both uniforms before narrowing to
    /// `f32`; see [`AttributeManager::instance_buffer_f32`].
    pub fn time_origin(&self) -> i64 {
        self.time_origin
    }
}

impl<C: RenderCapability> RenderCapability for TimeWindowed<C> {
    fn id(&self) -> String {
        format!("{OWNER}({})", self.inner.id())
    }

    fn shaders(&self) -> ShaderSet {
        let mut set = self.inner.shaders();
        for fragment in time_window_fragments() {
            set.inject(fragment);
        }
        set
    }

    fn initialize_attributes(&self, attributes: &mut AttributeManager) -> VesselResult<()> {
        self.inner.initialize_attributes(attributes)?;
        attributes.add_instanced(
            "timestamps",
            1,
            GET_TIMESTAMPS,
            &[(INSTANCE_TIMESTAMPS, 0), (INSTANCE_NEXT_TIMESTAMPS, 1)],
        )
    }

    fn evaluate_accessor(&self, accessor: &str, track: &Track, out: &mut Vec<f64>) -> bool {
        if accessor == GET_TIMESTAMPS {
            out.extend(
                self.props
                    .get_timestamps
                    .evaluate(track)
                    .into_iter()
                    .map(|t| t as f64),
            );
            return true;
        }
        self.inner.evaluate_accessor(accessor, track, out)
    }

    fn update_state(&mut self, params: &UpdateParams<'_>, attributes: &mut AttributeManager) {
        self.inner.update_state(params, attributes);

        if params.data_changed {
            self.time_origin = params.data.min_timestamp().unwrap_or(0);
        }
        self.segments = self
            .props
            .cache_segments
            .then(|| Arc::clone(params.data));

        let key = self.props.get_timestamps.trigger_key();
        if self.applied.as_ref() != Some(&key) {
            tracing::debug!(accessor = GET_TIMESTAMPS, "update trigger changed");
            attributes.invalidate(GET_TIMESTAMPS);
            self.applied = Some(key);
        }
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) -> VesselResult<()> {
        let window = self.props.window();
        if window.is_inverted() {
            tracing::debug!(
                start = window.start,
                end = window.end,
                "inverted time window; nothing is visible"
            );
        }

        ctx.uniforms.set(START_TIME, window.start as f64);
        ctx.uniforms.set(END_TIME, window.end as f64);
        ctx.register_varying(LinearVarying {
            name: TIME_VARYING.to_owned(),
            from: INSTANCE_TIMESTAMPS.to_owned(),
            to: INSTANCE_NEXT_TIMESTAMPS.to_owned(),
        });
        ctx.push_stage(Box::new(TimeWindowStage::new(window)));
        self.inner.draw(ctx)
    }

    fn pickable(&self) -> bool {
        self.inner.pickable()
    }

    fn finalize(&mut self) {
        self.segments = None;
        self.applied = None;
        self.inner.finalize();
    }
}

/// Drops fragments whose interpolated time lies outside a window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindowStage {
    window: TimeWindow,
}

impl TimeWindowStage {
    pub fn new(window: TimeWindow) -> Self {
        Self { window }
    }
}

impl FragmentStage for TimeWindowStage {
    fn name(&self) -> &str {
        OWNER
    }

    fn split_points(&self, varyings: &SegmentVaryings, out: &mut Vec<f64>) {
        for bound in [self.window.start, self.window.end] {
            out.extend(varyings.crossing(TIME_VARYING, bound as f64));
        }
    }

    fn shade(&self, varyings: &SegmentVaryings, f: f64, _fragment: &mut Fragment)
    -> FragmentVerdict {
        // NaN times (missing timestamps) fail `contains` and are dropped.
        match varyings.value_at(TIME_VARYING, f) {
            Some(t) if self.window.contains(t) => FragmentVerdict::Keep,
            _ => FragmentVerdict::Discard,
        }
    }
}

/// Shader fragments contributed by the time window, in both dialects.
pub fn time_window_fragments() -> Vec<ShaderFragment> {
    let fragment = |slot, wgsl: &str, glsl: &str| {
        ShaderFragment::new(OWNER, slot)
            .with_source(ShaderDialect::Wgsl, wgsl)
            .with_source(ShaderDialect::Glsl, glsl)
    };
    vec![
        fragment(
            ShaderSlot::VsInputs,
            "@location(5) instanceTimestamps: f32,\n@location(6) instanceNextTimestamps: f32,",
            "attribute float instanceTimestamps;\nattribute float instanceNextTimestamps;",
        ),
        fragment(
            ShaderSlot::Varyings,
            "@location(3) vTime: f32,",
            "varying float vTime;",
        ),
        fragment(
            ShaderSlot::VsMainEnd,
            "out.vTime = input.instanceTimestamps + (input.instanceNextTimestamps - input.instanceTimestamps) * input.positions.y;",
            "vTime = instanceTimestamps + (instanceNextTimestamps - instanceTimestamps) * positions.y;",
        ),
        fragment(
            ShaderSlot::FsDecl,
            "struct TimeWindowUniforms {\n  startTime: f32,\n  endTime: f32,\n};\n@group(0) @binding(1) var<uniform> timeWindow: TimeWindowUniforms;",
            "uniform float startTime;\nuniform float endTime;",
        ),
        fragment(
            ShaderSlot::FsMainStart,
            "if (!(input.vTime >= timeWindow.startTime && input.vTime <= timeWindow.endTime)) {\n  discard;\n}",
            "if (!(vTime >= startTime && vTime <= endTime)) {\n  discard;\n}",
        ),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/layer/time_window.rs"]
mod tests;
