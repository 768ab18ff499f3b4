//! Vesseltrace renders time-windowed vessel tracks.
//!
//! A track is a polyline of timestamped waypoints. Each segment is drawn only where its linearly
//! interpolated time falls inside a `[startTime, endTime]` window, and waypoints inside a separate
//! highlight window can switch color and width.
//!
//! Layers are composed from render capabilities:
//!
//! - [`PathCapability`] draws instanced path segments
//! - [`TimeWindowed`] wraps any capability with the timestamp attributes, the `vTime` varying and
//!   the window discard stage
//! - [`Layer`] drives a capability through update and draw into a [`RenderPlan`]
//!
//! The same composition assembles WGSL or GLSL programs from named [`ShaderSlot`]s, and the CPU
//! backend rasterizes plans to RGBA8.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod layer;
pub(crate) mod model;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod shader;
pub(crate) mod view;

pub use crate::foundation::core::{BezPath, Canvas, LonLat, Point, Rgba8, TimeWindow, Vec2};
pub use crate::foundation::error::{VesselError, VesselResult};
pub use crate::foundation::math::{crossing_fraction, interpolate_time, visible_fraction_range};

pub use crate::layer::accessor::{
    Accessor, AttributeValue, HighlightAccessor, TimestampAccessor, TriggerKey,
};
pub use crate::layer::attributes::{Attribute, AttributeManager, ShaderAttribute};
pub use crate::layer::capability::{RenderCapability, UpdateParams};
pub use crate::layer::context::{
    DrawContext, DrawOutput, Fragment, FragmentStage, FragmentVerdict, LinearVarying,
    SegmentVaryings, ShadedSpan, TIME_VARYING, UniformValue, Uniforms,
};
pub use crate::layer::host::{Layer, VesselLayer};
pub use crate::layer::path::{
    HighlightStage, PathCapability, PathProps, WAYPOINT_TIME_VARYING, WidthUnits,
};
pub use crate::layer::time_window::{
    TimeWindowProps, TimeWindowStage, TimeWindowed, time_window_fragments,
};
pub use crate::model::track::{Track, TrackSet, Waypoint};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend,
};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::pick::{PickInfo, pick};
pub use crate::render::plan::{PathSpan, RenderPlan};
pub use crate::scene::document::{LayerConfig, Scene, SceneOverrides, TracksSource};
pub use crate::scene::pipeline::{plan_scene, render_scene, render_sweep, sweep_windows};
pub use crate::shader::base::INSTANCED_PATH;
pub use crate::shader::program::{AssembledProgram, ShaderSet};
pub use crate::shader::slot::{ShaderDialect, ShaderFragment, ShaderSlot, ShaderStage};
pub use crate::view::viewport::{ViewState, Viewport, wrap_longitudes};
