use std::sync::Arc;

use crate::foundation::error::VesselResult;
use crate::layer::attributes::AttributeManager;
use crate::layer::context::DrawContext;
use crate::model::track::{Track, TrackSet};
use crate::shader::program::ShaderSet;

/// Inputs to [`RenderCapability::update_state`].
#[derive(Clone, Copy, Debug)]
pub struct UpdateParams<'a> {
    /// Current layer data.
    pub data: &'a Arc<TrackSet>,
    /// Set when the data was replaced since the previous update.
    pub data_changed: bool,
}

/// One piece of rendering behavior a layer is composed from.
///
/// A capability contributes shader fragments, attributes and a draw step. Decorators wrap an
/// inner capability and forward to it, adding their own contributions around it.
pub trait RenderCapability {
    /// Identifier used in logs and diagnostics.
    fn id(&self) -> String;

    /// Base program plus every injected fragment.
    fn shaders(&self) -> ShaderSet;

    /// Register attributes. Called once, before the first update.
    fn initialize_attributes(&self, attributes: &mut AttributeManager) -> VesselResult<()>;

    /// Append one value per waypoint of `track` for `accessor`. Returns `false` when the accessor
    /// is not provided by this capability.
    fn evaluate_accessor(&self, accessor: &str, track: &Track, out: &mut Vec<f64>) -> bool;

    /// React to data or prop changes by invalidating the attributes whose inputs moved.
    fn update_state(&mut self, params: &UpdateParams<'_>, attributes: &mut AttributeManager);

    /// Set uniforms, register varyings and stages, and emit spans.
    fn draw(&self, ctx: &mut DrawContext<'_>) -> VesselResult<()>;

    /// Return `true` when drawn spans can be picked.
    fn pickable(&self) -> bool {
        false
    }

    /// Release state held between frames.
    fn finalize(&mut self) {}
}
