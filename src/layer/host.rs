use std::sync::Arc;

use crate::foundation::error::{VesselError, VesselResult};
use crate::layer::attributes::AttributeManager;
use crate::layer::capability::{RenderCapability, UpdateParams};
use crate::layer::context::{DrawContext, DrawOutput};
use crate::layer::path::{PathCapability, PathProps};
use crate::layer::time_window::{TimeWindowProps, TimeWindowed};
use crate::model::track::TrackSet;
use crate::shader::program::AssembledProgram;
use crate::shader::slot::ShaderDialect;
use crate::view::viewport::Viewport;

/// Path layer filtered by a time window.
pub type VesselLayer = Layer<TimeWindowed<PathCapability>>;

/// Drives a capability through its lifecycle: set data, update, draw, finalize.
#[derive(Debug)]
pub struct Layer<C> {
    id: String,
    capability: C,
    attributes: AttributeManager,
    data: Arc<TrackSet>,
    data_changed: bool,
    initialized: bool,
}

impl<C: RenderCapability> Layer<C> {
    pub fn new(id: impl Into<String>, capability: C) -> Self {
        Self {
            id: id.into(),
            capability,
            attributes: AttributeManager::new(),
            data: Arc::new(TrackSet::default()),
            data_changed: true,
            initialized: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    /// Mutable props access. Changes are picked up by the next [`Layer::update`].
    pub fn capability_mut(&mut self) -> &mut C {
        &mut self.capability
    }

    pub fn attributes(&self) -> &AttributeManager {
        &self.attributes
    }

    pub fn data(&self) -> &Arc<TrackSet> {
        &self.data
    }

    /// Replace the data; every attribute is recomputed on the next update.
    pub fn set_data(&mut self, data: impl Into<Arc<TrackSet>>) {
        self.data = data.into();
        self.data_changed = true;
    }

    /// Bring attributes up to date with the current data and props.
    #[tracing::instrument(skip(self), fields(layer = %self.id))]
    pub fn update(&mut self) -> VesselResult<()> {
        if !self.initialized {
            self.capability.initialize_attributes(&mut self.attributes)?;
            self.initialized = true;
        }
        if self.data_changed {
            self.attributes.invalidate_all();
        }

        let params = UpdateParams {
            data: &self.data,
            data_changed: self.data_changed,
        };
        self.capability.update_state(&params, &mut self.attributes);
        self.attributes.update(&self.data, &self.capability)?;
        self.data_changed = false;

        tracing::debug!(
            updated = ?self.attributes.last_updated(),
            "layer attributes updated"
        );
        Ok(())
    }

    /// Run the draw step into `viewport`.
    #[tracing::instrument(skip(self, viewport), fields(layer = %self.id))]
    pub fn draw(&self, viewport: &Viewport, layer_index: usize) -> VesselResult<DrawOutput> {
        if !self.initialized || self.data_changed || self.attributes.needs_update() {
            return Err(VesselError::render(format!(
                "layer '{}' must be updated before it is drawn",
                self.id
            )));
        }

        let mut ctx = DrawContext::new(viewport, &self.attributes, &self.data, layer_index);
        self.capability.draw(&mut ctx)?;
        let out = ctx.finish();
        tracing::debug!(spans = out.spans.len(), "layer drawn");
        Ok(out)
    }

    /// Update if needed, then draw.
    pub fn render(&mut self, viewport: &Viewport, layer_index: usize) -> VesselResult<DrawOutput> {
        self.update()?;
        self.draw(viewport, layer_index)
    }

    /// Assembled shader program for `dialect`.
    pub fn shader_program(&self, dialect: ShaderDialect) -> VesselResult<AssembledProgram> {
        self.capability.shaders().assemble(dialect)
    }

    /// Release capability state and drop all attribute buffers.
    pub fn finalize(&mut self) {
        self.capability.finalize();
        self.attributes = AttributeManager::new();
        self.initialized = false;
        self.data_changed = true;
    }
}

impl VesselLayer {
    /// Path layer wrapped in a time window.
    pub fn vessel(id: impl Into<String>, path: PathProps, window: TimeWindowProps) -> Self {
        Self::new(id, TimeWindowed::new(PathCapability::new(path), window))
    }

    pub fn set_time_window(&mut self, start_time: i64, end_time: i64) {
        self.capability.set_time_window(start_time, end_time);
    }

    pub fn path_props(&self) -> &PathProps {
        &self.capability.inner().props
    }

    pub fn path_props_mut(&mut self) -> &mut PathProps {
        &mut self.capability.inner_mut().props
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/host.rs"]
mod tests;
