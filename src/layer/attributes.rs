use std::collections::BTreeMap;

use crate::foundation::error::{VesselError, VesselResult};
use crate::layer::capability::RenderCapability;
use crate::model::track::TrackSet;

/// Name under which a shader reads an attribute, and which vertex it reads.
///
/// An instanced segment `i` reads vertex `i + vertex_offset` of its track, so offset 0 is the
/// segment start and offset 1 the next vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderAttribute {
    /// Shader-facing name, e.g. `instanceTimestamps`.
    pub name: String,
    /// Vertex offset relative to the segment start.
    pub vertex_offset: usize,
}

/// One per-vertex buffer filled from a named accessor.
#[derive(Clone, Debug)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Components per vertex.
    pub size: usize,
    /// Accessor that provides the values, e.g. `getTimestamps`.
    pub accessor: String,
    /// Shader views of this buffer.
    pub shader_attributes: Vec<ShaderAttribute>,
    values: Vec<f64>,
    track_offsets: Vec<usize>,
    needs_update: bool,
}

impl Attribute {
    /// Flat values, `size` per vertex, tracks back to back.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Return `true` when the buffer is stale.
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Components of vertex `vertex` of track `track`.
    pub fn vertex(&self, track: usize, vertex: usize) -> Option<&[f64]> {
        let first = *self.track_offsets.get(track)?;
        let end = *self.track_offsets.get(track + 1)?;
        let idx = first + vertex;
        if idx >= end {
            return None;
        }
        self.values.get(idx * self.size..(idx + 1) * self.size)
    }

    fn vertex_count(&self, track: usize) -> usize {
        match (self.track_offsets.get(track), self.track_offsets.get(track + 1)) {
            (Some(a), Some(b)) => b - a,
            _ => 0,
        }
    }
}

/// Owns a layer's attribute buffers and recomputes only the invalidated ones.
#[derive(Clone, Debug, Default)]
pub struct AttributeManager {
    attributes: Vec<Attribute>,
    shader_index: BTreeMap<String, (usize, usize)>,
    last_updated: Vec<String>,
}

impl AttributeManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instanced attribute.
    ///
    /// `shader_attributes` are `(name, vertex_offset)` pairs. Attribute and shader attribute names
    /// must be unique within the manager.
    pub fn add_instanced(
        &mut self,
        name: &str,
        size: usize,
        accessor: &str,
        shader_attributes: &[(&str, usize)],
    ) -> VesselResult<()> {
        if size == 0 {
            return Err(VesselError::render(format!(
                "attribute '{name}' must have size > 0"
            )));
        }
        if self.get(name).is_some() {
            return Err(VesselError::render(format!(
                "attribute '{name}' is already registered"
            )));
        }

        for (i, &(shader_name, _)) in shader_attributes.iter().enumerate() {
            let repeated = shader_attributes[..i].iter().any(|&(n, _)| n == shader_name);
            if repeated || self.shader_index.contains_key(shader_name) {
                return Err(VesselError::render(format!(
                    "shader attribute '{shader_name}' is already registered"
                )));
            }
        }

        let index = self.attributes.len();
        for &(shader_name, offset) in shader_attributes {
            self.shader_index.insert(shader_name.to_owned(), (index, offset));
        }

        self.attributes.push(Attribute {
            name: name.to_owned(),
            size,
            accessor: accessor.to_owned(),
            shader_attributes: shader_attributes
                .iter()
                .map(|&(n, vertex_offset)| ShaderAttribute {
                    name: n.to_owned(),
                    vertex_offset,
                })
                .collect(),
            values: Vec::new(),
            track_offsets: vec![0],
            needs_update: true,
        });
        Ok(())
    }

    /// Mark every attribute fed by `accessor` stale. Returns `true` if any matched.
    pub fn invalidate(&mut self, accessor: &str) -> bool {
        let mut any = false;
        for attr in self.attributes.iter_mut().filter(|a| a.accessor == accessor) {
            attr.needs_update = true;
            any = true;
        }
        any
    }

    /// Mark every attribute stale.
    pub fn invalidate_all(&mut self) {
        for attr in &mut self.attributes {
            attr.needs_update = true;
        }
    }

    /// Return `true` when any attribute is stale.
    pub fn needs_update(&self) -> bool {
        self.attributes.iter().any(|a| a.needs_update)
    }

    /// Recompute every stale attribute from `provider`'s accessors.
    pub fn update<P>(&mut self, data: &TrackSet, provider: &P) -> VesselResult<()>
    where
        P: RenderCapability + ?Sized,
    {
        self.last_updated.clear();
        let mut scratch = Vec::new();

        for attr in self.attributes.iter_mut().filter(|a| a.needs_update) {
            let vertices: usize = data.tracks.iter().map(|t| t.len()).sum();
            let mut values = Vec::with_capacity(attr.size * vertices);
            let mut track_offsets = Vec::with_capacity(data.len() + 1);
            track_offsets.push(0);

            for (track_index, track) in data.tracks.iter().enumerate() {
                scratch.clear();
                if !provider.evaluate_accessor(&attr.accessor, track, &mut scratch) {
                    return Err(VesselError::render(format!(
                        "no capability in '{}' provides accessor '{}'",
                        provider.id(),
                        attr.accessor
                    )));
                }

                let expected = track.len() * attr.size;
                if scratch.len() != expected {
                    tracing::warn!(
                        attribute = %attr.name,
                        track = track_index,
                        expected,
                        got = scratch.len(),
                        "accessor returned wrong value count; padding with NaN"
                    );
                    scratch.resize(expected, f64::NAN);
                }
                values.extend_from_slice(&scratch);
                track_offsets.push(track_offsets[track_index] + track.len());
            }

            tracing::debug!(
                attribute = %attr.name,
                vertices = track_offsets.last().copied().unwrap_or(0),
                "attribute updated"
            );
            attr.values = values;
            attr.track_offsets = track_offsets;
            attr.needs_update = false;
            self.last_updated.push(attr.name.clone());
        }
        Ok(())
    }

    /// Names of the attributes recomputed by the most recent [`AttributeManager::update`].
    pub fn last_updated(&self) -> &[String] {
        &self.last_updated
    }

    /// Attribute by name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// All attributes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Value a shader attribute sees for segment `segment` of track `track`.
    pub fn instance_value(
        &self,
        shader_attribute: &str,
        track: usize,
        segment: usize,
    ) -> Option<&[f64]> {
        let &(index, offset) = self.shader_index.get(shader_attribute)?;
        self.attributes.get(index)?.vertex(track, segment + offset)
    }

    /// Return `true` when a shader attribute of that name is registered.
    pub fn has_shader_attribute(&self, shader_attribute: &str) -> bool {
        self.shader_index.contains_key(shader_attribute)
    }

    /// Pack a shader attribute into a per-instance `f32` buffer, one entry per segment.
    ///
    /// `bias` is subtracted from every component before narrowing, so epoch-millisecond
    /// timestamps can be rebased near zero and keep sub-second precision in `f32`.
    pub fn instance_buffer_f32(
        &self,
        shader_attribute: &str,
        bias: f64,
    ) -> VesselResult<Vec<f32>> {
        let unknown =
            || VesselError::render(format!("unknown shader attribute '{shader_attribute}'"));
        let &(index, offset) = self.shader_index.get(shader_attribute).ok_or_else(unknown)?;
        let attr = self.attributes.get(index).ok_or_else(unknown)?;
        if attr.needs_update {
            return Err(VesselError::render(format!(
                "attribute '{}' is stale; call update first",
                attr.name
            )));
        }

        let mut out = Vec::new();
        for track in 0..attr.track_offsets.len().saturating_sub(1) {
            let segments = attr.vertex_count(track).saturating_sub(1);
            for segment in 0..segments {
                let values = attr.vertex(track, segment + offset).ok_or_else(|| {
                    VesselError::render(format!(
                        "attribute '{}' has no vertex {} in track {track}",
                        attr.name,
                        segment + offset
                    ))
                })?;
                out.extend(values.iter().map(|v| (v - bias) as f32));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/attributes.rs"]
mod tests;
