use std::collections::BTreeMap;

use crate::foundation::core::Rgba8;
use crate::foundation::math::{FRACTION_EPSILON, crossing_fraction, interpolate_time};
use crate::layer::attributes::AttributeManager;
use crate::model::track::TrackSet;
use crate::render::plan::PathSpan;
use crate::view::viewport::Viewport;

/// Varying that carries the interpolated timestamp of a fragment.
pub const TIME_VARYING: &str = "vTime";

/// A uniform value handed to the draw step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    /// Floating-point uniform.
    Float(f64),
    /// Integer uniform.
    Int(i64),
    /// Boolean uniform.
    Bool(bool),
}

impl From<f64> for UniformValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for UniformValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Named uniforms for one draw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Uniforms(BTreeMap<String, UniformValue>);

impl Uniforms {
    /// Set or replace a uniform.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Uniform by name.
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.0.get(name).copied()
    }

    /// Numeric uniform as `f64`.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            UniformValue::Float(v) => Some(v),
            UniformValue::Int(v) => Some(v as f64),
            UniformValue::Bool(_) => None,
        }
    }

    /// Iterate uniforms in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, UniformValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A varying interpolated linearly from one shader attribute at the segment start to another at
/// its end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearVarying {
    /// Varying name, e.g. `vTime`.
    pub name: String,
    /// Shader attribute read at fraction 0.
    pub from: String,
    /// Shader attribute read at fraction 1.
    pub to: String,
}

/// Varyings of one segment, as endpoint pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentVaryings {
    values: Vec<(String, f64, f64)>,
}

impl SegmentVaryings {
    /// Record the endpoint values of a varying.
    pub fn insert(&mut self, name: impl Into<String>, at_start: f64, at_end: f64) {
        let name = name.into();
        self.values.retain(|(n, _, _)| *n != name);
        self.values.push((name, at_start, at_end));
    }

    /// Endpoint values of a varying.
    pub fn endpoints(&self, name: &str) -> Option<(f64, f64)> {
        self.values
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|&(_, a, b)| (a, b))
    }

    /// Value at fraction `f` along the segment.
    pub fn value_at(&self, name: &str, f: f64) -> Option<f64> {
        let (a, b) = self.endpoints(name)?;
        Some(interpolate_time(a, b, f))
    }

    /// Fraction where a varying crosses `threshold` strictly inside the segment.
    pub fn crossing(&self, name: &str, threshold: f64) -> Option<f64> {
        let (a, b) = self.endpoints(name)?;
        crossing_fraction(a, b, threshold)
    }
}

/// Shading inputs and outputs for one span of a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    /// Output color.
    pub color: Rgba8,
    /// Output width in accessor units, before width scaling.
    pub width: f64,
}

/// Result of running a fragment stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentVerdict {
    /// The fragment continues to the next stage.
    Keep,
    /// The fragment contributes nothing.
    Discard,
}

/// CPU counterpart of a fragment-shader injection.
///
/// Stages are evaluated on spans: a stage reports the fractions at which its decision may change,
/// and is then shaded once per span at the span midpoint.
pub trait FragmentStage {
    /// Stage name, for diagnostics.
    fn name(&self) -> &str;

    /// Append fractions in `(0, 1)` where this stage's output may change.
    fn split_points(&self, varyings: &SegmentVaryings, out: &mut Vec<f64>);

    /// Shade the fragment at fraction `f`.
    fn shade(&self, varyings: &SegmentVaryings, f: f64, fragment: &mut Fragment)
    -> FragmentVerdict;
}

/// A kept span of a segment with its final shading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedSpan {
    /// Fraction where the span starts.
    pub from: f64,
    /// Fraction where the span ends.
    pub to: f64,
    /// Shaded output.
    pub fragment: Fragment,
}

/// Everything a capability's draw step reads and writes.
pub struct DrawContext<'a> {
    viewport: &'a Viewport,
    attributes: &'a AttributeManager,
    data: &'a TrackSet,
    layer_index: usize,
    /// Uniforms for this draw.
    pub uniforms: Uniforms,
    varyings: Vec<LinearVarying>,
    stages: Vec<Box<dyn FragmentStage>>,
    spans: Vec<PathSpan>,
}

impl<'a> DrawContext<'a> {
    /// Context for drawing `data` with `attributes` into `viewport`.
    pub fn new(
        viewport: &'a Viewport,
        attributes: &'a AttributeManager,
        data: &'a TrackSet,
        layer_index: usize,
    ) -> Self {
        Self {
            viewport,
            attributes,
            data,
            layer_index,
            uniforms: Uniforms::default(),
            varyings: Vec::new(),
            stages: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Target viewport.
    pub fn viewport(&self) -> &'a Viewport {
        self.viewport
    }

    /// Layer attribute buffers.
    pub fn attributes(&self) -> &'a AttributeManager {
        self.attributes
    }

    /// Layer data.
    pub fn data(&self) -> &'a TrackSet {
        self.data
    }

    /// Index of the layer in its scene.
    pub fn layer_index(&self) -> usize {
        self.layer_index
    }

    /// Register a linear varying.
    pub fn register_varying(&mut self, varying: LinearVarying) {
        self.varyings.retain(|v| v.name != varying.name);
        self.varyings.push(varying);
    }

    /// Return `true` when a varying of that name is registered.
    pub fn has_varying(&self, name: &str) -> bool {
        self.varyings.iter().any(|v| v.name == name)
    }

    /// Append a fragment stage; stages run in push order.
    pub fn push_stage(&mut self, stage: Box<dyn FragmentStage>) {
        self.stages.push(stage);
    }

    /// Names of the registered stages.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Evaluate every registered varying for one segment.
    ///
    /// A varying whose attribute is missing evaluates to NaN.
    pub fn evaluate_varyings(&self, track: usize, segment: usize) -> SegmentVaryings {
        let mut out = SegmentVaryings::default();
        for v in &self.varyings {
            let read = |name: &str| {
                self.attributes
                    .instance_value(name, track, segment)
                    .and_then(|values| values.first().copied())
                    .unwrap_or(f64::NAN)
            };
            out.insert(v.name.clone(), read(&v.from), read(&v.to));
        }
        out
    }

    /// Cut a segment at every stage split point and shade each piece.
    ///
    /// `extra` stages run after the registered ones. Discarded pieces are dropped and adjacent
    /// pieces with identical shading are merged.
    pub fn resolve_spans(
        &self,
        varyings: &SegmentVaryings,
        base: Fragment,
        extra: &[&dyn FragmentStage],
    ) -> Vec<ShadedSpan> {
        let stages: Vec<&dyn FragmentStage> = self
            .stages
            .iter()
            .map(|s| s.as_ref())
            .chain(extra.iter().copied())
            .collect();

        let mut cuts = vec![0.0, 1.0];
        for stage in &stages {
            stage.split_points(varyings, &mut cuts);
        }
        cuts.retain(|f| f.is_finite() && (0.0..=1.0).contains(f));
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|a, b| (*a - *b).abs() < FRACTION_EPSILON);

        let mut out: Vec<ShadedSpan> = Vec::new();
        'pieces: for w in cuts.windows(2) {
            let (from, to) = (w[0], w[1]);
            if to - from < FRACTION_EPSILON {
                continue;
            }
            let mid = (from + to) / 2.0;
            let mut fragment = base;
            for stage in &stages {
                if stage.shade(varyings, mid, &mut fragment) == FragmentVerdict::Discard {
                    continue 'pieces;
                }
            }

            let extends = out.last().is_some_and(|prev| {
                prev.fragment == fragment && (prev.to - from).abs() < FRACTION_EPSILON
            });
            if let Some(prev) = out.last_mut().filter(|_| extends) {
                prev.to = to;
            } else {
                out.push(ShadedSpan { from, to, fragment });
            }
        }
        out
    }

    /// Append a span to the plan.
    pub fn emit(&mut self, span: PathSpan) {
        self.spans.push(span);
    }

    /// Spans emitted so far.
    pub fn spans(&self) -> &[PathSpan] {
        &self.spans
    }

    /// Consume the context.
    pub fn finish(self) -> DrawOutput {
        DrawOutput {
            stages: self.stages.iter().map(|s| s.name().to_owned()).collect(),
            uniforms: self.uniforms,
            spans: self.spans,
        }
    }
}

/// What one layer draw produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawOutput {
    /// Kept spans in emission order.
    pub spans: Vec<PathSpan>,
    /// Uniforms set during the draw.
    pub uniforms: Uniforms,
    /// Names of the fragment stages that ran, in order.
    pub stages: Vec<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/layer/context.rs"]
mod tests;
