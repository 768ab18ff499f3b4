use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Rgba8, TimeWindow};
use crate::foundation::error::{VesselError, VesselResult};
use crate::layer::accessor::Accessor;
use crate::layer::host::VesselLayer;
use crate::layer::path::{PathProps, WidthUnits};
use crate::layer::time_window::TimeWindowProps;
use crate::model::track::TrackSet;
use crate::view::viewport::ViewState;

/// A frame description: canvas, camera and the vessel layers drawn into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub canvas: Canvas,
    #[serde(default)]
    pub view: ViewState,
    #[serde(default)]
    pub background: Option<Rgba8>,
    pub layers: Vec<LayerConfig>,
}

/// Where a layer's tracks come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TracksSource {
    /// JSON file, relative to the scene file's directory.
    Path(PathBuf),
    Inline(TrackSet),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    pub id: String,
    pub tracks: TracksSource,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub end_time: i64,
    /// Waypoints inside this window use the highlight color and width.
    #[serde(default)]
    pub highlight: Option<TimeWindow>,
    #[serde(default = "default_color")]
    pub color: Rgba8,
    #[serde(default = "default_highlight_color")]
    pub highlight_color: Rgba8,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_highlight_width")]
    pub highlight_width: f64,
    #[serde(default)]
    pub width_units: WidthUnits,
    #[serde(default = "default_one")]
    pub width_scale: f64,
    #[serde(default)]
    pub width_min_pixels: f64,
    #[serde(default = "default_width_max")]
    pub width_max_pixels: f64,
    #[serde(default)]
    pub wrap_longitude: bool,
    #[serde(default)]
    pub joint_rounded: bool,
    #[serde(default)]
    pub cap_rounded: bool,
    #[serde(default)]
    pub pickable: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_true")]
    pub cache_segments: bool,
}

fn default_color() -> Rgba8 {
    Rgba8::BLACK
}

fn default_highlight_color() -> Rgba8 {
    Rgba8::new(255, 0, 0, 255)
}

fn default_width() -> f64 {
    1.0
}

fn default_highlight_width() -> f64 {
    5.0
}

fn default_one() -> f64 {
    1.0
}

fn default_width_max() -> f64 {
    f64::MAX
}

fn default_opacity() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Scene {
    pub fn from_reader<R: std::io::Read>(r: R) -> VesselResult<Self> {
        let scene: Self = serde_json::from_reader(r)
            .map_err(|e| VesselError::serde(format!("parse scene JSON: {e}")))?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn from_path(path: impl AsRef<Path>) -> VesselResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VesselError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> VesselResult<()> {
        self.canvas.validate()?;
        self.view.validate()?;

        let mut ids = BTreeSet::new();
        for layer in &self.layers {
            if layer.id.trim().is_empty() {
                return Err(VesselError::validation("layer id must be non-empty"));
            }
            if !ids.insert(layer.id.as_str()) {
                return Err(VesselError::validation(format!(
                    "duplicate layer id '{}'",
                    layer.id
                )));
            }
            layer.validate()?;
        }
        Ok(())
    }

    pub fn layer(&self, id: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Load every layer's tracks and build its layer, in scene order.
    ///
    /// Relative track paths are resolved against `base_dir`.
    pub fn build_layers(&self, base_dir: &Path) -> VesselResult<Vec<VesselLayer>> {
        self.layers
            .iter()
            .map(|config| config.build(base_dir))
            .collect()
    }
}

impl LayerConfig {
    pub fn validate(&self) -> VesselResult<()> {
        let non_negative = [
            ("width", self.width),
            ("highlightWidth", self.highlight_width),
            ("widthScale", self.width_scale),
            ("widthMinPixels", self.width_min_pixels),
            ("widthMaxPixels", self.width_max_pixels),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(VesselError::validation(format!(
                    "layer '{}': {name} must be finite and >= 0",
                    self.id
                )));
            }
        }
        if self.width_max_pixels < self.width_min_pixels {
            return Err(VesselError::validation(format!(
                "layer '{}': widthMaxPixels must be >= widthMinPixels",
                self.id
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(VesselError::validation(format!(
                "layer '{}': opacity must be in [0, 1]",
                self.id
            )));
        }
        Ok(())
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn path_props(&self) -> PathProps {
        let (get_color, get_width) = match self.highlight {
            Some(window) => (
                Accessor::highlight(window, self.highlight_color, self.color),
                Accessor::highlight(window, self.highlight_width, self.width),
            ),
            None => (Accessor::Constant(self.color), Accessor::Constant(self.width)),
        };
        PathProps {
            get_color,
            get_width,
            width_units: self.width_units,
            width_scale: self.width_scale,
            width_min_pixels: self.width_min_pixels,
            width_max_pixels: self.width_max_pixels,
            wrap_longitude: self.wrap_longitude,
            joint_rounded: self.joint_rounded,
            cap_rounded: self.cap_rounded,
            pickable: self.pickable,
            opacity: self.opacity,
        }
    }

    pub fn time_window_props(&self) -> TimeWindowProps {
        TimeWindowProps {
            start_time: self.start_time,
            end_time: self.end_time,
            cache_segments: self.cache_segments,
            ..TimeWindowProps::default()
        }
    }

    pub fn load_tracks(&self, base_dir: &Path) -> VesselResult<TrackSet> {
        match &self.tracks {
            TracksSource::Inline(tracks) => Ok(tracks.clone()),
            TracksSource::Path(p) => {
                let path = if p.is_absolute() {
                    p.clone()
                } else {
                    base_dir.join(p)
                };
                TrackSet::from_path(&path)
            }
        }
    }

    pub fn build(&self, base_dir: &Path) -> VesselResult<VesselLayer> {
        let tracks = self.load_tracks(base_dir)?;
        tracing::debug!(
            layer = %self.id,
            tracks = tracks.len(),
            segments = tracks.segment_count(),
            "loaded layer tracks"
        );
        let mut layer =
            VesselLayer::vessel(self.id.clone(), self.path_props(), self.time_window_props());
        layer.set_data(Arc::new(tracks));
        Ok(layer)
    }
}

/// Command-line overrides applied to every layer of a scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneOverrides {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub highlight_start: Option<i64>,
    pub highlight_end: Option<i64>,
}

impl SceneOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to every layer, then revalidate.
    pub fn apply(&self, scene: &mut Scene) -> VesselResult<()> {
        for layer in &mut scene.layers {
            if let Some(t) = self.start_time {
                layer.start_time = t;
            }
            if let Some(t) = self.end_time {
                layer.end_time = t;
            }
            if self.highlight_start.is_some() || self.highlight_end.is_some() {
                let mut h = layer.highlight.unwrap_or_default();
                if let Some(t) = self.highlight_start {
                    h.start = t;
                }
                if let Some(t) = self.highlight_end {
                    h.end = t;
                }
                layer.highlight = Some(h);
            }
        }
        scene.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/document.rs"]
mod tests;
