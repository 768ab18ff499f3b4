use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::VesselError;

/// Shading language a fragment is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderDialect {
    /// WebGPU shading language.
    Wgsl,
    /// GLSL ES 1.0 (WebGL 1 style `attribute`/`varying`).
    Glsl,
}

impl ShaderDialect {
    /// Lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wgsl => "wgsl",
            Self::Glsl => "glsl",
        }
    }
}

impl fmt::Display for ShaderDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Programmable pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Per-vertex stage.
    Vertex,
    /// Per-fragment stage.
    Fragment,
}

/// Named injection point in a base program.
///
/// Each slot has a fixed contract:
///
/// | slot | stage(s) | contents |
/// |------|----------|----------|
/// | `vs:#inputs` | vertex | per-instance attribute declarations |
/// | `#varyings` | both | values passed from vertex to fragment stage |
/// | `vs:#decl` / `fs:#decl` | one | module-level declarations, uniforms, helpers |
/// | `vs:#main-start` / `vs:#main-end` | vertex | statements before/after the base body |
/// | `fs:#main-start` / `fs:#main-end` | fragment | statements before/after base shading |
///
/// A base program marks each slot with a line containing only `// <id>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderSlot {
    /// `vs:#inputs`
    VsInputs,
    /// `#varyings`
    Varyings,
    /// `vs:#decl`
    VsDecl,
    /// `vs:#main-start`
    VsMainStart,
    /// `vs:#main-end`
    VsMainEnd,
    /// `fs:#decl`
    FsDecl,
    /// `fs:#main-start`
    FsMainStart,
    /// `fs:#main-end`
    FsMainEnd,
}

impl ShaderSlot {
    /// Every slot, in splice order.
    pub const ALL: [ShaderSlot; 8] = [
        Self::VsInputs,
        Self::Varyings,
        Self::VsDecl,
        Self::VsMainStart,
        Self::VsMainEnd,
        Self::FsDecl,
        Self::FsMainStart,
        Self::FsMainEnd,
    ];

    /// Injection point identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::VsInputs => "vs:#inputs",
            Self::Varyings => "#varyings",
            Self::VsDecl => "vs:#decl",
            Self::VsMainStart => "vs:#main-start",
            Self::VsMainEnd => "vs:#main-end",
            Self::FsDecl => "fs:#decl",
            Self::FsMainStart => "fs:#main-start",
            Self::FsMainEnd => "fs:#main-end",
        }
    }

    /// Stages whose source receives this slot's fragments.
    pub fn stages(self) -> &'static [ShaderStage] {
        match self {
            Self::VsInputs | Self::VsDecl | Self::VsMainStart | Self::VsMainEnd => {
                &[ShaderStage::Vertex]
            }
            Self::FsDecl | Self::FsMainStart | Self::FsMainEnd => &[ShaderStage::Fragment],
            Self::Varyings => &[ShaderStage::Vertex, ShaderStage::Fragment],
        }
    }

    /// Marker line a base program carries for this slot.
    pub fn marker(self) -> String {
        format!("// {}", self.id())
    }
}

impl fmt::Display for ShaderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ShaderSlot {
    type Err = VesselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.id() == s.trim())
            .ok_or_else(|| VesselError::shader(format!("unknown shader slot '{s}'")))
    }
}

/// A piece of shader code bound to one slot, with one source per supported dialect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderFragment {
    /// Capability that contributed the fragment; used in diagnostics.
    pub owner: String,
    /// Injection point.
    pub slot: ShaderSlot,
    /// Source text keyed by dialect.
    pub sources: BTreeMap<ShaderDialect, String>,
}

impl ShaderFragment {
    /// Start an empty fragment for `slot`.
    pub fn new(owner: impl Into<String>, slot: ShaderSlot) -> Self {
        Self {
            owner: owner.into(),
            slot,
            sources: BTreeMap::new(),
        }
    }

    /// Attach the source text for `dialect`.
    pub fn with_source(mut self, dialect: ShaderDialect, source: impl Into<String>) -> Self {
        self.sources.insert(dialect, source.into());
        self
    }

    /// Source text for `dialect`, if provided.
    pub fn source(&self, dialect: ShaderDialect) -> Option<&str> {
        self.sources.get(&dialect).map(String::as_str)
    }
}
