//! Base programs for instanced path rendering.
//!
//! One instance is one path segment. The unit quad in `positions` spans the segment: `x` is the
//! side (-1 or 1) and `y` is 0 at the start vertex and 1 at the next vertex. `vPathPosition.y /
//! vPathLength` is therefore the fractional position along the segment.

use crate::shader::slot::ShaderDialect;

/// Name of the instanced path program.
pub const INSTANCED_PATH: &str = "instanced-path";

/// Vertex and fragment source of a base program.
#[derive(Clone, Copy, Debug)]
pub struct BaseProgram {
    /// Program name.
    pub name: &'static str,
    /// Vertex stage source.
    pub vertex: &'static str,
    /// Fragment stage source.
    pub fragment: &'static str,
}

/// Look up a base program by name and dialect.
pub fn base_program(name: &str, dialect: ShaderDialect) -> Option<BaseProgram> {
    match (name, dialect) {
        (INSTANCED_PATH, ShaderDialect::Glsl) => Some(BaseProgram {
            name: INSTANCED_PATH,
            vertex: PATH_VS_GLSL,
            fragment: PATH_FS_GLSL,
        }),
        (INSTANCED_PATH, ShaderDialect::Wgsl) => Some(BaseProgram {
            name: INSTANCED_PATH,
            vertex: PATH_VS_WGSL,
            fragment: PATH_FS_WGSL,
        }),
        _ => None,
    }
}

const PATH_VS_GLSL: &str = r#"#define SHADER_NAME instanced-path-vs
precision highp float;

attribute vec3 positions;
attribute vec2 instanceStartPositions;
attribute vec2 instanceEndPositions;
attribute vec4 instanceColors;
attribute float instanceStrokeWidths;
// vs:#inputs

uniform mat4 projectionMatrix;
uniform float widthScale;
uniform float widthMinPixels;
uniform float widthMaxPixels;
uniform float opacity;
// vs:#decl

varying vec4 vColor;
varying vec2 vPathPosition;
varying float vPathLength;
// #varyings

void main(void) {
  // vs:#main-start
  vec2 delta = instanceEndPositions - instanceStartPositions;
  float len = length(delta);
  vec2 dir = len > 0.0 ? delta / len : vec2(1.0, 0.0);
  vec2 normal = vec2(-dir.y, dir.x);
  float width = clamp(instanceStrokeWidths * widthScale, widthMinPixels, widthMaxPixels);
  vec2 anchor = mix(instanceStartPositions, instanceEndPositions, positions.y);
  gl_Position = projectionMatrix * vec4(anchor + normal * positions.x * width * 0.5, 0.0, 1.0);
  vColor = vec4(instanceColors.rgb, instanceColors.a * opacity);
  vPathPosition = vec2(positions.x, positions.y * len);
  vPathLength = len;
  // vs:#main-end
}
"#;

const PATH_FS_GLSL: &str = r#"#define SHADER_NAME instanced-path-fs
precision highp float;

// fs:#decl

varying vec4 vColor;
varying vec2 vPathPosition;
varying float vPathLength;
// #varyings

void main(void) {
  // fs:#main-start
  gl_FragColor = vColor;
  // fs:#main-end
}
"#;

const PATH_VS_WGSL: &str = r#"struct PathUniforms {
  projection: mat4x4<f32>,
  widthScale: f32,
  widthMinPixels: f32,
  widthMaxPixels: f32,
  opacity: f32,
};
@group(0) @binding(0) var<uniform> path: PathUniforms;
// vs:#decl

struct VertexInput {
  @location(0) positions: vec3<f32>,
  @location(1) instanceStartPositions: vec2<f32>,
  @location(2) instanceEndPositions: vec2<f32>,
  @location(3) instanceColors: vec4<f32>,
  @location(4) instanceStrokeWidths: f32,
  // vs:#inputs
};

struct Varyings {
  @builtin(position) position: vec4<f32>,
  @location(0) vColor: vec4<f32>,
  @location(1) vPathPosition: vec2<f32>,
  @location(2) vPathLength: f32,
  // #varyings
};

@vertex
fn vs_main(input: VertexInput) -> Varyings {
  var out: Varyings;
  // vs:#main-start
  let delta = input.instanceEndPositions - input.instanceStartPositions;
  let len = length(delta);
  var dir = vec2<f32>(1.0, 0.0);
  if (len > 0.0) {
    dir = delta / len;
  }
  let normal = vec2<f32>(-dir.y, dir.x);
  let width = clamp(input.instanceStrokeWidths * path.widthScale, path.widthMinPixels, path.widthMaxPixels);
  let anchor = mix(input.instanceStartPositions, input.instanceEndPositions, input.positions.y);
  out.position = path.projection * vec4<f32>(anchor + normal * input.positions.x * width * 0.5, 0.0, 1.0);
  out.vColor = vec4<f32>(input.instanceColors.rgb, input.instanceColors.a * path.opacity);
  out.vPathPosition = vec2<f32>(input.positions.x, input.positions.y * len);
  out.vPathLength = len;
  // vs:#main-end
  return out;
}
"#;

const PATH_FS_WGSL: &str = r#"// fs:#decl

struct Varyings {
  @builtin(position) position: vec4<f32>,
  @location(0) vColor: vec4<f32>,
  @location(1) vPathPosition: vec2<f32>,
  @location(2) vPathLength: f32,
  // #varyings
};

@fragment
fn fs_main(input: Varyings) -> @location(0) vec4<f32> {
  // fs:#main-start
  var color = input.vColor;
  // fs:#main-end
  return color;
}
"#;
