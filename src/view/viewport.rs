use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, LonLat, Point};
use crate::foundation::error::{VesselError, VesselResult};

/// Web Mercator tile edge in pixels at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.685_578_49;

/// Camera over the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Longitude at the canvas center.
    pub longitude: f64,
    /// Latitude at the canvas center.
    pub latitude: f64,
    /// Zoom level; the world is `256 * 2^zoom` pixels wide.
    pub zoom: f64,
}

impl ViewState {
    pub(crate) fn validate(&self) -> VesselResult<()> {
        if !(self.longitude.is_finite() && self.latitude.is_finite() && self.zoom.is_finite()) {
            return Err(VesselError::validation("view state must be finite"));
        }
        Ok(())
    }
}

/// A camera bound to a canvas; projects geographic positions to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    canvas: Canvas,
    view: ViewState,
    world_size: f64,
    center: Point,
}

impl Viewport {
    /// Bind `view` to `canvas`.
    pub fn new(canvas: Canvas, view: ViewState) -> Self {
        let world_size = TILE_SIZE * view.zoom.exp2();
        let center = world_point(LonLat::new(view.longitude, view.latitude), world_size);
        Self {
            canvas,
            view,
            world_size,
            center,
        }
    }

    /// Target canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Camera.
    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Project a position to canvas pixels (origin top-left, y down).
    pub fn project(&self, p: LonLat) -> Point {
        let w = world_point(p, self.world_size);
        Point::new(
            w.x - self.center.x + f64::from(self.canvas.width) / 2.0,
            w.y - self.center.y + f64::from(self.canvas.height) / 2.0,
        )
    }

    /// Ground meters covered by one pixel at the view latitude.
    pub fn meters_per_pixel(&self) -> f64 {
        let lat = self.view.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        EARTH_CIRCUMFERENCE_M * lat.to_radians().cos() / self.world_size
    }
}

fn world_point(p: LonLat, world_size: f64) -> Point {
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (p.lon + 180.0) / 360.0 * world_size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * world_size;
    Point::new(x, y)
}

/// Shift vertices by whole turns so consecutive longitudes differ by at most 180 degrees.
///
/// Paths crossing the antimeridian then draw the short way around.
pub fn wrap_longitudes(path: &mut [LonLat]) {
    let mut prev: Option<f64> = None;
    for p in path.iter_mut() {
        if let Some(prev_lon) = prev {
            let delta = p.lon - prev_lon;
            if delta.is_finite() && delta.abs() > 180.0 {
                p.lon -= (delta / 360.0).round() * 360.0;
            }
        }
        prev = Some(p.lon);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/viewport.rs"]
mod tests;
