//! Map projection between geographic and screen coordinates.
//!
//! Jitter offsets are expressed in pixels, so placement needs the map's
//! projection for the current zoom level. The map renderer owns the real
//! projection; [`WebMercator`] reproduces the one used by slippy-map
//! widgets so placements can be computed away from the browser.

use std::f64::consts::PI;

use crate::coord::{LatLon, ScreenPoint};

/// Maximum latitude representable in Web Mercator.
pub const MAX_MERCATOR_LAT: f64 = 85.0511287798;

/// Tile edge length in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Conversion between geographic coordinates and screen pixels at a zoom.
///
/// Implementations must round-trip: `unproject(project(c, z), z)` returns
/// `c` within floating-point tolerance for any coordinate inside the
/// projection's domain.
pub trait Projection {
    /// Geographic coordinate to pixel position at `zoom`.
    fn project(&self, coord: LatLon, zoom: f64) -> ScreenPoint;

    /// Pixel position at `zoom` back to a geographic coordinate.
    fn unproject(&self, point: ScreenPoint, zoom: f64) -> LatLon;
}

impl<P: Projection + ?Sized> Projection for &P {
    fn project(&self, coord: LatLon, zoom: f64) -> ScreenPoint {
        (**self).project(coord, zoom)
    }

    fn unproject(&self, point: ScreenPoint, zoom: f64) -> LatLon {
        (**self).unproject(point, zoom)
    }
}

/// Spherical Web Mercator (EPSG:3857) in world pixels.
///
/// Pixel origin is the north-west corner of the world; the world is
/// `tile_size * 2^zoom` pixels wide. Latitude is clamped to
/// [`MAX_MERCATOR_LAT`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    tile_size: f64,
}

impl WebMercator {
    /// Create a projection with a custom tile size.
    pub const fn with_tile_size(tile_size: f64) -> Self {
        Self { tile_size }
    }

    /// World width in pixels at `zoom`.
    #[inline]
    pub fn world_size(&self, zoom: f64) -> f64 {
        self.tile_size * zoom.exp2()
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::with_tile_size(TILE_SIZE)
    }
}

impl Projection for WebMercator {
    fn project(&self, coord: LatLon, zoom: f64) -> ScreenPoint {
        let scale = self.world_size(zoom);
        let lat = coord.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let lat_rad = lat.to_radians();

        let x = (coord.lon / 360.0 + 0.5) * scale;
        let y = (0.5 - (PI / 4.0 + lat_rad / 2.0).tan().ln() / (2.0 * PI)) * scale;
        ScreenPoint::new(x, y)
    }

    fn unproject(&self, point: ScreenPoint, zoom: f64) -> LatLon {
        let scale = self.world_size(zoom);

        let lon = (point.x / scale - 0.5) * 360.0;
        let merc_y = (0.5 - point.y / scale) * 2.0 * PI;
        let lat = (2.0 * merc_y.exp().atan() - PI / 2.0).to_degrees();
        LatLon::new(lat, lon)
    }
}
