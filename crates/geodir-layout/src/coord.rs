//! Geographic and screen-space coordinates.
//!
//! [`LatLon`] is a point on the globe in degrees. [`ScreenPoint`] is a pixel
//! position (or offset) in the projected plane of one zoom level, with `y`
//! growing downwards like a browser layer point.

use std::fmt;
use std::ops::{Add, Sub};

use thiserror::Error;

/// Rounding scale for coordinate keys: 5 decimal places.
pub const COORD_KEY_SCALE: f64 = 1e5;

/// Decimal places kept by a coordinate key.
const COORD_KEY_DECIMALS: usize = 5;

/// Errors raised when validating raw coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is not a finite value in [-90, 90]
    #[error("invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    /// Longitude is not a finite value in [-180, 180]
    #[error("invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLon {
    /// Latitude, positive north
    pub lat: f64,
    /// Longitude, positive east
    pub lon: f64,
}

impl LatLon {
    /// Create a coordinate without validation.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn try_new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// The coincidence key for this coordinate.
    pub fn key(&self) -> CoordinateKey {
        CoordinateKey::from(*self)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// A coordinate rounded to 5 decimal places.
///
/// Two points within roughly a meter of each other share a key, which
/// absorbs floating-point and spreadsheet export noise without merging
/// distinct nearby addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinateKey {
    lat_e5: i64,
    lon_e5: i64,
}

impl CoordinateKey {
    /// The coordinate the key rounds to.
    pub fn base(&self) -> LatLon {
        LatLon::new(
            self.lat_e5 as f64 / COORD_KEY_SCALE,
            self.lon_e5 as f64 / COORD_KEY_SCALE,
        )
    }
}

impl From<LatLon> for CoordinateKey {
    fn from(coord: LatLon) -> Self {
        Self {
            lat_e5: round_e5(coord.lat),
            lon_e5: round_e5(coord.lon),
        }
    }
}

/// Round to 5 decimal places on the decimal expansion of `value`, halves
/// away from zero. 45.000015 is stored just below the halfway point and
/// keys as 45.00001, although `45.000015 * 1e5` rounds to 4500001.5.
fn round_e5(value: f64) -> i64 {
    let fallback = (value * COORD_KEY_SCALE).round() as i64;

    // 30 places settle the sixth decimal of any in-range coordinate.
    let digits = format!("{:.30}", value.abs());
    let Some((whole, frac)) = digits.split_once('.') else {
        return fallback;
    };
    let (kept, rest) = frac.split_at(COORD_KEY_DECIMALS);
    let Ok(mut scaled) = format!("{}{}", whole, kept).parse::<i64>() else {
        return fallback;
    };
    if rest.as_bytes().first().is_some_and(|&d| d >= b'5') {
        scaled += 1;
    }

    if value.is_sign_negative() {
        -scaled
    } else {
        scaled
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.base();
        write!(f, "{:.5},{:.5}", base.lat, base.lon)
    }
}

/// A point or offset in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    /// The zero offset.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset of length `radius` in direction `angle` (radians, clockwise
    /// on screen since `y` points down).
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Length of this point taken as an offset.
    pub fn length(&self) -> f64 {
        self.distance(&Self::ZERO)
    }
}

impl Add for ScreenPoint {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for ScreenPoint {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_points_share_key() {
        let a = LatLon::new(48.85661, 2.35222);
        let b = LatLon::new(48.856608, 2.352221);
        let c = LatLon::new(48.85700, 2.35222);

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn key_base_is_rounded_coordinate() {
        let key = LatLon::new(48.856608, 2.352221).key();
        let base = key.base();
        assert!((base.lat - 48.85661).abs() < 1e-12);
        assert!((base.lon - 2.35222).abs() < 1e-12);
        assert_eq!(key.to_string(), "48.85661,2.35222");
    }

    #[test]
    fn key_rounds_the_stored_decimal() {
        // Stored as 45.00001499999..., so it rounds down.
        assert_eq!(LatLon::new(45.000015, 2.0).key().to_string(), "45.00001,2.00000");
        assert_eq!(LatLon::new(45.000024, 2.0).key().to_string(), "45.00002,2.00000");
        assert_ne!(
            LatLon::new(45.000015, 2.0).key(),
            LatLon::new(45.000024, 2.0).key()
        );
    }

    #[test]
    fn exact_halves_round_away_from_zero() {
        // 1/64 is exactly representable.
        assert_eq!(LatLon::new(0.015625, -0.015625).key().to_string(), "0.01563,-0.01563");
    }

    #[test]
    fn non_finite_coordinates_still_key() {
        let _ = LatLon::new(f64::NAN, 0.0).key();
        let _ = LatLon::new(f64::INFINITY, 0.0).key();
    }

    #[test]
    fn negative_coordinates_round_symmetrically() {
        let key = LatLon::new(-33.868824, -151.209296).key();
        assert_eq!(key.to_string(), "-33.86882,-151.20930");
    }

    #[test]
    fn try_new_rejects_out_of_range() {
        assert!(LatLon::try_new(46.7, 1.7).is_ok());
        assert_eq!(
            LatLon::try_new(91.0, 0.0),
            Err(CoordError::InvalidLatitude(91.0))
        );
        assert_eq!(
            LatLon::try_new(0.0, -180.5),
            Err(CoordError::InvalidLongitude(-180.5))
        );
        assert!(LatLon::try_new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn polar_offsets() {
        let east = ScreenPoint::polar(18.0, 0.0);
        assert!((east.x - 18.0).abs() < 1e-12);
        assert!(east.y.abs() < 1e-12);

        let down = ScreenPoint::polar(10.0, std::f64::consts::FRAC_PI_2);
        assert!(down.x.abs() < 1e-12);
        assert!((down.y - 10.0).abs() < 1e-12);
        assert!((down.length() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn addition_subtraction() {
        let a = ScreenPoint::new(1.0, 2.0);
        let b = ScreenPoint::new(4.0, -1.0);
        assert_eq!(a + b, ScreenPoint::new(5.0, 1.0));
        assert_eq!(a - b, ScreenPoint::new(-3.0, 3.0));
    }
}
