//! Coordinates and map regions
//!
//! Both types validate on construction, so every `Coordinate` and `Region` that
//! exists is usable by the map view without further checks.

use crate::{Error, Result};
use geo::{Coord, Point, Rect};

/// Latitude bounds in degrees
pub const MAX_LATITUDE: f64 = 90.0;

/// Longitude bounds in degrees
pub const MAX_LONGITUDE: f64 = 180.0;

/// Earth's mean radius in meters
const EARTH_RADIUS_M: f64 = 6371000.0;

/// A WGS84 position in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-MAX_LATITUDE..=MAX_LATITUDE).contains(&latitude)
            && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&longitude);
        if !valid {
            return Err(Error::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// For compile-time constants known to be in range
    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in meters (Haversine formula)
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Linear interpolation towards `other`; `t` is clamped to [0, 1]
    ///
    /// Longitude takes the short way round, so crossing the antimeridian does not
    /// sweep across the whole globe.
    pub(crate) fn lerp(&self, other: &Coordinate, t: f64) -> Coordinate {
        let t = t.clamp(0.0, 1.0);
        let delta_lon = wrap_longitude(other.longitude - self.longitude);
        Coordinate {
            latitude: self.latitude + (other.latitude - self.latitude) * t,
            longitude: wrap_longitude(self.longitude + delta_lon * t),
        }
    }
}

impl From<Coordinate> for Point<f64> {
    /// `geo` points are (x = longitude, y = latitude)
    fn from(c: Coordinate) -> Self {
        Point::new(c.longitude, c.latitude)
    }
}

impl TryFrom<Point<f64>> for Coordinate {
    type Error = Error;

    fn try_from(p: Point<f64>) -> Result<Self> {
        Coordinate::new(p.y(), p.x())
    }
}

/// Normalize a longitude (or longitude difference) into [-180, 180)
fn wrap_longitude(longitude: f64) -> f64 {
    (longitude + MAX_LONGITUDE).rem_euclid(2.0 * MAX_LONGITUDE) - MAX_LONGITUDE
}

/// The visible map area: a center plus angular spans in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Region {
    center: Coordinate,
    latitude_span: f64,
    longitude_span: f64,
}

impl Region {
    /// Create a region, rejecting non-positive or non-finite spans
    pub fn new(center: Coordinate, latitude_span: f64, longitude_span: f64) -> Result<Self> {
        let valid = latitude_span.is_finite()
            && longitude_span.is_finite()
            && latitude_span > 0.0
            && longitude_span > 0.0
            && latitude_span <= 2.0 * MAX_LATITUDE
            && longitude_span <= 2.0 * MAX_LONGITUDE;
        if !valid {
            return Err(Error::InvalidRegion {
                latitude_span,
                longitude_span,
            });
        }
        Ok(Self {
            center,
            latitude_span,
            longitude_span,
        })
    }

    /// For compile-time constants known to be valid
    pub(crate) const fn new_unchecked(
        center: Coordinate,
        latitude_span: f64,
        longitude_span: f64,
    ) -> Self {
        Self {
            center,
            latitude_span,
            longitude_span,
        }
    }

    /// Square region of `span` degrees around `center`
    pub fn around(center: Coordinate, span: f64) -> Result<Self> {
        Self::new(center, span, span)
    }

    #[inline]
    pub fn center(&self) -> Coordinate {
        self.center
    }

    #[inline]
    pub fn latitude_span(&self) -> f64 {
        self.latitude_span
    }

    #[inline]
    pub fn longitude_span(&self) -> f64 {
        self.longitude_span
    }

    /// Bounding box in degrees (x = longitude, y = latitude)
    ///
    /// Longitudes are not wrapped: a region straddling the antimeridian has an
    /// edge beyond ±180.
    pub fn bounds(&self) -> Rect<f64> {
        let half_lat = self.latitude_span / 2.0;
        let half_lon = self.longitude_span / 2.0;
        Rect::new(
            Coord {
                x: self.center.longitude - half_lon,
                y: self.center.latitude - half_lat,
            },
            Coord {
                x: self.center.longitude + half_lon,
                y: self.center.latitude + half_lat,
            },
        )
    }

    /// Whether `coordinate` falls inside the region (edges included)
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        let bounds = self.bounds();
        let (min, max) = (bounds.min(), bounds.max());
        let delta_lon = wrap_longitude(coordinate.longitude - self.center.longitude);
        delta_lon.abs() <= self.longitude_span / 2.0
            && (min.y..=max.y).contains(&coordinate.latitude)
    }

    /// Interpolate center and spans towards `other`; `t` is clamped to [0, 1]
    pub(crate) fn lerp(&self, other: &Region, t: f64) -> Region {
        if t >= 1.0 {
            return *other;
        }
        let t = t.max(0.0);
        Region {
            center: self.center.lerp(&other.center, t),
            latitude_span: self.latitude_span + (other.latitude_span - self.latitude_span) * t,
            longitude_span: self.longitude_span
                + (other.longitude_span - self.longitude_span) * t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.01, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_region_rejects_bad_spans() {
        let c = Coordinate::new(37.5583, 127.001).unwrap();
        assert!(Region::new(c, 0.005, 0.005).is_ok());
        assert!(Region::new(c, 0.0, 0.005).is_err());
        assert!(Region::new(c, 0.005, -1.0).is_err());
        assert!(Region::new(c, f64::NAN, 0.005).is_err());
    }

    #[test]
    fn test_region_contains() {
        let c = Coordinate::new(37.56, 126.99).unwrap();
        let region = Region::around(c, 0.01).unwrap();
        assert!(region.contains(&c));
        assert!(region.contains(&Coordinate::new(37.564, 126.994).unwrap()));
        assert!(!region.contains(&Coordinate::new(37.57, 126.99).unwrap()));
    }

    #[test]
    fn test_region_lerp_endpoints() {
        let a = Region::around(Coordinate::new(37.0, 127.0).unwrap(), 0.01).unwrap();
        let b = Region::around(Coordinate::new(38.0, 128.0).unwrap(), 0.02).unwrap();
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.center().latitude() - 37.5).abs() < 1e-9);
        assert!((mid.latitude_span() - 0.015).abs() < 1e-9);
    }

    #[test]
    fn test_lerp_crosses_antimeridian_the_short_way() {
        let east = Coordinate::new(10.0, 179.9).unwrap();
        let west = Coordinate::new(10.0, -179.9).unwrap();

        let quarter = east.lerp(&west, 0.25);
        assert!((quarter.longitude() - 179.95).abs() < 1e-9);

        let mid = east.lerp(&west, 0.5);
        assert!((mid.longitude().abs() - 180.0).abs() < 1e-9);

        let back = west.lerp(&east, 0.25);
        assert!((back.longitude() + 179.95).abs() < 1e-9);

        let a = Region::around(east, 0.01).unwrap();
        let b = Region::around(west, 0.01).unwrap();
        for step in 0..=10 {
            let frame = a.lerp(&b, step as f64 / 10.0);
            assert!(frame.center().longitude().abs() >= 179.9 - 1e-9);
        }
    }

    #[test]
    fn test_region_contains_across_antimeridian() {
        let region = Region::around(Coordinate::new(0.0, 179.999).unwrap(), 0.01).unwrap();
        assert!(region.contains(&Coordinate::new(0.0, -179.998).unwrap()));
        assert!(region.contains(&Coordinate::new(0.001, 179.995).unwrap()));
        assert!(!region.contains(&Coordinate::new(0.0, -179.9).unwrap()));
        assert!(!region.contains(&Coordinate::new(0.0, 0.0).unwrap()));
    }

    #[test]
    fn test_distance_to() {
        // Seoul City Hall to Namsan Tower is roughly 2 km
        let city_hall = Coordinate::new(37.5663, 126.9779).unwrap();
        let namsan = Coordinate::new(37.5512, 126.9882).unwrap();
        let d = city_hall.distance_to(&namsan);
        assert!(d > 1500.0 && d < 2500.0, "distance was {d}");
        assert!(city_hall.distance_to(&city_hall) < 1e-6);
    }

    #[test]
    fn test_point_conversion() {
        let c = Coordinate::new(37.5607, 126.9946).unwrap();
        let p: Point<f64> = c.into();
        assert_eq!(p.x(), 126.9946);
        assert_eq!(p.y(), 37.5607);
        assert_eq!(Coordinate::try_from(p).unwrap(), c);
    }
}
