use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated (latitude, longitude) pair. Components are always finite and
/// in range, which makes the manual `Eq`/`Hash` impls over the raw bit
/// patterns sound (no NaN can get in).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(ValidationError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatitudeRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::LongitudeRange(lon));
        }

        // canonicalize -0.0 so values equal by `==` share one bit pattern,
        // keeping the bit-based `Hash` consistent with `PartialEq`
        Ok(Coordinate {
            lat: lat + 0.0,
            lon: lon + 0.0,
        })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.lat.to_bits());
        state.write_u64(self.lon.to_bits());
    }
}

impl From<Coordinate> for geo_types::Point {
    fn from(coordinate: Coordinate) -> Self {
        geo_types::Point::new(coordinate.lon, coordinate.lat)
    }
}

impl From<Coordinate> for georouter_graph::GeoPoint {
    fn from(coordinate: Coordinate) -> Self {
        georouter_graph::GeoPoint::new(coordinate.lat, coordinate.lon)
    }
}

/// Conversion from the array-likes callers actually hold: tuples, fixed
/// arrays, slices, vectors, or `geo_types` points. Slice-backed forms fail
/// with an arity error when they do not have exactly two components.
pub trait IntoCoordinate {
    fn into_coordinate(self) -> Result<Coordinate, ValidationError>;
}

impl IntoCoordinate for Coordinate {
    fn into_coordinate(self) -> Result<Coordinate, ValidationError> {
        Ok(self)
    }
}

impl IntoCoordinate for (f64, f64) {
    fn into_coordinate(self) -> Result<Coordinate, ValidationError> {
        Coordinate::new(self.0, self.1)
    }
}

impl IntoCoordinate for [f64; 2] {
    fn into_coordinate(self) -> Result<Coordinate, ValidationError> {
        Coordinate::new(self[0], self[1])
    }
}

impl IntoCoordinate for &[f64] {
    fn into_coordinate(self) -> Result<Coordinate, ValidationError> {
        match self {
            [lat, lon] => Coordinate::new(*lat, *lon),
            other => Err(ValidationError::Arity(other.len())),
        }
    }
}

impl IntoCoordinate for Vec<f64> {
    fn into_coordinate(self) -> Result<Coordinate, ValidationError> {
        self.as_slice().into_coordinate()
    }
}

impl IntoCoordinate for geo_types::Point {
    fn into_coordinate(self) -> Result<Coordinate, ValidationError> {
        Coordinate::new(self.y(), self.x())
    }
}

impl IntoCoordinate for &Coordinate {
    fn into_coordinate(self) -> Result<Coordinate, ValidationError> {
        Ok(*self)
    }
}

/// Normalize a whole collection into canonical coordinates. Pure: the input
/// is only read, never reordered.
pub fn normalize_coords<I>(coords: I) -> Result<Vec<Coordinate>, ValidationError>
where
    I: IntoIterator,
    I::Item: IntoCoordinate,
{
    coords
        .into_iter()
        .map(IntoCoordinate::into_coordinate)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let c = Coordinate::new(42.36, -71.05).unwrap();
        assert_eq!(c.lat(), 42.36);
        assert_eq!(c.lon(), -71.05);
    }

    #[test]
    fn test_latitude_out_of_range() {
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(ValidationError::LatitudeRange(91.0))
        );
    }

    #[test]
    fn test_longitude_out_of_range() {
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(ValidationError::LongitudeRange(-180.5))
        );
    }

    #[test]
    fn test_nan_rejected() {
        assert_eq!(
            Coordinate::new(f64::NAN, 0.0),
            Err(ValidationError::NotFinite)
        );
    }

    #[test]
    fn test_negative_zero_hashes_like_zero() {
        use fxhash::FxHashMap;

        let positive = Coordinate::new(0.0, 0.0).unwrap();
        let negative = Coordinate::new(-0.0, -0.0).unwrap();

        assert_eq!(positive, negative);
        assert_eq!(negative.lat().to_bits(), 0.0f64.to_bits());

        let mut map = FxHashMap::default();
        map.insert(positive, "cell");
        assert_eq!(map.get(&negative), Some(&"cell"));
    }

    #[test]
    fn test_slice_arity() {
        let three: &[f64] = &[1.0, 2.0, 3.0];
        assert_eq!(three.into_coordinate(), Err(ValidationError::Arity(3)));

        let two: &[f64] = &[1.0, 2.0];
        assert!(two.into_coordinate().is_ok());
    }

    #[test]
    fn test_normalize_mixed_forms() {
        let from_tuples = normalize_coords([(42.0, -71.0), (43.0, -72.0)]).unwrap();
        let from_arrays = normalize_coords([[42.0, -71.0], [43.0, -72.0]]).unwrap();
        let from_vecs = normalize_coords(vec![vec![42.0, -71.0], vec![43.0, -72.0]]).unwrap();

        assert_eq!(from_tuples, from_arrays);
        assert_eq!(from_tuples, from_vecs);
    }

    #[test]
    fn test_geo_point_is_lon_lat() {
        let c = normalize_coords([geo_types::Point::new(-71.0, 42.0)]).unwrap();
        assert_eq!(c[0].lat(), 42.0);
        assert_eq!(c[0].lon(), -71.0);
    }

    #[test]
    fn test_normalize_surfaces_first_error() {
        let result = normalize_coords(vec![vec![42.0, -71.0], vec![1.0, 2.0, 3.0]]);
        assert_eq!(result, Err(ValidationError::Arity(3)));
    }
}
