use rstar::{AABB, Envelope, PointDistance, RTreeObject};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS: f64 = 6_371_000.0;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }

    pub fn haversine_distance(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.lat, self.lon, other.lat, other.lon)
    }
}

impl RTreeObject for GeoPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lon, self.lat])
    }
}

impl PointDistance for GeoPoint {
    fn distance_2(&self, point: &<Self::Envelope as Envelope>::Point) -> f64 {
        haversine_distance(self.lat, self.lon, point[1], point[0]).powi(2)
    }
}

impl From<GeoPoint> for geo_types::Point {
    fn from(point: GeoPoint) -> Self {
        geo_types::Point::new(point.lon, point.lat)
    }
}

pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();

    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance_zero() {
        let p = GeoPoint::new(42.3601, -71.0589);
        assert_eq!(p.haversine_distance(&p), 0.0);
    }

    #[test]
    fn test_haversine_distance_boston_cambridge() {
        // Boston Common to Harvard Square, roughly 5.5 km
        let boston = GeoPoint::new(42.3550, -71.0656);
        let harvard = GeoPoint::new(42.3736, -71.1190);

        let distance = boston.haversine_distance(&harvard);
        assert!(distance > 4_500.0 && distance < 6_500.0, "got {distance}");
    }

    #[test]
    fn test_haversine_distance_symmetric() {
        let a = GeoPoint::new(48.8566, 2.3522);
        let b = GeoPoint::new(51.5074, -0.1278);
        assert!((a.haversine_distance(&b) - b.haversine_distance(&a)).abs() < 1e-9);
    }
}
