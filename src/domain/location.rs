use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance in kilometres (haversine formula).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

/// Named anchor point of a university, used by distance-from search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UniversityLocation {
    pub id: Uuid,
    pub university_code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

impl UniversityLocation {
    pub fn new(university_code: String, name: String, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            university_code,
            name,
            latitude,
            longitude,
            created_at: Utc::now(),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_ranges() {
        assert!(Coordinates::new(22.28, 114.13).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(90.5, 114.13).is_valid());
        assert!(!Coordinates::new(22.28, -180.1).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let hku = Coordinates::new(22.28405, 114.13784);
        assert!(hku.distance_km(&hku).abs() < 1e-9);
    }

    #[test]
    fn test_distance_hku_to_cuhk() {
        // HKU main campus to CUHK, roughly 16.6 km apart
        let hku = Coordinates::new(22.28405, 114.13784);
        let cuhk = Coordinates::new(22.41907, 114.20693);

        let d = hku.distance_km(&cuhk);
        assert!((d - 16.6).abs() < 0.5, "unexpected distance {d}");
    }

    #[test]
    fn test_distance_along_parallel_and_meridian() {
        let origin = Coordinates::new(22.28, 114.15);

        let east = Coordinates::new(22.28, 114.25);
        assert!((origin.distance_km(&east) - 10.3).abs() < 0.1);

        let north = Coordinates::new(22.38, 114.15);
        assert!((origin.distance_km(&north) - 11.1).abs() < 0.1);
    }

    #[test]
    fn test_distance_hku_to_hkust() {
        let hku = Coordinates::new(22.2831, 114.1372);
        let hkust = Coordinates::new(22.3363, 114.2634);

        assert!((hku.distance_km(&hkust) - 14.1).abs() < 0.5);
    }

    #[test]
    fn test_distance_quarter_meridian() {
        let equator = Coordinates::new(0.0, 0.0);
        let pole = Coordinates::new(90.0, 0.0);

        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((equator.distance_km(&pole) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinates::new(22.3364, 114.2655);
        let b = Coordinates::new(22.2783, 114.1747);

        assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
    }
}
