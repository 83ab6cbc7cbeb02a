use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::location::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "accommodation_type", rename_all = "lowercase")]
pub enum AccommodationType {
    Apartment,
    House,
    Villa,
    Studio,
    Hostel,
    Shared,
}

/// Result of a successful address lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub latitude: f64,
    pub longitude: f64,
    pub geo_address: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Accommodation {
    pub id: Uuid,
    pub accommodation_type: AccommodationType,
    pub address: String,
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub flat_number: Option<String>,
    pub floor_number: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geo_address: Option<String>,
    pub available_from: NaiveDate,
    pub available_until: NaiveDate,
    pub beds: i32,
    pub bedrooms: i32,
    pub daily_price: f64,
    pub owner_id: Uuid,
    pub specialist_id: Option<Uuid>,
    pub universities: Vec<String>,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a specialist supplies when listing an accommodation.
#[derive(Debug, Clone, PartialEq)]
pub struct AccommodationDraft {
    pub accommodation_type: AccommodationType,
    pub address: String,
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub flat_number: Option<String>,
    pub floor_number: Option<String>,
    pub available_from: NaiveDate,
    pub available_until: NaiveDate,
    pub beds: i32,
    pub bedrooms: i32,
    pub daily_price: f64,
    pub universities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccommodationPatch {
    pub accommodation_type: Option<AccommodationType>,
    pub address: Option<String>,
    pub building_name: Option<String>,
    pub room_number: Option<String>,
    pub flat_number: Option<String>,
    pub floor_number: Option<String>,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
    pub beds: Option<i32>,
    pub bedrooms: Option<i32>,
    pub daily_price: Option<f64>,
    pub owner_id: Option<Uuid>,
    pub universities: Option<Vec<String>>,
}

impl Accommodation {
    pub fn new(draft: AccommodationDraft, owner_id: Uuid, specialist_id: Uuid) -> Self {
        let now = Utc::now();
        let mut universities = draft.universities;
        universities.sort();
        universities.dedup();

        Self {
            id: Uuid::new_v4(),
            accommodation_type: draft.accommodation_type,
            address: draft.address,
            building_name: draft.building_name,
            room_number: draft.room_number,
            flat_number: draft.flat_number,
            floor_number: draft.floor_number,
            latitude: None,
            longitude: None,
            geo_address: None,
            available_from: draft.available_from,
            available_until: draft.available_until,
            beds: draft.beds,
            bedrooms: draft.bedrooms,
            daily_price: draft.daily_price,
            owner_id,
            specialist_id: Some(specialist_id),
            universities,
            average_rating: None,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the patch and reports whether the geocoding input changed.
    pub fn update(&mut self, patch: AccommodationPatch) -> bool {
        let before = self.geocode_query().to_string();

        if let Some(t) = patch.accommodation_type {
            self.accommodation_type = t;
        }
        if let Some(a) = patch.address {
            self.address = a;
        }
        if patch.building_name.is_some() {
            self.building_name = patch.building_name;
        }
        if patch.room_number.is_some() {
            self.room_number = patch.room_number;
        }
        if patch.flat_number.is_some() {
            self.flat_number = patch.flat_number;
        }
        if patch.floor_number.is_some() {
            self.floor_number = patch.floor_number;
        }
        if let Some(d) = patch.available_from {
            self.available_from = d;
        }
        if let Some(d) = patch.available_until {
            self.available_until = d;
        }
        if let Some(b) = patch.beds {
            self.beds = b;
        }
        if let Some(b) = patch.bedrooms {
            self.bedrooms = b;
        }
        if let Some(p) = patch.daily_price {
            self.daily_price = p;
        }
        if let Some(o) = patch.owner_id {
            self.owner_id = o;
        }
        if let Some(mut u) = patch.universities {
            u.sort();
            u.dedup();
            self.universities = u;
        }
        self.updated_at = Utc::now();

        before != self.geocode_query()
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        if self.available_from > self.available_until {
            return Err("available_until must not be before available_from".to_string());
        }
        if !(self.daily_price > 0.0) {
            return Err("daily_price must be positive".to_string());
        }
        if self.beds < 0 || self.bedrooms < 0 {
            return Err("beds and bedrooms must not be negative".to_string());
        }
        if self.address.trim().is_empty() {
            return Err("address must not be empty".to_string());
        }
        if self.universities.is_empty() {
            return Err("at least one university must be selected".to_string());
        }
        Ok(())
    }

    /// Building names resolve more reliably than street addresses.
    pub fn geocode_query(&self) -> &str {
        match self.building_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.address,
        }
    }

    pub fn apply_geocode(&mut self, geocoded: Option<GeocodedAddress>) {
        match geocoded {
            Some(g) => {
                self.latitude = Some(g.latitude);
                self.longitude = Some(g.longitude);
                self.geo_address = Some(g.geo_address);
            }
            None => {
                self.latitude = None;
                self.longitude = None;
                self.geo_address = None;
            }
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }

    pub fn is_offered_to(&self, university_code: &str) -> bool {
        self.universities.iter().any(|u| u == university_code)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_accommodation(universities: &[&str]) -> Accommodation {
        let draft = AccommodationDraft {
            accommodation_type: AccommodationType::Studio,
            address: "8 University Drive, Pok Fu Lam".to_string(),
            building_name: None,
            room_number: None,
            flat_number: Some("S1".to_string()),
            floor_number: Some("1".to_string()),
            available_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            available_until: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            beds: 1,
            bedrooms: 1,
            daily_price: 120.0,
            universities: universities.iter().map(|u| u.to_string()).collect(),
        };
        Accommodation::new(draft, Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_new_dedups_universities() {
        let acc = make_accommodation(&["HKU", "CU", "HKU"]);
        assert_eq!(acc.universities, vec!["CU".to_string(), "HKU".to_string()]);
        assert!(acc.is_offered_to("HKU"));
        assert!(!acc.is_offered_to("HKUST"));
        assert!(acc.coordinates().is_none());
    }

    #[test]
    fn test_invariants_reject_reversed_dates() {
        let mut acc = make_accommodation(&["HKU"]);
        acc.available_from = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        acc.available_until = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

        let err = acc.check_invariants().unwrap_err();
        assert!(err.contains("available_until"));
    }

    #[test]
    fn test_invariants_accept_single_day_window() {
        let mut acc = make_accommodation(&["HKU"]);
        acc.available_until = acc.available_from;
        assert!(acc.check_invariants().is_ok());
    }

    #[test]
    fn test_invariants_reject_non_positive_price() {
        let mut acc = make_accommodation(&["HKU"]);
        acc.daily_price = 0.0;
        assert!(acc.check_invariants().is_err());

        acc.daily_price = f64::NAN;
        assert!(acc.check_invariants().is_err());
    }

    #[test]
    fn test_invariants_reject_empty_universities() {
        let mut acc = make_accommodation(&["HKU"]);
        acc.universities.clear();
        assert!(acc.check_invariants().is_err());
    }

    #[test]
    fn test_geocode_query_prefers_building_name() {
        let mut acc = make_accommodation(&["HKU"]);
        assert_eq!(acc.geocode_query(), "8 University Drive, Pok Fu Lam");

        acc.building_name = Some("Chow Yei Ching Building".to_string());
        assert_eq!(acc.geocode_query(), "Chow Yei Ching Building");

        acc.building_name = Some("  ".to_string());
        assert_eq!(acc.geocode_query(), "8 University Drive, Pok Fu Lam");
    }

    #[test]
    fn test_update_reports_address_change() {
        let mut acc = make_accommodation(&["HKU"]);

        let changed = acc.update(AccommodationPatch {
            daily_price: Some(95.0),
            ..Default::default()
        });
        assert!(!changed);
        assert_eq!(acc.daily_price, 95.0);

        let changed = acc.update(AccommodationPatch {
            address: Some("12 Science Park Road, Sha Tin".to_string()),
            ..Default::default()
        });
        assert!(changed);
    }

    #[test]
    fn test_apply_geocode_failure_clears_coordinates() {
        let mut acc = make_accommodation(&["HKU"]);
        acc.apply_geocode(Some(GeocodedAddress {
            latitude: 22.28,
            longitude: 114.13,
            geo_address: "3658519520T20050430".to_string(),
        }));
        assert_eq!(acc.coordinates(), Some(Coordinates::new(22.28, 114.13)));

        acc.apply_geocode(None);
        assert!(acc.coordinates().is_none());
        assert!(acc.geo_address.is_none());
    }
}
