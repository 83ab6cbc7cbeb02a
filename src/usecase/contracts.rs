use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    domain::accommodation::{Accommodation, AccommodationType, GeocodedAddress},
    domain::location::UniversityLocation,
    domain::member::Member,
    domain::notification::Notification,
    domain::owner::PropertyOwner,
    domain::rating::{Rating, RatingView},
    domain::reservation::{Reservation, ReservationStatus},
    domain::role::RoleKind,
    domain::specialist::Specialist,
    domain::university::University,
    repository::errors::RepositoryError,
};

#[cfg_attr(test, mockall::automock)]
pub trait UniversityRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<University>, RepositoryError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<University>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, location: &UniversityLocation) -> Result<(), RepositoryError>;
    async fn find_by_name(
        &self,
        university_code: &str,
        name: &str,
    ) -> Result<Option<UniversityLocation>, RepositoryError>;
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<UniversityLocation>, RepositoryError>;
    async fn delete(&self, university_code: &str, id: Uuid) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait OwnerRepository: Send + Sync {
    async fn create(&self, owner: &PropertyOwner) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PropertyOwner>, RepositoryError>;
    async fn list(&self) -> Result<Vec<PropertyOwner>, RepositoryError>;
    async fn update(&self, owner: &PropertyOwner) -> Result<(), RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, member: &Member) -> Result<(), RepositoryError>;
    async fn find_by_uid(&self, uid: &str) -> Result<Option<Member>, RepositoryError>;
    /// Inserts the member unless the uid is taken, then returns the stored row.
    async fn find_or_create(&self, member: &Member) -> Result<Member, RepositoryError>;
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<Member>, RepositoryError>;
    async fn update(&self, member: &Member) -> Result<(), RepositoryError>;
    async fn delete(&self, uid: &str) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait SpecialistRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Specialist>, RepositoryError>;
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<Specialist>, RepositoryError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccommodationFilter {
    pub university_code: String,
    pub accommodation_type: Option<AccommodationType>,
    pub beds: Option<i32>,
    pub min_beds: Option<i32>,
    pub bedrooms: Option<i32>,
    pub min_bedrooms: Option<i32>,
    pub rating: Option<i16>,
    pub min_rating: Option<f64>,
    pub max_price: Option<f64>,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
    pub address: Option<String>,
}

impl AccommodationFilter {
    /// The conjunction the store evaluates in SQL. Availability is an overlap
    /// test with inclusive bounds; `rating` compares the rounded average.
    pub fn matches(&self, accommodation: &Accommodation) -> bool {
        let address_matches = |needle: &str| {
            let needle = needle.to_lowercase();
            accommodation.address.to_lowercase().contains(&needle)
                || accommodation
                    .geo_address
                    .as_deref()
                    .is_some_and(|geo| geo.to_lowercase().contains(&needle))
        };

        accommodation.is_offered_to(&self.university_code)
            && self.accommodation_type.is_none_or(|t| accommodation.accommodation_type == t)
            && self.beds.is_none_or(|b| accommodation.beds == b)
            && self.min_beds.is_none_or(|b| accommodation.beds >= b)
            && self.bedrooms.is_none_or(|b| accommodation.bedrooms == b)
            && self.min_bedrooms.is_none_or(|b| accommodation.bedrooms >= b)
            && self
                .rating
                .is_none_or(|r| accommodation.average_rating.is_some_and(|avg| avg.round() == f64::from(r)))
            && self
                .min_rating
                .is_none_or(|min| accommodation.average_rating.is_some_and(|avg| avg >= min))
            && self.max_price.is_none_or(|max| accommodation.daily_price <= max)
            && self.available_from.is_none_or(|from| accommodation.available_until >= from)
            && self.available_until.is_none_or(|until| accommodation.available_from <= until)
            && self.address.as_deref().is_none_or(address_matches)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait AccommodationRepository: Send + Sync {
    async fn create(&self, accommodation: &Accommodation) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Accommodation>, RepositoryError>;
    async fn search(&self, filter: &AccommodationFilter) -> Result<Vec<Accommodation>, RepositoryError>;
    async fn update(&self, accommodation: &Accommodation) -> Result<(), RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ReservationRepository: Send + Sync {
    async fn create(&self, reservation: &Reservation) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, RepositoryError>;
    async fn list_by_member(&self, member_uid: &str) -> Result<Vec<Reservation>, RepositoryError>;
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<Reservation>, RepositoryError>;
    /// Compare-and-set on `status`; `None` when the row no longer has `expected`.
    async fn transition(
        &self,
        id: Uuid,
        expected: ReservationStatus,
        next: ReservationStatus,
        cancelled_by: Option<RoleKind>,
    ) -> Result<Option<Reservation>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RatingRepository: Send + Sync {
    async fn create(&self, rating: &Rating) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RatingView>, RepositoryError>;
    async fn list_by_member(&self, member_uid: &str) -> Result<Vec<RatingView>, RepositoryError>;
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<RatingView>, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<(), RepositoryError>;
    async fn find_by_recipient(
        &self,
        kind: RoleKind,
        recipient_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, RepositoryError>;
    async fn count_unread(&self, kind: RoleKind, recipient_id: &str) -> Result<i64, RepositoryError>;
    async fn mark_as_read(&self, id: Uuid, kind: RoleKind, recipient_id: &str) -> Result<(), RepositoryError>;
}

/// Address lookup; failures are absorbed and reported as `None`.
#[cfg_attr(test, mockall::automock)]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Option<GeocodedAddress>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accommodation::tests::make_accommodation;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hku() -> AccommodationFilter {
        AccommodationFilter {
            university_code: "HKU".to_string(),
            ..Default::default()
        }
    }

    fn listing() -> Accommodation {
        let mut acc = make_accommodation(&["HKU", "CU"]);
        acc.beds = 2;
        acc.bedrooms = 1;
        acc.daily_price = 300.0;
        acc.geo_address = Some("PokFuLam Road Block 3".to_string());
        acc.average_rating = Some(3.5);
        acc.rating_count = 2;
        acc
    }

    #[test]
    fn test_empty_filter_is_scoped_to_university() {
        let acc = listing();

        assert!(hku().matches(&acc));
        let hkust = AccommodationFilter {
            university_code: "HKUST".to_string(),
            ..Default::default()
        };
        assert!(!hkust.matches(&acc));
    }

    #[test]
    fn test_type_filter() {
        let acc = listing();

        assert!(AccommodationFilter { accommodation_type: Some(AccommodationType::Studio), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { accommodation_type: Some(AccommodationType::Villa), ..hku() }.matches(&acc));
    }

    #[test]
    fn test_bed_and_bedroom_filters() {
        let acc = listing();

        assert!(AccommodationFilter { beds: Some(2), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { beds: Some(3), ..hku() }.matches(&acc));
        assert!(AccommodationFilter { min_beds: Some(2), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { min_beds: Some(3), ..hku() }.matches(&acc));
        assert!(AccommodationFilter { bedrooms: Some(1), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { bedrooms: Some(2), ..hku() }.matches(&acc));
        assert!(AccommodationFilter { min_bedrooms: Some(1), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { min_bedrooms: Some(2), ..hku() }.matches(&acc));
    }

    #[test]
    fn test_rating_filters() {
        let acc = listing();

        // 3.5 rounds half away from zero.
        assert!(AccommodationFilter { rating: Some(4), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { rating: Some(3), ..hku() }.matches(&acc));
        assert!(AccommodationFilter { min_rating: Some(3.5), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { min_rating: Some(3.6), ..hku() }.matches(&acc));

        let mut unrated = listing();
        unrated.average_rating = None;
        assert!(!AccommodationFilter { rating: Some(0), ..hku() }.matches(&unrated));
        assert!(!AccommodationFilter { min_rating: Some(0.0), ..hku() }.matches(&unrated));
    }

    #[test]
    fn test_max_price_is_inclusive() {
        let acc = listing();

        assert!(AccommodationFilter { max_price: Some(300.0), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { max_price: Some(299.99), ..hku() }.matches(&acc));
    }

    #[test]
    fn test_availability_overlap_bounds_are_inclusive() {
        // listing window: 2025-01-01 ..= 2025-12-31
        let acc = listing();

        assert!(AccommodationFilter { available_from: Some(date(2025, 12, 31)), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { available_from: Some(date(2026, 1, 1)), ..hku() }.matches(&acc));
        assert!(AccommodationFilter { available_until: Some(date(2025, 1, 1)), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { available_until: Some(date(2024, 12, 31)), ..hku() }.matches(&acc));

        let inside = AccommodationFilter {
            available_from: Some(date(2025, 3, 1)),
            available_until: Some(date(2025, 3, 10)),
            ..hku()
        };
        assert!(inside.matches(&acc));

        let straddling = AccommodationFilter {
            available_from: Some(date(2024, 12, 1)),
            available_until: Some(date(2025, 1, 1)),
            ..hku()
        };
        assert!(straddling.matches(&acc));
    }

    #[test]
    fn test_address_is_case_insensitive_substring_of_either_field() {
        let acc = listing();

        assert!(AccommodationFilter { address: Some("university drive".to_string()), ..hku() }.matches(&acc));
        assert!(AccommodationFilter { address: Some("BLOCK 3".to_string()), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { address: Some("Sha Tin".to_string()), ..hku() }.matches(&acc));
        assert!(!AccommodationFilter { address: Some("University%Lam".to_string()), ..hku() }.matches(&acc));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let acc = listing();

        let all_hold = AccommodationFilter {
            min_beds: Some(2),
            max_price: Some(400.0),
            address: Some("pok fu lam".to_string()),
            ..hku()
        };
        assert!(all_hold.matches(&acc));

        let one_fails = AccommodationFilter {
            max_price: Some(100.0),
            ..all_hold
        };
        assert!(!one_fails.matches(&acc));
    }
}
