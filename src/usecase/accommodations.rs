use std::cmp::Ordering;

use uuid::Uuid;

use crate::domain::accommodation::{Accommodation, AccommodationDraft, AccommodationPatch, GeocodedAddress};
use crate::domain::location::Coordinates;
use crate::domain::owner::PropertyOwner;
use crate::domain::university::normalize_code;
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::{
    AccommodationFilter, AccommodationRepository, Geocoder, LocationRepository, OwnerRepository,
    UniversityRepository,
};
use crate::usecase::error::UsecaseError;
use crate::usecase::guard;
use crate::usecase::roles::Caller;

/// Either an existing owner or the details of one to register alongside the listing.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnerRef {
    Existing(Uuid),
    New { name: String, phone: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub accommodation: Accommodation,
    pub distance_km: Option<f64>,
}

pub struct AccommodationsUseCase<A, O, U, L, G>
where
    A: AccommodationRepository,
    O: OwnerRepository,
    U: UniversityRepository,
    L: LocationRepository,
    G: Geocoder,
{
    accommodation_repository: A,
    owner_repository: O,
    university_repository: U,
    location_repository: L,
    geocoder: G,
}

impl<A, O, U, L, G> AccommodationsUseCase<A, O, U, L, G>
where
    A: AccommodationRepository,
    O: OwnerRepository,
    U: UniversityRepository,
    L: LocationRepository,
    G: Geocoder,
{
    pub fn new(
        accommodation_repository: A,
        owner_repository: O,
        university_repository: U,
        location_repository: L,
        geocoder: G,
    ) -> Self {
        Self {
            accommodation_repository,
            owner_repository,
            university_repository,
            location_repository,
            geocoder,
        }
    }

    #[tracing::instrument(skip(self, caller, draft, owner), fields(university = %caller.university_code()))]
    pub async fn create(
        &self,
        caller: &Caller,
        mut draft: AccommodationDraft,
        owner: OwnerRef,
    ) -> Result<Accommodation, UsecaseError> {
        tracing::debug!("creating accommodation");

        let specialist = guard::require_specialist_identity(caller)?;

        draft.universities = draft.universities.iter().map(|c| normalize_code(c)).collect();
        if !draft.universities.iter().any(|c| c == caller.university_code()) {
            return Err(UsecaseError::Validation(format!(
                "universities must include '{}'",
                caller.university_code()
            )));
        }
        self.ensure_known_universities(&draft.universities).await?;

        // Validate before touching the owner table so a bad draft leaves nothing behind.
        let mut accommodation = Accommodation::new(draft, Uuid::nil(), specialist.id);
        accommodation.check_invariants().map_err(UsecaseError::Validation)?;

        accommodation.owner_id = match owner {
            OwnerRef::Existing(id) => {
                self.owner_repository
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| UsecaseError::NotFound("Property owner".to_string()))?
                    .id
            }
            OwnerRef::New { name, phone } => {
                if name.trim().is_empty() {
                    return Err(UsecaseError::Validation("owner name must not be empty".to_string()));
                }
                let owner = PropertyOwner::new(name, phone);
                self.owner_repository.create(&owner).await?;
                tracing::info!(owner_id = %owner.id, "property owner registered");
                owner.id
            }
        };

        let geocoded = self.geocoder.geocode(accommodation.geocode_query()).await;
        if geocoded.is_none() {
            tracing::warn!(query = %accommodation.geocode_query(), "storing accommodation without coordinates");
        }
        accommodation.apply_geocode(geocoded);

        self.accommodation_repository.create(&accommodation).await?;

        tracing::info!(
            accommodation_id = %accommodation.id,
            specialist_id = %specialist.id,
            geocoded = accommodation.coordinates().is_some(),
            "accommodation created"
        );
        Ok(accommodation)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn list(&self, caller: &Caller) -> Result<Vec<Accommodation>, UsecaseError> {
        tracing::debug!("listing accommodations");

        let filter = AccommodationFilter {
            university_code: caller.university_code().to_string(),
            ..Default::default()
        };
        let accommodations = self.accommodation_repository.search(&filter).await?;

        tracing::debug!(count = accommodations.len(), "accommodations listed");
        Ok(accommodations)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Accommodation, UsecaseError> {
        let accommodation = self.find(id).await?;
        guard::can_read_accommodation(caller, &accommodation)?;
        Ok(accommodation)
    }

    /// Filtered search inside the caller's university. With `distance_from` the
    /// hits carry a distance, are sorted nearest first and must have coordinates.
    #[tracing::instrument(skip(self, caller, filter), fields(university = %caller.university_code()))]
    pub async fn search(
        &self,
        caller: &Caller,
        mut filter: AccommodationFilter,
        distance_from: Option<&str>,
    ) -> Result<Vec<SearchHit>, UsecaseError> {
        tracing::debug!(?filter, "searching accommodations");

        if let (Some(from), Some(until)) = (filter.available_from, filter.available_until) {
            if from > until {
                return Err(UsecaseError::Validation(
                    "available_until must not be before available_from".to_string(),
                ));
            }
        }
        filter.university_code = caller.university_code().to_string();

        let anchor = match distance_from {
            Some(name) => {
                let location = self
                    .location_repository
                    .find_by_name(caller.university_code(), name)
                    .await?
                    .ok_or_else(|| UsecaseError::UnknownLocation(name.to_string()))?;
                Some(location.coordinates())
            }
            None => None,
        };

        let mut candidates = self.accommodation_repository.search(&filter).await?;
        candidates.retain(|a| filter.matches(a));

        let hits = match anchor {
            None => candidates
                .into_iter()
                .map(|accommodation| SearchHit {
                    accommodation,
                    distance_km: None,
                })
                .collect(),
            Some(anchor) => {
                let mut hits: Vec<SearchHit> = candidates
                    .into_iter()
                    .filter_map(|accommodation| {
                        let distance = accommodation.coordinates()?.distance_km(&anchor);
                        Some(SearchHit {
                            accommodation,
                            distance_km: Some(distance),
                        })
                    })
                    .collect();
                hits.sort_by(|a, b| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(Ordering::Equal)
                });
                hits
            }
        };

        tracing::debug!(count = hits.len(), "search finished");
        Ok(hits)
    }

    #[tracing::instrument(skip(self, caller, patch), fields(university = %caller.university_code()))]
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        mut patch: AccommodationPatch,
    ) -> Result<Accommodation, UsecaseError> {
        tracing::debug!("updating accommodation");

        let mut accommodation = self.find(id).await?;
        guard::can_manage_accommodation(caller, &accommodation)?;

        if let Some(codes) = patch.universities.as_mut() {
            *codes = codes.iter().map(|c| normalize_code(c)).collect();
            guard::can_change_universities(caller, &accommodation.universities, codes)?;
            self.ensure_known_universities(codes).await?;
        }
        if let Some(owner_id) = patch.owner_id {
            self.owner_repository
                .find_by_id(owner_id)
                .await?
                .ok_or_else(|| UsecaseError::NotFound("Property owner".to_string()))?;
        }

        let query_changed = accommodation.update(patch);
        accommodation.check_invariants().map_err(UsecaseError::Validation)?;

        if query_changed {
            let geocoded = self.geocoder.geocode(accommodation.geocode_query()).await;
            if geocoded.is_none() {
                tracing::warn!(%id, "re-geocoding failed, clearing coordinates");
            }
            accommodation.apply_geocode(geocoded);
        }

        self.accommodation_repository.update(&accommodation).await?;

        tracing::info!(%id, regeocoded = query_changed, "accommodation updated");
        Ok(accommodation)
    }

    /// Re-runs the geocoder; returns the record and whether coordinates were found.
    /// A failed lookup leaves the stored coordinates untouched.
    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn regeocode(&self, caller: &Caller, id: Uuid) -> Result<(Accommodation, bool), UsecaseError> {
        let mut accommodation = self.find(id).await?;
        guard::can_manage_accommodation(caller, &accommodation)?;

        let Some(geocoded) = self.geocoder.geocode(accommodation.geocode_query()).await else {
            tracing::warn!(%id, "re-geocoding failed, keeping stored coordinates");
            return Ok((accommodation, false));
        };

        accommodation.apply_geocode(Some(geocoded));
        self.accommodation_repository.update(&accommodation).await?;

        tracing::info!(%id, "accommodation re-geocoded");
        Ok((accommodation, true))
    }

    /// Stores operator-supplied coordinates for addresses the geocoder cannot resolve.
    #[tracing::instrument(skip(self, caller, geocoded), fields(university = %caller.university_code()))]
    pub async fn set_coordinates(
        &self,
        caller: &Caller,
        id: Uuid,
        geocoded: GeocodedAddress,
    ) -> Result<Accommodation, UsecaseError> {
        let mut accommodation = self.find(id).await?;
        guard::can_manage_accommodation(caller, &accommodation)?;

        if !Coordinates::new(geocoded.latitude, geocoded.longitude).is_valid() {
            return Err(UsecaseError::Validation("coordinates out of range".to_string()));
        }

        accommodation.apply_geocode(Some(geocoded));
        self.accommodation_repository.update(&accommodation).await?;

        tracing::info!(%id, "accommodation coordinates set manually");
        Ok(accommodation)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), UsecaseError> {
        let accommodation = self.find(id).await?;
        guard::can_manage_accommodation(caller, &accommodation)?;

        self.accommodation_repository.delete(id).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => UsecaseError::Conflict("accommodation still has reservations".to_string()),
            other => other.into(),
        })?;

        tracing::info!(%id, "accommodation deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Accommodation, UsecaseError> {
        self.accommodation_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Accommodation".to_string()))
    }

    async fn ensure_known_universities(&self, codes: &[String]) -> Result<(), UsecaseError> {
        for code in codes {
            if self.university_repository.find_by_code(code).await?.is_none() {
                return Err(UsecaseError::Validation(format!("unknown university '{code}'")));
            }
        }
        Ok(())
    }
}
