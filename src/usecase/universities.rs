use uuid::Uuid;

use crate::domain::location::{Coordinates, UniversityLocation};
use crate::domain::university::{normalize_code, University};
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::{LocationRepository, UniversityRepository};
use crate::usecase::error::UsecaseError;
use crate::usecase::guard;
use crate::usecase::roles::Caller;

pub struct UniversitiesUseCase<U, L>
where
    U: UniversityRepository,
    L: LocationRepository,
{
    university_repository: U,
    location_repository: L,
}

impl<U, L> UniversitiesUseCase<U, L>
where
    U: UniversityRepository,
    L: LocationRepository,
{
    pub fn new(university_repository: U, location_repository: L) -> Self {
        Self {
            university_repository,
            location_repository,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<University>, UsecaseError> {
        Ok(self.university_repository.list().await?)
    }

    #[tracing::instrument(skip(self, caller))]
    pub async fn list_locations(&self, caller: &Caller, code: &str) -> Result<Vec<UniversityLocation>, UsecaseError> {
        let code = normalize_code(code);
        guard::can_read_university(caller, &code)?;

        let locations = self.location_repository.list_by_university(&code).await?;
        tracing::debug!(count = locations.len(), "locations listed");
        Ok(locations)
    }

    #[tracing::instrument(skip(self, caller))]
    pub async fn create_location(
        &self,
        caller: &Caller,
        code: &str,
        name: String,
        latitude: f64,
        longitude: f64,
    ) -> Result<UniversityLocation, UsecaseError> {
        let code = normalize_code(code);
        guard::can_manage_university(caller, &code)?;

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(UsecaseError::Validation("location name must not be empty".to_string()));
        }
        if !Coordinates::new(latitude, longitude).is_valid() {
            return Err(UsecaseError::Validation("coordinates out of range".to_string()));
        }
        let duplicate = || UsecaseError::Conflict(format!("location '{name}' already exists at {code}"));

        if self.location_repository.find_by_name(&code, &name).await?.is_some() {
            return Err(duplicate());
        }

        let location = UniversityLocation::new(code.clone(), name.clone(), latitude, longitude);
        self.location_repository.create(&location).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => duplicate(),
            other => other.into(),
        })?;

        tracing::info!(location_id = %location.id, university = %code, "location created");
        Ok(location)
    }

    #[tracing::instrument(skip(self, caller))]
    pub async fn delete_location(&self, caller: &Caller, code: &str, id: Uuid) -> Result<(), UsecaseError> {
        let code = normalize_code(code);
        guard::can_manage_university(caller, &code)?;

        self.location_repository.delete(&code, id).await.map_err(|e| match e {
            RepositoryError::NotFound => UsecaseError::NotFound("Location".to_string()),
            other => other.into(),
        })?;

        tracing::info!(location_id = %id, university = %code, "location deleted");
        Ok(())
    }
}
