use uuid::Uuid;

use crate::domain::owner::PropertyOwner;
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::OwnerRepository;
use crate::usecase::error::UsecaseError;
use crate::usecase::guard;
use crate::usecase::roles::Caller;

pub struct OwnersUseCase<O>
where
    O: OwnerRepository,
{
    owner_repository: O,
}

impl<O> OwnersUseCase<O>
where
    O: OwnerRepository,
{
    pub fn new(owner_repository: O) -> Self {
        Self { owner_repository }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<PropertyOwner>, UsecaseError> {
        Ok(self.owner_repository.list().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<PropertyOwner, UsecaseError> {
        self.owner_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Property owner".to_string()))
    }

    #[tracing::instrument(skip(self, caller))]
    pub async fn create(&self, caller: &Caller, name: String, phone: String) -> Result<PropertyOwner, UsecaseError> {
        guard::require_specialist_identity(caller)?;
        if name.trim().is_empty() {
            return Err(UsecaseError::Validation("owner name must not be empty".to_string()));
        }

        let owner = PropertyOwner::new(name, phone);
        self.owner_repository.create(&owner).await?;

        tracing::info!(owner_id = %owner.id, "property owner created");
        Ok(owner)
    }

    #[tracing::instrument(skip(self, caller))]
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        name: Option<String>,
        phone: Option<String>,
    ) -> Result<PropertyOwner, UsecaseError> {
        guard::require_specialist_identity(caller)?;
        if name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(UsecaseError::Validation("owner name must not be empty".to_string()));
        }

        let mut owner = self.get(id).await?;
        owner.update(name, phone);
        self.owner_repository.update(&owner).await?;

        tracing::info!(owner_id = %id, "property owner updated");
        Ok(owner)
    }

    #[tracing::instrument(skip(self, caller))]
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), UsecaseError> {
        guard::require_specialist_identity(caller)?;

        self.owner_repository.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => UsecaseError::NotFound("Property owner".to_string()),
            RepositoryError::Conflict(_) => {
                UsecaseError::Conflict("property owner still has accommodations".to_string())
            }
            other => other.into(),
        })?;

        tracing::info!(owner_id = %id, "property owner deleted");
        Ok(())
    }
}
