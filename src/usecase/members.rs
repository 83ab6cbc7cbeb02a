use uuid::Uuid;

use crate::domain::member::Member;
use crate::domain::specialist::Specialist;
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::{MemberRepository, SpecialistRepository};
use crate::usecase::error::UsecaseError;
use crate::usecase::guard;
use crate::usecase::roles::Caller;

/// Member and specialist directory of a university.
pub struct MembersUseCase<M, S>
where
    M: MemberRepository,
    S: SpecialistRepository,
{
    member_repository: M,
    specialist_repository: S,
}

impl<M, S> MembersUseCase<M, S>
where
    M: MemberRepository,
    S: SpecialistRepository,
{
    pub fn new(member_repository: M, specialist_repository: S) -> Self {
        Self {
            member_repository,
            specialist_repository,
        }
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn list(&self, caller: &Caller) -> Result<Vec<Member>, UsecaseError> {
        guard::require_specialist(caller)?;
        Ok(self.member_repository.list_by_university(caller.university_code()).await?)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn create(&self, caller: &Caller, uid: String, name: String) -> Result<Member, UsecaseError> {
        guard::require_specialist_identity(caller)?;

        let uid = uid.trim().to_string();
        if uid.is_empty() || uid.contains(':') {
            return Err(UsecaseError::Validation("uid must be non-empty and must not contain ':'".to_string()));
        }
        if name.trim().is_empty() {
            return Err(UsecaseError::Validation("name must not be empty".to_string()));
        }

        let member = Member::new(uid, name, caller.university_code().to_string());
        self.member_repository.create(&member).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => UsecaseError::Conflict(format!("member '{}' already exists", member.uid)),
            other => other.into(),
        })?;

        tracing::info!(uid = %member.uid, "member registered");
        Ok(member)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn get(&self, caller: &Caller, uid: &str) -> Result<Member, UsecaseError> {
        let member = self.find(uid).await?;
        guard::self_or_specialist(caller, &member.uid, &member.university_code)?;
        Ok(member)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn update(&self, caller: &Caller, uid: &str, name: String) -> Result<Member, UsecaseError> {
        let mut member = self.find(uid).await?;
        guard::self_or_specialist(caller, &member.uid, &member.university_code)?;
        if caller.is_specialist() {
            guard::require_specialist_identity(caller)?;
        }
        if name.trim().is_empty() {
            return Err(UsecaseError::Validation("name must not be empty".to_string()));
        }

        member.name = name;
        self.member_repository.update(&member).await?;

        tracing::info!(%uid, "member updated");
        Ok(member)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn delete(&self, caller: &Caller, uid: &str) -> Result<(), UsecaseError> {
        let member = self.find(uid).await?;
        guard::can_manage_university(caller, &member.university_code)?;

        self.member_repository.delete(uid).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                UsecaseError::Conflict(format!("member '{uid}' still has reservations"))
            }
            other => other.into(),
        })?;

        tracing::info!(%uid, "member deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn list_specialists(&self, caller: &Caller) -> Result<Vec<Specialist>, UsecaseError> {
        Ok(self
            .specialist_repository
            .list_by_university(caller.university_code())
            .await?)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn get_specialist(&self, caller: &Caller, id: Uuid) -> Result<Specialist, UsecaseError> {
        let specialist = self
            .specialist_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Specialist".to_string()))?;
        guard::can_read_university(caller, &specialist.university_code)?;
        Ok(specialist)
    }

    async fn find(&self, uid: &str) -> Result<Member, UsecaseError> {
        self.member_repository
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Member".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::usecase::contracts::{MockMemberRepository, MockSpecialistRepository};
    use crate::usecase::roles::tests::{anonymous_specialist_caller, member_caller, specialist_caller};

    fn stored_member(uid: &'static str, code: &'static str) -> MockMemberRepository {
        let mut repo = MockMemberRepository::new();
        repo.expect_find_by_uid()
            .returning(move |u| Ok((u == uid).then(|| Member::new(uid.to_string(), "Dana".to_string(), code.to_string()))));
        repo
    }

    #[tokio::test]
    async fn test_list_requires_specialist() {
        let mut repo = MockMemberRepository::new();
        repo.expect_list_by_university()
            .withf(|code| code == "HKU")
            .times(1)
            .returning(|_| Ok(vec![]));
        let usecase = MembersUseCase::new(repo, MockSpecialistRepository::new());

        assert!(usecase.list(&anonymous_specialist_caller("HKU")).await.is_ok());
        assert!(matches!(
            usecase.list(&member_caller("u1", "HKU")).await,
            Err(UsecaseError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_uid_is_conflict() {
        let mut repo = MockMemberRepository::new();
        repo.expect_create()
            .returning(|_| Err(RepositoryError::Conflict("members_pkey".to_string())));

        let err = MembersUseCase::new(repo, MockSpecialistRepository::new())
            .create(&specialist_caller("HKU"), "u1".to_string(), "Dana".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, UsecaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_uid() {
        let usecase = MembersUseCase::new(MockMemberRepository::new(), MockSpecialistRepository::new());

        for uid in ["", "a:b"] {
            assert!(matches!(
                usecase.create(&specialist_caller("HKU"), uid.to_string(), "Dana".to_string()).await,
                Err(UsecaseError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_get_self_or_specialist() {
        let usecase = MembersUseCase::new(stored_member("u1", "HKU"), MockSpecialistRepository::new());

        assert!(usecase.get(&member_caller("u1", "HKU"), "u1").await.is_ok());
        assert!(usecase.get(&specialist_caller("HKU"), "u1").await.is_ok());
        assert!(usecase.get(&member_caller("u2", "HKU"), "u1").await.is_err());
        assert!(usecase.get(&specialist_caller("CU"), "u1").await.is_err());
        assert!(matches!(
            usecase.get(&specialist_caller("HKU"), "ghost").await,
            Err(UsecaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_member_renames_self() {
        let mut repo = stored_member("u1", "HKU");
        repo.expect_update()
            .withf(|m| m.name == "Dana Chan")
            .times(1)
            .returning(|_| Ok(()));

        let member = MembersUseCase::new(repo, MockSpecialistRepository::new())
            .update(&member_caller("u1", "HKU"), "u1", "Dana Chan".to_string())
            .await
            .unwrap();

        assert_eq!(member.name, "Dana Chan");
    }

    #[tokio::test]
    async fn test_delete_by_other_university_is_forbidden() {
        let mut repo = stored_member("u1", "HKU");
        repo.expect_delete().never();

        let err = MembersUseCase::new(repo, MockSpecialistRepository::new())
            .delete(&specialist_caller("CU"), "u1")
            .await
            .unwrap_err();

        assert!(matches!(err, UsecaseError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_member_with_reservations_is_conflict() {
        let mut repo = stored_member("u1", "HKU");
        repo.expect_delete()
            .times(1)
            .returning(|_| Err(RepositoryError::Conflict("violates foreign key constraint".to_string())));

        let err = MembersUseCase::new(repo, MockSpecialistRepository::new())
            .delete(&specialist_caller("HKU"), "u1")
            .await
            .unwrap_err();

        assert!(matches!(err, UsecaseError::Conflict(msg) if msg.contains("still has reservations")));
    }

    #[tokio::test]
    async fn test_get_specialist_of_other_university() {
        let specialist = Specialist::new("CU Housing".to_string(), "CU".to_string());
        let id = specialist.id;
        let mut specialists = MockSpecialistRepository::new();
        specialists
            .expect_find_by_id()
            .returning(move |_| Ok(Some(specialist.clone())));

        let usecase = MembersUseCase::new(MockMemberRepository::new(), specialists);

        assert!(usecase.get_specialist(&member_caller("u9", "CU"), id).await.is_ok());
        assert!(matches!(
            usecase.get_specialist(&member_caller("u1", "HKU"), id).await,
            Err(UsecaseError::Forbidden(_))
        ));
    }
}
