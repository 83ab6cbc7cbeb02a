use crate::domain::member::Member;
use crate::domain::role::{RoleIdentity, RoleKind, RoleToken};
use crate::domain::specialist::Specialist;
use crate::domain::university::University;
use crate::usecase::contracts::{MemberRepository, SpecialistRepository, UniversityRepository};
use crate::usecase::error::UsecaseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Member(Member),
    /// Member token whose uid is not stored yet. Registered only once the
    /// request that allowed it has passed every check.
    NewMember(Member),
    /// `None` when the token named only the university.
    Specialist(Option<Specialist>),
}

/// Role resolved for the current request.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub university: University,
    pub actor: Actor,
}

impl Caller {
    pub fn kind(&self) -> RoleKind {
        match self.actor {
            Actor::Member(_) | Actor::NewMember(_) => RoleKind::Member,
            Actor::Specialist(_) => RoleKind::Specialist,
        }
    }

    pub fn university_code(&self) -> &str {
        &self.university.code
    }

    pub fn member(&self) -> Option<&Member> {
        match &self.actor {
            Actor::Member(m) | Actor::NewMember(m) => Some(m),
            Actor::Specialist(_) => None,
        }
    }

    pub fn specialist(&self) -> Option<&Specialist> {
        match &self.actor {
            Actor::Specialist(s) => s.as_ref(),
            Actor::Member(_) | Actor::NewMember(_) => None,
        }
    }

    pub fn is_specialist(&self) -> bool {
        self.kind() == RoleKind::Specialist
    }

    /// Key under which notifications for this caller are stored.
    pub fn recipient_id(&self) -> Option<String> {
        match &self.actor {
            Actor::Member(m) | Actor::NewMember(m) => Some(m.uid.clone()),
            Actor::Specialist(s) => s.as_ref().map(|s| s.id.to_string()),
        }
    }
}

pub struct RolesUseCase<U, M, S>
where
    U: UniversityRepository,
    M: MemberRepository,
    S: SpecialistRepository,
{
    university_repository: U,
    member_repository: M,
    specialist_repository: S,
}

impl<U, M, S> RolesUseCase<U, M, S>
where
    U: UniversityRepository,
    M: MemberRepository,
    S: SpecialistRepository,
{
    pub fn new(university_repository: U, member_repository: M, specialist_repository: S) -> Self {
        Self {
            university_repository,
            member_repository,
            specialist_repository,
        }
    }

    #[tracing::instrument(skip(self), fields(role = %token))]
    pub async fn resolve(&self, token: &RoleToken) -> Result<Caller, UsecaseError> {
        self.resolve_inner(token, None).await
    }

    /// Like `resolve`, but a member token with an unknown uid yields
    /// `Actor::NewMember` instead of failing. Nothing is written here.
    #[tracing::instrument(skip(self), fields(role = %token))]
    pub async fn resolve_for_booking(
        &self,
        token: &RoleToken,
        member_name: Option<String>,
    ) -> Result<Caller, UsecaseError> {
        self.resolve_inner(token, Some(member_name)).await
    }

    async fn resolve_inner(
        &self,
        token: &RoleToken,
        new_member_name: Option<Option<String>>,
    ) -> Result<Caller, UsecaseError> {
        tracing::debug!("resolving role");

        let university = self
            .university_repository
            .find_by_code(&token.university_code)
            .await?
            .ok_or_else(|| UsecaseError::UnknownUniversity(token.university_code.clone()))?;

        let actor = match &token.identity {
            RoleIdentity::Member { uid } => {
                match self.member_repository.find_by_uid(uid).await? {
                    Some(m) if m.university_code == university.code => Actor::Member(m),
                    None if new_member_name.is_some() => {
                        let name = new_member_name.flatten().unwrap_or_else(|| uid.clone());
                        tracing::debug!(%uid, "member not registered yet");
                        Actor::NewMember(Member::new(uid.clone(), name, university.code.clone()))
                    }
                    _ => {
                        tracing::warn!(%uid, university = %university.code, "unknown member");
                        return Err(UsecaseError::UnknownIdentity(format!(
                            "no member '{}' at {}",
                            uid, university.code
                        )));
                    }
                }
            }
            RoleIdentity::Specialist { id: None } => Actor::Specialist(None),
            RoleIdentity::Specialist { id: Some(id) } => {
                match self.specialist_repository.find_by_id(*id).await? {
                    Some(s) if s.university_code == university.code => Actor::Specialist(Some(s)),
                    _ => {
                        tracing::warn!(specialist_id = %id, university = %university.code, "unknown specialist");
                        return Err(UsecaseError::UnknownIdentity(format!(
                            "no specialist '{}' at {}",
                            id, university.code
                        )));
                    }
                }
            }
        };

        let caller = Caller { university, actor };
        tracing::debug!(kind = %caller.kind(), university = %caller.university_code(), "role resolved");
        Ok(caller)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::usecase::contracts::{MockMemberRepository, MockSpecialistRepository, MockUniversityRepository};

    pub(crate) fn university(code: &str) -> University {
        University {
            code: code.to_string(),
            name: format!("University {code}"),
        }
    }

    pub(crate) fn member_caller(uid: &str, code: &str) -> Caller {
        Caller {
            university: university(code),
            actor: Actor::Member(Member::new(uid.to_string(), format!("Member {uid}"), code.to_string())),
        }
    }

    pub(crate) fn specialist_caller(code: &str) -> Caller {
        Caller {
            university: university(code),
            actor: Actor::Specialist(Some(Specialist::new(format!("{code} Specialist"), code.to_string()))),
        }
    }

    pub(crate) fn anonymous_specialist_caller(code: &str) -> Caller {
        Caller {
            university: university(code),
            actor: Actor::Specialist(None),
        }
    }

    fn universities_with(code: &'static str) -> MockUniversityRepository {
        let mut repo = MockUniversityRepository::new();
        repo.expect_find_by_code()
            .returning(move |c| Ok((c == code).then(|| university(code))));
        repo
    }

    #[tokio::test]
    async fn test_resolve_member() {
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_uid()
            .withf(|uid| uid == "u1")
            .times(1)
            .returning(|uid| Ok(Some(Member::new(uid.to_string(), "Alice".to_string(), "HKU".to_string()))));

        let usecase = RolesUseCase::new(universities_with("HKU"), members, MockSpecialistRepository::new());
        let token: RoleToken = "hku:member:u1".parse().unwrap();
        let caller = usecase.resolve(&token).await.unwrap();

        assert_eq!(caller.kind(), RoleKind::Member);
        assert_eq!(caller.university_code(), "HKU");
        assert_eq!(caller.member().map(|m| m.uid.as_str()), Some("u1"));
        assert_eq!(caller.recipient_id(), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn test_resolve_unknown_university() {
        let usecase = RolesUseCase::new(
            universities_with("HKU"),
            MockMemberRepository::new(),
            MockSpecialistRepository::new(),
        );
        let token: RoleToken = "mit:member:u1".parse().unwrap();
        let err = usecase.resolve(&token).await.unwrap_err();

        assert!(matches!(err, UsecaseError::UnknownUniversity(code) if code == "MIT"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_member() {
        let mut members = MockMemberRepository::new();
        members.expect_find_by_uid().times(1).returning(|_| Ok(None));

        let usecase = RolesUseCase::new(universities_with("HKU"), members, MockSpecialistRepository::new());
        let token: RoleToken = "hku:member:ghost".parse().unwrap();
        let err = usecase.resolve(&token).await.unwrap_err();

        assert!(matches!(err, UsecaseError::UnknownIdentity(_)));
    }

    #[tokio::test]
    async fn test_resolve_member_from_other_university() {
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_uid()
            .returning(|uid| Ok(Some(Member::new(uid.to_string(), "Bob".to_string(), "CU".to_string()))));

        let usecase = RolesUseCase::new(universities_with("HKU"), members, MockSpecialistRepository::new());
        let token: RoleToken = "hku:member:u2".parse().unwrap();

        assert!(matches!(
            usecase.resolve(&token).await,
            Err(UsecaseError::UnknownIdentity(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_for_booking_defers_registration() {
        let mut members = MockMemberRepository::new();
        members.expect_find_by_uid().times(1).returning(|_| Ok(None));
        members.expect_find_or_create().never();

        let usecase = RolesUseCase::new(universities_with("HKU"), members, MockSpecialistRepository::new());
        let token: RoleToken = "hku:member:new1".parse().unwrap();
        let caller = usecase
            .resolve_for_booking(&token, Some("New Student".to_string()))
            .await
            .unwrap();

        match &caller.actor {
            Actor::NewMember(m) => {
                assert_eq!(m.uid, "new1");
                assert_eq!(m.name, "New Student");
                assert_eq!(m.university_code, "HKU");
            }
            other => panic!("expected a new member, got {other:?}"),
        }
        assert_eq!(caller.kind(), RoleKind::Member);
        assert_eq!(caller.recipient_id(), Some("new1".to_string()));
    }

    #[tokio::test]
    async fn test_resolve_for_booking_defaults_name_to_uid() {
        let mut members = MockMemberRepository::new();
        members.expect_find_by_uid().returning(|_| Ok(None));

        let usecase = RolesUseCase::new(universities_with("HKU"), members, MockSpecialistRepository::new());
        let token: RoleToken = "hku:member:new2".parse().unwrap();
        let caller = usecase.resolve_for_booking(&token, None).await.unwrap();

        assert_eq!(caller.member().map(|m| m.name.as_str()), Some("new2"));
    }

    #[tokio::test]
    async fn test_resolve_for_booking_keeps_registered_member() {
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_uid()
            .returning(|uid| Ok(Some(Member::new(uid.to_string(), "Alice".to_string(), "HKU".to_string()))));

        let usecase = RolesUseCase::new(universities_with("HKU"), members, MockSpecialistRepository::new());
        let token: RoleToken = "hku:member:u1".parse().unwrap();
        let caller = usecase
            .resolve_for_booking(&token, Some("Ignored".to_string()))
            .await
            .unwrap();

        assert!(matches!(&caller.actor, Actor::Member(m) if m.name == "Alice"));
    }

    #[tokio::test]
    async fn test_resolve_for_booking_uid_taken_at_other_university() {
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_uid()
            .returning(|uid| Ok(Some(Member::new(uid.to_string(), "Bob".to_string(), "CU".to_string()))));

        let usecase = RolesUseCase::new(universities_with("HKU"), members, MockSpecialistRepository::new());
        let token: RoleToken = "hku:member:u2".parse().unwrap();

        assert!(matches!(
            usecase.resolve_for_booking(&token, None).await,
            Err(UsecaseError::UnknownIdentity(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_specialist() {
        let specialist = Specialist::new("HKU Spec".to_string(), "HKU".to_string());
        let id = specialist.id;
        let mut specialists = MockSpecialistRepository::new();
        specialists
            .expect_find_by_id()
            .with(mockall::predicate::eq(id))
            .times(1)
            .returning(move |_| Ok(Some(specialist.clone())));

        let usecase = RolesUseCase::new(universities_with("HKU"), MockMemberRepository::new(), specialists);
        let token: RoleToken = format!("hku:specialist:{id}").parse().unwrap();
        let caller = usecase.resolve(&token).await.unwrap();

        assert!(caller.is_specialist());
        assert_eq!(caller.specialist().map(|s| s.id), Some(id));
    }

    #[tokio::test]
    async fn test_resolve_specialist_of_other_university() {
        let specialist = Specialist::new("CU Spec".to_string(), "CU".to_string());
        let id = specialist.id;
        let mut specialists = MockSpecialistRepository::new();
        specialists
            .expect_find_by_id()
            .returning(move |_| Ok(Some(specialist.clone())));

        let usecase = RolesUseCase::new(universities_with("HKU"), MockMemberRepository::new(), specialists);
        let token: RoleToken = format!("hku:specialist:{id}").parse().unwrap();

        assert!(matches!(
            usecase.resolve(&token).await,
            Err(UsecaseError::UnknownIdentity(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_specialist_without_identity() {
        let mut specialists = MockSpecialistRepository::new();
        specialists.expect_find_by_id().never();

        let usecase = RolesUseCase::new(universities_with("HKU"), MockMemberRepository::new(), specialists);
        let token: RoleToken = "hku:specialist".parse().unwrap();
        let caller = usecase.resolve(&token).await.unwrap();

        assert!(caller.is_specialist());
        assert!(caller.specialist().is_none());
        assert!(caller.recipient_id().is_none());
    }
}
