use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::domain::role::RoleKind;
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::NotificationRepository;
use crate::usecase::error::UsecaseError;
use crate::usecase::roles::Caller;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

pub struct NotificationsUseCase<N>
where
    N: NotificationRepository,
{
    notification_repository: N,
}

impl<N> NotificationsUseCase<N>
where
    N: NotificationRepository,
{
    pub fn new(notification_repository: N) -> Self {
        Self { notification_repository }
    }

    /// Returns a page of the caller's notifications, newest first, and the unread count.
    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn list(
        &self,
        caller: &Caller,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Notification>, i64), UsecaseError> {
        tracing::debug!("listing notifications");

        let (kind, recipient_id) = recipient(caller)?;
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);

        let notifications = self
            .notification_repository
            .find_by_recipient(kind, &recipient_id, limit, offset)
            .await?;
        let unread = self.notification_repository.count_unread(kind, &recipient_id).await?;

        tracing::debug!(count = notifications.len(), unread, "notifications listed");
        Ok((notifications, unread))
    }

    #[tracing::instrument(skip(self, caller), fields(notification_id = %id))]
    pub async fn mark_as_read(&self, caller: &Caller, id: Uuid) -> Result<(), UsecaseError> {
        let (kind, recipient_id) = recipient(caller)?;

        self.notification_repository
            .mark_as_read(id, kind, &recipient_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UsecaseError::NotFound("Notification".to_string()),
                other => other.into(),
            })?;

        tracing::debug!(notification_id = %id, "notification marked as read");
        Ok(())
    }
}

fn recipient(caller: &Caller) -> Result<(RoleKind, String), UsecaseError> {
    caller
        .recipient_id()
        .map(|id| (caller.kind(), id))
        .ok_or_else(|| UsecaseError::Forbidden("notifications require a role with an identity".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::usecase::contracts::MockNotificationRepository;
    use crate::usecase::roles::tests::{anonymous_specialist_caller, member_caller};

    #[tokio::test]
    async fn test_list_clamps_paging() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_recipient()
            .withf(|kind, id, limit, offset| {
                *kind == RoleKind::Member && id == "u1" && *limit == MAX_PAGE_SIZE && *offset == 0
            })
            .times(1)
            .returning(|kind, id, _, _| {
                Ok(vec![Notification::new(
                    kind,
                    id.to_string(),
                    Uuid::new_v4(),
                    "Reservation confirmed".to_string(),
                    "See you soon".to_string(),
                )])
            });
        repo.expect_count_unread().returning(|_, _| Ok(1));

        let usecase = NotificationsUseCase::new(repo);
        let (items, unread) = usecase
            .list(&member_caller("u1", "HKU"), Some(500), Some(-3))
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(unread, 1);
    }

    #[tokio::test]
    async fn test_list_defaults() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_recipient()
            .withf(|_, _, limit, offset| *limit == DEFAULT_PAGE_SIZE && *offset == 0)
            .returning(|_, _, _, _| Ok(vec![]));
        repo.expect_count_unread().returning(|_, _| Ok(0));

        let (items, unread) = NotificationsUseCase::new(repo)
            .list(&member_caller("u1", "HKU"), None, None)
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(unread, 0);
    }

    #[tokio::test]
    async fn test_anonymous_specialist_has_no_inbox() {
        let err = NotificationsUseCase::new(MockNotificationRepository::new())
            .list(&anonymous_specialist_caller("HKU"), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, UsecaseError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_mark_other_users_notification_is_not_found() {
        let id = Uuid::new_v4();
        let mut repo = MockNotificationRepository::new();
        repo.expect_mark_as_read()
            .withf(move |n, kind, recipient| *n == id && *kind == RoleKind::Member && recipient == "u1")
            .returning(|_, _, _| Err(RepositoryError::NotFound));

        let err = NotificationsUseCase::new(repo)
            .mark_as_read(&member_caller("u1", "HKU"), id)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Notification not found");
    }
}
