use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::domain::reservation::{next_status, Reservation, ReservationAction};
use crate::domain::role::RoleKind;
use crate::usecase::contracts::{
    AccommodationRepository, MemberRepository, NotificationRepository, ReservationRepository,
};
use crate::usecase::error::UsecaseError;
use crate::usecase::guard;
use crate::usecase::roles::{Actor, Caller};

pub struct ReservationsUseCase<R, A, M, N>
where
    R: ReservationRepository,
    A: AccommodationRepository,
    M: MemberRepository,
    N: NotificationRepository,
{
    reservation_repository: R,
    accommodation_repository: A,
    member_repository: M,
    notification_repository: N,
}

impl<R, A, M, N> ReservationsUseCase<R, A, M, N>
where
    R: ReservationRepository,
    A: AccommodationRepository,
    M: MemberRepository,
    N: NotificationRepository,
{
    pub fn new(
        reservation_repository: R,
        accommodation_repository: A,
        member_repository: M,
        notification_repository: N,
    ) -> Self {
        Self {
            reservation_repository,
            accommodation_repository,
            member_repository,
            notification_repository,
        }
    }

    /// Members book for themselves; specialists book on behalf of a member of their university.
    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn create(
        &self,
        caller: &Caller,
        accommodation_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        member_uid: Option<String>,
    ) -> Result<Reservation, UsecaseError> {
        tracing::debug!("creating reservation");

        let (member_uid, university_code) = match caller.member() {
            Some(member) => {
                if member_uid.as_deref().is_some_and(|uid| uid != member.uid) {
                    return Err(UsecaseError::Forbidden(
                        "members can only reserve for themselves".to_string(),
                    ));
                }
                (member.uid.clone(), member.university_code.clone())
            }
            None => {
                guard::require_specialist_identity(caller)?;
                let uid = member_uid.ok_or_else(|| {
                    UsecaseError::Validation("member_uid is required when a specialist reserves".to_string())
                })?;
                let member = self
                    .member_repository
                    .find_by_uid(&uid)
                    .await?
                    .ok_or_else(|| UsecaseError::NotFound("Member".to_string()))?;
                guard::can_read_university(caller, &member.university_code)?;
                (member.uid, member.university_code)
            }
        };

        if start_date > end_date {
            return Err(UsecaseError::Validation("end_date must not be before start_date".to_string()));
        }

        let accommodation = self
            .accommodation_repository
            .find_by_id(accommodation_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Accommodation".to_string()))?;
        if !accommodation.is_offered_to(&university_code) {
            return Err(UsecaseError::Forbidden(format!(
                "accommodation is not offered to '{university_code}'"
            )));
        }

        if let Actor::NewMember(candidate) = &caller.actor {
            let stored = self.member_repository.find_or_create(candidate).await?;
            if stored.university_code != university_code {
                tracing::warn!(uid = %stored.uid, "uid registered at another university");
                return Err(UsecaseError::UnknownIdentity(format!(
                    "no member '{}' at {}",
                    stored.uid, university_code
                )));
            }
            tracing::info!(uid = %stored.uid, "member registered on first reservation");
        }

        let reservation = Reservation::new(accommodation_id, member_uid, university_code, start_date, end_date);
        self.reservation_repository.create(&reservation).await?;

        metrics::counter!("reservations_created_total").increment(1);
        tracing::info!(
            reservation_id = %reservation.id,
            %accommodation_id,
            member_uid = %reservation.member_uid,
            "reservation created"
        );

        if let Some(specialist_id) = accommodation.specialist_id {
            self.notify(Notification::new(
                RoleKind::Specialist,
                specialist_id.to_string(),
                reservation.id,
                format!("New reservation #{}", reservation.id),
                format!(
                    "Member {} reserved {} from {} to {}.",
                    reservation.member_uid, accommodation.address, start_date, end_date
                ),
            ))
            .await;
        }

        Ok(reservation)
    }

    /// Runs one step of the reservation state machine.
    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn apply(
        &self,
        caller: &Caller,
        id: Uuid,
        action: ReservationAction,
    ) -> Result<Reservation, UsecaseError> {
        tracing::debug!("applying reservation action");

        let current = self.find(id).await?;
        guard::self_or_specialist(caller, &current.member_uid, &current.university_code)?;
        let actor = caller.kind();
        if actor == RoleKind::Specialist {
            guard::require_specialist_identity(caller)?;
        }

        if !action.permits(actor) {
            return Err(UsecaseError::Forbidden(format!("a {actor} cannot {action} a reservation")));
        }
        let next = next_status(current.status, action, actor).ok_or_else(|| {
            UsecaseError::InvalidTransition(format!(
                "cannot {action} a {} reservation as {actor}",
                current.status
            ))
        })?;

        let cancelled_by = (action == ReservationAction::Cancel).then_some(actor);
        let updated = self
            .reservation_repository
            .transition(id, current.status, next, cancelled_by)
            .await?
            .ok_or_else(|| {
                tracing::warn!(%id, expected = %current.status, "reservation changed concurrently");
                UsecaseError::Conflict("reservation was modified concurrently".to_string())
            })?;

        metrics::counter!(
            "reservation_transitions_total",
            "action" => action.to_string(),
            "to" => next.as_str()
        )
        .increment(1);
        tracing::info!(%id, from = %current.status, to = %next, "reservation status changed");

        self.notify_transition(&updated, action, actor).await;
        Ok(updated)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn list(&self, caller: &Caller) -> Result<Vec<Reservation>, UsecaseError> {
        let reservations = match caller.member() {
            Some(member) => self.reservation_repository.list_by_member(&member.uid).await?,
            None => {
                self.reservation_repository
                    .list_by_university(caller.university_code())
                    .await?
            }
        };

        tracing::debug!(count = reservations.len(), "reservations listed");
        Ok(reservations)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Reservation, UsecaseError> {
        let reservation = self.find(id).await?;
        guard::self_or_specialist(caller, &reservation.member_uid, &reservation.university_code)?;
        Ok(reservation)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn list_for_member(&self, caller: &Caller, member_uid: &str) -> Result<Vec<Reservation>, UsecaseError> {
        let member = self
            .member_repository
            .find_by_uid(member_uid)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Member".to_string()))?;
        guard::self_or_specialist(caller, &member.uid, &member.university_code)?;

        Ok(self.reservation_repository.list_by_member(&member.uid).await?)
    }

    async fn find(&self, id: Uuid) -> Result<Reservation, UsecaseError> {
        self.reservation_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Reservation".to_string()))
    }

    async fn notify_transition(&self, reservation: &Reservation, action: ReservationAction, actor: RoleKind) {
        let notify_member = match action {
            ReservationAction::Confirm | ReservationAction::Complete => true,
            ReservationAction::Cancel => actor == RoleKind::Specialist,
        };
        let subject = format!("Reservation #{} {}", reservation.id, reservation.status);
        let message = format!(
            "Reservation #{} ({} to {}) is now {}.",
            reservation.id, reservation.start_date, reservation.end_date, reservation.status
        );

        if notify_member {
            self.notify(Notification::new(
                RoleKind::Member,
                reservation.member_uid.clone(),
                reservation.id,
                subject.clone(),
                message.clone(),
            ))
            .await;
        }

        if action == ReservationAction::Cancel {
            match self.accommodation_repository.find_by_id(reservation.accommodation_id).await {
                Ok(Some(accommodation)) => {
                    if let Some(specialist_id) = accommodation.specialist_id {
                        self.notify(Notification::new(
                            RoleKind::Specialist,
                            specialist_id.to_string(),
                            reservation.id,
                            subject,
                            message,
                        ))
                        .await;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = %e, reservation_id = %reservation.id, "failed to look up managing specialist");
                }
            }
        }
    }

    /// Persists a notification; failures are logged and swallowed.
    async fn notify(&self, notification: Notification) {
        match self.notification_repository.create(&notification).await {
            Ok(()) => {
                tracing::info!(
                    recipient_kind = %notification.recipient_kind,
                    recipient_id = %notification.recipient_id,
                    subject = %notification.subject,
                    "notification recorded"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    reservation_id = %notification.reservation_id,
                    "failed to record notification"
                );
            }
        }
    }
}
