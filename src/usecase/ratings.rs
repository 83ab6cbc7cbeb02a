use uuid::Uuid;

use crate::domain::rating::{score_in_range, Rating, RatingView, MAX_SCORE, MIN_SCORE};
use crate::domain::reservation::ReservationStatus;
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::{RatingRepository, ReservationRepository};
use crate::usecase::error::UsecaseError;
use crate::usecase::guard;
use crate::usecase::roles::Caller;

pub struct RatingsUseCase<Ra, R>
where
    Ra: RatingRepository,
    R: ReservationRepository,
{
    rating_repository: Ra,
    reservation_repository: R,
}

impl<Ra, R> RatingsUseCase<Ra, R>
where
    Ra: RatingRepository,
    R: ReservationRepository,
{
    pub fn new(rating_repository: Ra, reservation_repository: R) -> Self {
        Self {
            rating_repository,
            reservation_repository,
        }
    }

    #[tracing::instrument(skip(self, caller, comment), fields(university = %caller.university_code()))]
    pub async fn create(
        &self,
        caller: &Caller,
        reservation_id: Uuid,
        score: i16,
        comment: Option<String>,
    ) -> Result<RatingView, UsecaseError> {
        tracing::debug!("rating reservation");

        let member = guard::require_member(caller)?;
        let reservation = self
            .reservation_repository
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Reservation".to_string()))?;

        if reservation.member_uid != member.uid {
            return Err(UsecaseError::Forbidden(
                "only the member who stayed can rate a reservation".to_string(),
            ));
        }
        if reservation.status != ReservationStatus::Completed {
            return Err(UsecaseError::NotCompleted(format!(
                "reservation is {}, only completed stays can be rated",
                reservation.status
            )));
        }
        if !score_in_range(score) {
            return Err(UsecaseError::Validation(format!(
                "score must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }

        let comment = comment.filter(|c| !c.trim().is_empty());
        let rating = Rating::new(reservation_id, score, comment);
        self.rating_repository.create(&rating).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => UsecaseError::Conflict("reservation has already been rated".to_string()),
            other => other.into(),
        })?;

        metrics::counter!("ratings_created_total").increment(1);
        tracing::info!(rating_id = %rating.id, %reservation_id, score, "rating recorded");

        Ok(RatingView {
            id: rating.id,
            reservation_id,
            score: rating.score,
            comment: rating.comment,
            date_rated: rating.date_rated,
            member_uid: reservation.member_uid,
            university_code: reservation.university_code,
            accommodation_id: reservation.accommodation_id,
        })
    }

    /// Own ratings for members, the university's ratings for specialists.
    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn list(&self, caller: &Caller) -> Result<Vec<RatingView>, UsecaseError> {
        let ratings = match caller.member() {
            Some(member) => self.rating_repository.list_by_member(&member.uid).await?,
            None => self.rating_repository.list_by_university(caller.university_code()).await?,
        };

        tracing::debug!(count = ratings.len(), "ratings listed");
        Ok(ratings)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<RatingView, UsecaseError> {
        let rating = self.find(id).await?;
        guard::self_or_specialist(caller, &rating.member_uid, &rating.university_code)?;
        Ok(rating)
    }

    #[tracing::instrument(skip(self, caller), fields(university = %caller.university_code()))]
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), UsecaseError> {
        let rating = self.find(id).await?;
        guard::can_manage_university(caller, &rating.university_code)?;

        self.rating_repository.delete(id).await?;

        tracing::info!(rating_id = %id, "rating deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<RatingView, UsecaseError> {
        self.rating_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Rating".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::domain::reservation::Reservation;
    use crate::usecase::contracts::{MockRatingRepository, MockReservationRepository};
    use crate::usecase::roles::tests::{member_caller, specialist_caller};

    fn reservation(status: ReservationStatus) -> Reservation {
        let mut r = Reservation::new(
            Uuid::new_v4(),
            "u1".to_string(),
            "HKU".to_string(),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 20).unwrap(),
        );
        r.status = status;
        r
    }

    fn reservations_with(r: Reservation) -> MockReservationRepository {
        let mut repo = MockReservationRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(r.clone())));
        repo
    }

    fn view(member_uid: &str, university_code: &str) -> RatingView {
        RatingView {
            id: Uuid::new_v4(),
            reservation_id: Uuid::new_v4(),
            score: 4,
            comment: Some("Quiet and close to campus".to_string()),
            date_rated: Utc::now(),
            member_uid: member_uid.to_string(),
            university_code: university_code.to_string(),
            accommodation_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_rate_completed_reservation() {
        let r = reservation(ReservationStatus::Completed);
        let id = r.id;
        let mut ratings = MockRatingRepository::new();
        ratings
            .expect_create()
            .withf(move |rating| rating.reservation_id == id && rating.score == 5 && rating.comment.is_none())
            .times(1)
            .returning(|_| Ok(()));

        let usecase = RatingsUseCase::new(ratings, reservations_with(r));
        let created = usecase
            .create(&member_caller("u1", "HKU"), id, 5, Some("   ".to_string()))
            .await
            .unwrap();

        assert_eq!(created.member_uid, "u1");
        assert_eq!(created.university_code, "HKU");
    }

    #[tokio::test]
    async fn test_rate_requires_completed() {
        for status in [ReservationStatus::Pending, ReservationStatus::Confirmed, ReservationStatus::Cancelled] {
            let r = reservation(status);
            let id = r.id;
            let mut ratings = MockRatingRepository::new();
            ratings.expect_create().never();

            let err = RatingsUseCase::new(ratings, reservations_with(r))
                .create(&member_caller("u1", "HKU"), id, 3, None)
                .await
                .unwrap_err();

            assert!(matches!(err, UsecaseError::NotCompleted(_)), "{status}");
        }
    }

    #[tokio::test]
    async fn test_rate_other_members_reservation_is_forbidden() {
        let r = reservation(ReservationStatus::Completed);
        let id = r.id;

        let err = RatingsUseCase::new(MockRatingRepository::new(), reservations_with(r))
            .create(&member_caller("u2", "HKU"), id, 3, None)
            .await
            .unwrap_err();

        assert!(matches!(err, UsecaseError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_rate_by_specialist_is_forbidden() {
        let r = reservation(ReservationStatus::Completed);
        let id = r.id;

        let err = RatingsUseCase::new(MockRatingRepository::new(), reservations_with(r))
            .create(&specialist_caller("HKU"), id, 3, None)
            .await
            .unwrap_err();

        assert!(matches!(err, UsecaseError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_rate_score_out_of_range() {
        for score in [-1, 6] {
            let r = reservation(ReservationStatus::Completed);
            let id = r.id;

            let err = RatingsUseCase::new(MockRatingRepository::new(), reservations_with(r))
                .create(&member_caller("u1", "HKU"), id, score, None)
                .await
                .unwrap_err();

            assert_eq!(err.kind(), "validation_error");
        }
    }

    #[tokio::test]
    async fn test_second_rating_is_conflict() {
        let r = reservation(ReservationStatus::Completed);
        let id = r.id;
        let mut ratings = MockRatingRepository::new();
        ratings
            .expect_create()
            .returning(|_| Err(RepositoryError::Conflict("ratings_reservation_id_key".to_string())));

        let err = RatingsUseCase::new(ratings, reservations_with(r))
            .create(&member_caller("u1", "HKU"), id, 0, None)
            .await
            .unwrap_err();

        assert!(matches!(err, UsecaseError::Conflict(msg) if msg.contains("already been rated")));
    }

    #[tokio::test]
    async fn test_get_respects_visibility() {
        let rating = view("u1", "HKU");
        let id = rating.id;
        let mut ratings = MockRatingRepository::new();
        ratings.expect_find_by_id().returning(move |_| Ok(Some(rating.clone())));

        let usecase = RatingsUseCase::new(ratings, MockReservationRepository::new());

        assert!(usecase.get(&member_caller("u1", "HKU"), id).await.is_ok());
        assert!(usecase.get(&specialist_caller("HKU"), id).await.is_ok());
        assert!(usecase.get(&member_caller("u2", "HKU"), id).await.is_err());
        assert!(usecase.get(&specialist_caller("CU"), id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_by_specialist_of_university() {
        let rating = view("u1", "HKU");
        let id = rating.id;
        let mut ratings = MockRatingRepository::new();
        ratings.expect_find_by_id().returning(move |_| Ok(Some(rating.clone())));
        ratings.expect_delete().times(1).returning(|_| Ok(()));

        let usecase = RatingsUseCase::new(ratings, MockReservationRepository::new());

        assert!(matches!(
            usecase.delete(&member_caller("u1", "HKU"), id).await,
            Err(UsecaseError::Forbidden(_))
        ));
        assert!(usecase.delete(&specialist_caller("HKU"), id).await.is_ok());
    }
}
