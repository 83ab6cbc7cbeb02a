use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    domain::accommodation::Accommodation,
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
    usecase::contracts::{
        AccommodationFilter, AccommodationRepository, LocationRepository, MemberRepository,
        NotificationRepository, OwnerRepository, RatingRepository, ReservationRepository,
        SpecialistRepository, UniversityRepository,
    },
};

pub struct PostgresUniversityRepository {
    pool: PgPool,
}

impl PostgresUniversityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UniversityRepository for PostgresUniversityRepository {
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<University>, RepositoryError> {
        tracing::debug!("listing universities");

        let universities = sqlx::query_as::<_, University>("SELECT code, name FROM universities ORDER BY code")
            .fetch_all(&self.pool)
            .await?;

        Ok(universities)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> Result<Option<University>, RepositoryError> {
        let university = sqlx::query_as::<_, University>("SELECT code, name FROM universities WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(university)
    }
}

pub struct PostgresLocationRepository {
    pool: PgPool,
}

impl PostgresLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LocationRepository for PostgresLocationRepository {
    #[tracing::instrument(skip(self, location), fields(location_id = %location.id, university = %location.university_code))]
    async fn create(&self, location: &UniversityLocation) -> Result<(), RepositoryError> {
        tracing::debug!("creating university location");

        sqlx::query(
            r#"
            INSERT INTO university_locations (id, university_code, name, latitude, longitude, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(location.id)
        .bind(&location.university_code)
        .bind(&location.name)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(location.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_name(
        &self,
        university_code: &str,
        name: &str,
    ) -> Result<Option<UniversityLocation>, RepositoryError> {
        let location = sqlx::query_as::<_, UniversityLocation>(
            r#"
            SELECT id, university_code, name, latitude, longitude, created_at
            FROM university_locations
            WHERE university_code = $1 AND name = $2
            "#,
        )
        .bind(university_code)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<UniversityLocation>, RepositoryError> {
        let locations = sqlx::query_as::<_, UniversityLocation>(
            r#"
            SELECT id, university_code, name, latitude, longitude, created_at
            FROM university_locations
            WHERE university_code = $1
            ORDER BY name
            "#,
        )
        .bind(university_code)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = locations.len(), "found locations");
        Ok(locations)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, university_code: &str, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM university_locations WHERE id = $1 AND university_code = $2")
            .bind(id)
            .bind(university_code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub struct PostgresOwnerRepository {
    pool: PgPool,
}

impl PostgresOwnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl OwnerRepository for PostgresOwnerRepository {
    #[tracing::instrument(skip(self, owner), fields(owner_id = %owner.id))]
    async fn create(&self, owner: &PropertyOwner) -> Result<(), RepositoryError> {
        tracing::debug!("creating property owner");

        sqlx::query(
            r#"
            INSERT INTO property_owners (id, name, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(owner.id)
        .bind(&owner.name)
        .bind(&owner.phone)
        .bind(owner.created_at)
        .bind(owner.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PropertyOwner>, RepositoryError> {
        let owner = sqlx::query_as::<_, PropertyOwner>(
            "SELECT id, name, phone, created_at, updated_at FROM property_owners WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<PropertyOwner>, RepositoryError> {
        let owners = sqlx::query_as::<_, PropertyOwner>(
            "SELECT id, name, phone, created_at, updated_at FROM property_owners ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = owners.len(), "found property owners");
        Ok(owners)
    }

    #[tracing::instrument(skip(self, owner), fields(owner_id = %owner.id))]
    async fn update(&self, owner: &PropertyOwner) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE property_owners SET name = $2, phone = $3, updated_at = $4 WHERE id = $1")
            .bind(owner.id)
            .bind(&owner.name)
            .bind(&owner.phone)
            .bind(owner.updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM property_owners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MemberRepository for PostgresMemberRepository {
    #[tracing::instrument(skip(self, member), fields(uid = %member.uid))]
    async fn create(&self, member: &Member) -> Result<(), RepositoryError> {
        tracing::debug!("creating member");

        sqlx::query("INSERT INTO members (uid, name, university_code, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&member.uid)
            .bind(&member.name)
            .bind(&member.university_code)
            .bind(member.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_uid(&self, uid: &str) -> Result<Option<Member>, RepositoryError> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT uid, name, university_code, created_at FROM members WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    #[tracing::instrument(skip(self, member), fields(uid = %member.uid, university = %member.university_code))]
    async fn find_or_create(&self, member: &Member) -> Result<Member, RepositoryError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO members (uid, name, university_code, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (uid) DO NOTHING
            "#,
        )
        .bind(&member.uid)
        .bind(&member.name)
        .bind(&member.university_code)
        .bind(member.created_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            tracing::info!(uid = %member.uid, "member provisioned");
        }

        let stored = sqlx::query_as::<_, Member>(
            "SELECT uid, name, university_code, created_at FROM members WHERE uid = $1",
        )
        .bind(&member.uid)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<Member>, RepositoryError> {
        let members = sqlx::query_as::<_, Member>(
            "SELECT uid, name, university_code, created_at FROM members WHERE university_code = $1 ORDER BY uid",
        )
        .bind(university_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    #[tracing::instrument(skip(self, member), fields(uid = %member.uid))]
    async fn update(&self, member: &Member) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE members SET name = $2 WHERE uid = $1")
            .bind(&member.uid)
            .bind(&member.name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, uid: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM members WHERE uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub struct PostgresSpecialistRepository {
    pool: PgPool,
}

impl PostgresSpecialistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SpecialistRepository for PostgresSpecialistRepository {
    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Specialist>, RepositoryError> {
        let specialist = sqlx::query_as::<_, Specialist>(
            "SELECT id, name, university_code, created_at FROM specialists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(specialist)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<Specialist>, RepositoryError> {
        let specialists = sqlx::query_as::<_, Specialist>(
            "SELECT id, name, university_code, created_at FROM specialists WHERE university_code = $1 ORDER BY name",
        )
        .bind(university_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(specialists)
    }
}

/// Accommodation columns plus the offered universities and the rating aggregate.
const ACCOMMODATION_SELECT: &str = r#"
    SELECT a.id, a.accommodation_type, a.address, a.building_name, a.room_number,
           a.flat_number, a.floor_number, a.latitude, a.longitude, a.geo_address,
           a.available_from, a.available_until, a.beds, a.bedrooms, a.daily_price,
           a.owner_id, a.specialist_id,
           ARRAY(
               SELECT au.university_code::text FROM accommodation_universities au
               WHERE au.accommodation_id = a.id ORDER BY au.university_code
           ) AS universities,
           rt.average_rating,
           COALESCE(rt.rating_count, 0) AS rating_count,
           a.created_at, a.updated_at
    FROM accommodations a
    LEFT JOIN (
        SELECT r.accommodation_id, AVG(ra.score::float8) AS average_rating, COUNT(*) AS rating_count
        FROM ratings ra
        JOIN reservations r ON r.id = ra.reservation_id
        GROUP BY r.accommodation_id
    ) rt ON rt.accommodation_id = a.id
"#;

/// `ILIKE` pattern matching `needle` literally anywhere in the column.
fn substring_pattern(needle: &str) -> String {
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

pub struct PostgresAccommodationRepository {
    pool: PgPool,
}

impl PostgresAccommodationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccommodationRepository for PostgresAccommodationRepository {
    #[tracing::instrument(skip(self, accommodation), fields(accommodation_id = %accommodation.id))]
    async fn create(&self, accommodation: &Accommodation) -> Result<(), RepositoryError> {
        tracing::debug!("creating accommodation");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accommodations (
                id, accommodation_type, address, building_name, room_number, flat_number, floor_number,
                latitude, longitude, geo_address, available_from, available_until, beds, bedrooms,
                daily_price, owner_id, specialist_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(accommodation.id)
        .bind(accommodation.accommodation_type)
        .bind(&accommodation.address)
        .bind(&accommodation.building_name)
        .bind(&accommodation.room_number)
        .bind(&accommodation.flat_number)
        .bind(&accommodation.floor_number)
        .bind(accommodation.latitude)
        .bind(accommodation.longitude)
        .bind(&accommodation.geo_address)
        .bind(accommodation.available_from)
        .bind(accommodation.available_until)
        .bind(accommodation.beds)
        .bind(accommodation.bedrooms)
        .bind(accommodation.daily_price)
        .bind(accommodation.owner_id)
        .bind(accommodation.specialist_id)
        .bind(accommodation.created_at)
        .bind(accommodation.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO accommodation_universities (accommodation_id, university_code)
            SELECT $1, UNNEST($2::text[])
            "#,
        )
        .bind(accommodation.id)
        .bind(&accommodation.universities)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(accommodation_id = %accommodation.id, "accommodation created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Accommodation>, RepositoryError> {
        let query = format!("{ACCOMMODATION_SELECT} WHERE a.id = $1");

        let accommodation = sqlx::query_as::<_, Accommodation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(accommodation)
    }

    #[tracing::instrument(skip(self), fields(university = %filter.university_code))]
    async fn search(&self, filter: &AccommodationFilter) -> Result<Vec<Accommodation>, RepositoryError> {
        tracing::debug!(?filter, "searching accommodations");

        let query = format!(
            r#"
            {ACCOMMODATION_SELECT}
            WHERE EXISTS (
                      SELECT 1 FROM accommodation_universities au
                      WHERE au.accommodation_id = a.id AND au.university_code = $1
                  )
              AND ($2::accommodation_type IS NULL OR a.accommodation_type = $2)
              AND ($3::int IS NULL OR a.beds = $3)
              AND ($4::int IS NULL OR a.beds >= $4)
              AND ($5::int IS NULL OR a.bedrooms = $5)
              AND ($6::int IS NULL OR a.bedrooms >= $6)
              AND ($7::smallint IS NULL OR ROUND(rt.average_rating::numeric) = $7)
              AND ($8::float8 IS NULL OR rt.average_rating >= $8)
              AND ($9::float8 IS NULL OR a.daily_price <= $9)
              AND ($10::date IS NULL OR a.available_until >= $10)
              AND ($11::date IS NULL OR a.available_from <= $11)
              AND ($12::text IS NULL
                   OR a.address ILIKE $12 ESCAPE '\'
                   OR a.geo_address ILIKE $12 ESCAPE '\')
            ORDER BY a.created_at DESC
            "#
        );

        let accommodations = sqlx::query_as::<_, Accommodation>(&query)
            .bind(&filter.university_code)
            .bind(filter.accommodation_type)
            .bind(filter.beds)
            .bind(filter.min_beds)
            .bind(filter.bedrooms)
            .bind(filter.min_bedrooms)
            .bind(filter.rating)
            .bind(filter.min_rating)
            .bind(filter.max_price)
            .bind(filter.available_from)
            .bind(filter.available_until)
            .bind(filter.address.as_deref().map(substring_pattern))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = accommodations.len(), "found accommodations");
        Ok(accommodations)
    }

    #[tracing::instrument(skip(self, accommodation), fields(accommodation_id = %accommodation.id))]
    async fn update(&self, accommodation: &Accommodation) -> Result<(), RepositoryError> {
        tracing::debug!("updating accommodation");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE accommodations
            SET accommodation_type = $2, address = $3, building_name = $4, room_number = $5,
                flat_number = $6, floor_number = $7, latitude = $8, longitude = $9,
                geo_address = $10, available_from = $11, available_until = $12, beds = $13,
                bedrooms = $14, daily_price = $15, owner_id = $16, updated_at = $17
            WHERE id = $1
            "#,
        )
        .bind(accommodation.id)
        .bind(accommodation.accommodation_type)
        .bind(&accommodation.address)
        .bind(&accommodation.building_name)
        .bind(&accommodation.room_number)
        .bind(&accommodation.flat_number)
        .bind(&accommodation.floor_number)
        .bind(accommodation.latitude)
        .bind(accommodation.longitude)
        .bind(&accommodation.geo_address)
        .bind(accommodation.available_from)
        .bind(accommodation.available_until)
        .bind(accommodation.beds)
        .bind(accommodation.bedrooms)
        .bind(accommodation.daily_price)
        .bind(accommodation.owner_id)
        .bind(accommodation.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM accommodation_universities WHERE accommodation_id = $1")
            .bind(accommodation.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO accommodation_universities (accommodation_id, university_code)
            SELECT $1, UNNEST($2::text[])
            "#,
        )
        .bind(accommodation.id)
        .bind(&accommodation.universities)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(accommodation_id = %accommodation.id, "accommodation updated successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM accommodations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

const RESERVATION_COLUMNS: &str = "id, accommodation_id, member_uid, university_code, status, start_date, end_date, cancelled_by, created_at, updated_at";

pub struct PostgresReservationRepository {
    pool: PgPool,
}

impl PostgresReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReservationRepository for PostgresReservationRepository {
    #[tracing::instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    async fn create(&self, reservation: &Reservation) -> Result<(), RepositoryError> {
        tracing::debug!("creating reservation");

        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, accommodation_id, member_uid, university_code, status,
                start_date, end_date, cancelled_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.accommodation_id)
        .bind(&reservation.member_uid)
        .bind(&reservation.university_code)
        .bind(reservation.status)
        .bind(reservation.start_date)
        .bind(reservation.end_date)
        .bind(reservation.cancelled_by)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, RepositoryError> {
        let query = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1");

        let reservation = sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reservation)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_member(&self, member_uid: &str) -> Result<Vec<Reservation>, RepositoryError> {
        let query = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE member_uid = $1 ORDER BY start_date DESC"
        );

        let reservations = sqlx::query_as::<_, Reservation>(&query)
            .bind(member_uid)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = reservations.len(), "found reservations");
        Ok(reservations)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<Reservation>, RepositoryError> {
        let query = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE university_code = $1 ORDER BY start_date DESC"
        );

        let reservations = sqlx::query_as::<_, Reservation>(&query)
            .bind(university_code)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = reservations.len(), "found reservations");
        Ok(reservations)
    }

    #[tracing::instrument(skip(self))]
    async fn transition(
        &self,
        id: Uuid,
        expected: ReservationStatus,
        next: ReservationStatus,
        cancelled_by: Option<RoleKind>,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let query = format!(
            r#"
            UPDATE reservations
            SET status = $3, cancelled_by = COALESCE($4, cancelled_by), updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {RESERVATION_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(expected)
            .bind(next)
            .bind(cancelled_by)
            .fetch_optional(&self.pool)
            .await?;

        tracing::debug!(applied = updated.is_some(), "reservation transition");
        Ok(updated)
    }
}

const RATING_SELECT: &str = r#"
    SELECT ra.id, ra.reservation_id, ra.score, ra.comment, ra.date_rated,
           r.member_uid, r.university_code, r.accommodation_id
    FROM ratings ra
    JOIN reservations r ON r.id = ra.reservation_id
"#;

pub struct PostgresRatingRepository {
    pool: PgPool,
}

impl PostgresRatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RatingRepository for PostgresRatingRepository {
    #[tracing::instrument(skip(self, rating), fields(rating_id = %rating.id, reservation_id = %rating.reservation_id))]
    async fn create(&self, rating: &Rating) -> Result<(), RepositoryError> {
        tracing::debug!("creating rating");

        sqlx::query(
            r#"
            INSERT INTO ratings (id, reservation_id, score, comment, date_rated)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(rating.id)
        .bind(rating.reservation_id)
        .bind(rating.score)
        .bind(&rating.comment)
        .bind(rating.date_rated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RatingView>, RepositoryError> {
        let query = format!("{RATING_SELECT} WHERE ra.id = $1");

        let rating = sqlx::query_as::<_, RatingView>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rating)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_member(&self, member_uid: &str) -> Result<Vec<RatingView>, RepositoryError> {
        let query = format!("{RATING_SELECT} WHERE r.member_uid = $1 ORDER BY ra.date_rated DESC");

        let ratings = sqlx::query_as::<_, RatingView>(&query)
            .bind(member_uid)
            .fetch_all(&self.pool)
            .await?;

        Ok(ratings)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_university(&self, university_code: &str) -> Result<Vec<RatingView>, RepositoryError> {
        let query = format!("{RATING_SELECT} WHERE r.university_code = $1 ORDER BY ra.date_rated DESC");

        let ratings = sqlx::query_as::<_, RatingView>(&query)
            .bind(university_code)
            .fetch_all(&self.pool)
            .await?;

        Ok(ratings)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl NotificationRepository for PostgresNotificationRepository {
    #[tracing::instrument(skip(self, notification), fields(notification_id = %notification.id))]
    async fn create(&self, notification: &Notification) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, recipient_kind, recipient_id, reservation_id, subject, message, is_read, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id)
        .bind(notification.recipient_kind)
        .bind(&notification.recipient_id)
        .bind(notification.reservation_id)
        .bind(&notification.subject)
        .bind(&notification.message)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_recipient(
        &self,
        kind: RoleKind,
        recipient_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_kind, recipient_id, reservation_id, subject, message, is_read, created_at
            FROM notifications
            WHERE recipient_kind = $1 AND recipient_id = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(kind)
        .bind(recipient_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = notifications.len(), "found notifications");
        Ok(notifications)
    }

    #[tracing::instrument(skip(self))]
    async fn count_unread(&self, kind: RoleKind, recipient_id: &str) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE recipient_kind = $1 AND recipient_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(kind)
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    #[tracing::instrument(skip(self))]
    async fn mark_as_read(&self, id: Uuid, kind: RoleKind, recipient_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE id = $1 AND recipient_kind = $2 AND recipient_id = $3
            "#,
        )
        .bind(id)
        .bind(kind)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
