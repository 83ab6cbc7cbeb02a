mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    middleware,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::delivery::http::v1::middleware::role_middleware;
use crate::delivery::http::v1::{accommodations, members, notifications, owners, ratings, reservations, universities};
use crate::repository::postgres::{
    create_pool, PostgresAccommodationRepository, PostgresLocationRepository, PostgresMemberRepository,
    PostgresNotificationRepository, PostgresOwnerRepository, PostgresRatingRepository,
    PostgresReservationRepository, PostgresSpecialistRepository, PostgresUniversityRepository,
};
use crate::usecase::accommodations::AccommodationsUseCase;
use crate::usecase::geocoding::AlsClient;
use crate::usecase::members::MembersUseCase;
use crate::usecase::notifications::NotificationsUseCase;
use crate::usecase::owners::OwnersUseCase;
use crate::usecase::ratings::RatingsUseCase;
use crate::usecase::reservations::ReservationsUseCase;
use crate::usecase::roles::RolesUseCase;
use crate::usecase::universities::UniversitiesUseCase;

pub struct AppState {
    pub roles_usecase:
        RolesUseCase<PostgresUniversityRepository, PostgresMemberRepository, PostgresSpecialistRepository>,
    pub universities_usecase: UniversitiesUseCase<PostgresUniversityRepository, PostgresLocationRepository>,
    pub owners_usecase: OwnersUseCase<PostgresOwnerRepository>,
    pub members_usecase: MembersUseCase<PostgresMemberRepository, PostgresSpecialistRepository>,
    pub accommodations_usecase: AccommodationsUseCase<
        PostgresAccommodationRepository,
        PostgresOwnerRepository,
        PostgresUniversityRepository,
        PostgresLocationRepository,
        AlsClient,
    >,
    pub reservations_usecase: ReservationsUseCase<
        PostgresReservationRepository,
        PostgresAccommodationRepository,
        PostgresMemberRepository,
        PostgresNotificationRepository,
    >,
    pub ratings_usecase: RatingsUseCase<PostgresRatingRepository, PostgresReservationRepository>,
    pub notifications_usecase: NotificationsUseCase<PostgresNotificationRepository>,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let tracer_provider = if config.telemetry_enabled {
        let telemetry_config = telemetry::TelemetryConfig::from(&config);
        Some(
            telemetry::init_telemetry_with_subscriber(&telemetry_config, env_filter)
                .context("failed to initialize telemetry")?,
        )
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter)?;
        None
    };

    tracing::info!("starting unihaven");

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    tracing::info!(telemetry_enabled = config.telemetry_enabled, "config loaded");

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to create database pool")?;
    tracing::info!("database pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    let geocoder = AlsClient::new(config.geocoder_url.clone(), config.geocoder_timeout())
        .context("failed to build geocoder client")?;
    tracing::info!(geocoder_url = %config.geocoder_url, "geocoder client ready");

    let shared_state = Arc::new(AppState {
        roles_usecase: RolesUseCase::new(
            PostgresUniversityRepository::new(pool.clone()),
            PostgresMemberRepository::new(pool.clone()),
            PostgresSpecialistRepository::new(pool.clone()),
        ),
        universities_usecase: UniversitiesUseCase::new(
            PostgresUniversityRepository::new(pool.clone()),
            PostgresLocationRepository::new(pool.clone()),
        ),
        owners_usecase: OwnersUseCase::new(PostgresOwnerRepository::new(pool.clone())),
        members_usecase: MembersUseCase::new(
            PostgresMemberRepository::new(pool.clone()),
            PostgresSpecialistRepository::new(pool.clone()),
        ),
        accommodations_usecase: AccommodationsUseCase::new(
            PostgresAccommodationRepository::new(pool.clone()),
            PostgresOwnerRepository::new(pool.clone()),
            PostgresUniversityRepository::new(pool.clone()),
            PostgresLocationRepository::new(pool.clone()),
            geocoder,
        ),
        reservations_usecase: ReservationsUseCase::new(
            PostgresReservationRepository::new(pool.clone()),
            PostgresAccommodationRepository::new(pool.clone()),
            PostgresMemberRepository::new(pool.clone()),
            PostgresNotificationRepository::new(pool.clone()),
        ),
        ratings_usecase: RatingsUseCase::new(
            PostgresRatingRepository::new(pool.clone()),
            PostgresReservationRepository::new(pool.clone()),
        ),
        notifications_usecase: NotificationsUseCase::new(PostgresNotificationRepository::new(pool)),
        metrics_handle,
    });

    // Every route here requires ?role=
    let role_api = Router::new()
        .route(
            "/universities/{code}/locations/",
            get(universities::list_locations).post(universities::create_location),
        )
        .route("/universities/{code}/locations/{id}/", delete(universities::delete_location))
        .route("/owners/", get(owners::list_owners).post(owners::create_owner))
        .route(
            "/owners/{id}/",
            get(owners::get_owner).patch(owners::update_owner).delete(owners::delete_owner),
        )
        .route("/members/", get(members::list_members).post(members::create_member))
        .route(
            "/members/{uid}/",
            get(members::get_member).patch(members::update_member).delete(members::delete_member),
        )
        .route("/members/{uid}/reservations/", get(members::list_member_reservations))
        .route("/specialists/", get(members::list_specialists))
        .route("/specialists/{id}/", get(members::get_specialist))
        .route(
            "/accommodations/",
            get(accommodations::list_accommodations).post(accommodations::create_accommodation),
        )
        .route("/accommodations/search/", get(accommodations::search_accommodations))
        .route(
            "/accommodations/{id}/",
            get(accommodations::get_accommodation)
                .patch(accommodations::update_accommodation)
                .delete(accommodations::delete_accommodation),
        )
        .route("/accommodations/{id}/geocode/", post(accommodations::geocode_accommodation))
        .route(
            "/reservations/",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/reservations/{id}/",
            get(reservations::get_reservation)
                .patch(reservations::update_reservation)
                .delete(reservations::cancel_reservation),
        )
        .route("/ratings/", get(ratings::list_ratings).post(ratings::create_rating))
        .route("/ratings/{id}/", get(ratings::get_rating).delete(ratings::delete_rating))
        .route("/notifications/", get(notifications::list_notifications))
        .route("/notifications/{id}/read/", post(notifications::mark_notification_read))
        .layer(middleware::from_fn(role_middleware));

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/universities/", get(universities::list_universities))
        .merge(role_api)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "unihaven listening");
    axum::serve(listener, router).await?;

    if let Some(provider) = tracer_provider {
        telemetry::shutdown_telemetry(provider);
    }

    Ok(())
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}
