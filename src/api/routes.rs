use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/songs", get(handlers::get_songs).post(handlers::create_song))
        .route("/songs/:song_id", delete(handlers::delete_song))
        // Stations
        .route(
            "/stations",
            get(handlers::get_stations).post(handlers::create_station),
        )
        .route(
            "/stations/:station_id",
            get(handlers::get_station).delete(handlers::delete_station),
        )
        .route(
            "/stations/:station_id/songs/:song_id",
            put(handlers::add_to_station).delete(handlers::remove_from_station),
        )
        // Ratings
        .route("/users/:user_id/ratings", get(handlers::get_user_ratings))
        .route(
            "/users/:user_id/ratings/:song_id",
            put(handlers::rate_song).delete(handlers::clear_rating),
        )
        // Recommendations
        .route(
            "/users/:user_id/predictions/:song_id",
            get(handlers::predict_rating),
        )
        .route("/users/:user_id/suggestion", get(handlers::suggest_song))
        .route("/users/:user_id/suggestions", get(handlers::rank_songs))
        .route(
            "/users/:user_id/stations/:station_id/suggestion",
            get(handlers::suggest_from_station),
        )
        .route(
            "/users/:user_id/similarity/:other_user_id",
            get(handlers::user_similarity),
        )
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
