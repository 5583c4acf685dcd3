use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::RequestId;
use crate::models::{Rating, Song, SongId, Stars, Station, StationId, UserId};
use crate::services::{Prediction, PredictionBasis, Similarity, Suggestion};

use super::extract::{AppJson, AppPath, AppQuery};
use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Serialize)]
pub struct SongResponse {
    pub id: SongId,
    pub title: String,
    pub artist: String,
}

impl From<&Song> for SongResponse {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id,
            title: song.title.clone(),
            artist: song.artist.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateStationRequest {
    pub name: String,
    pub songs: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct StationResponse {
    pub id: StationId,
    pub name: String,
    pub songs: Vec<SongId>,
}

impl From<&Station> for StationResponse {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id,
            name: station.name.clone(),
            songs: station.songs.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RateSongRequest {
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct RateSongResponse {
    pub user_id: UserId,
    pub song_id: SongId,
    pub rating: Stars,
    pub previous: Option<Stars>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub song_id: SongId,
    pub rating: Stars,
    pub rated_at: DateTime<Utc>,
}

impl From<&Rating> for RatingResponse {
    fn from(rating: &Rating) -> Self {
        Self {
            song_id: rating.song_id,
            rating: rating.stars,
            rated_at: rating.rated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub song: SongResponse,
    pub predicted_rating: Stars,
    pub estimate: f64,
    pub basis: PredictionBasis,
    pub candidates: usize,
    pub evaluated: usize,
}

#[derive(Debug, Deserialize)]
pub struct RankQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RankedSongResponse {
    pub song: SongResponse,
    pub predicted_rating: Stars,
    pub estimate: f64,
}

#[derive(Debug, Serialize)]
pub struct SimilarityResponse {
    pub user_id: UserId,
    pub other_user_id: UserId,
    /// `null` when the users share no rated songs
    pub similarity: Similarity,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Get all songs
pub async fn get_songs(State(state): State<AppState>) -> Json<Vec<SongResponse>> {
    let radio = state.inner.read().await;
    let songs = radio
        .catalog()
        .songs()
        .into_iter()
        .map(SongResponse::from)
        .collect();
    Json(songs)
}

/// Add a song to the catalog
pub async fn create_song(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateSongRequest>,
) -> AppResult<(StatusCode, Json<SongResponse>)> {
    let song = Song::new(request.title, request.artist);
    let response = SongResponse::from(&song);

    let mut radio = state.inner.write().await;
    radio.add_song(song)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Remove a song, its station memberships and its ratings
pub async fn delete_song(
    State(state): State<AppState>,
    AppPath(song_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let song_id = SongId::parse(song_id)?;
    let mut radio = state.inner.write().await;
    radio.remove_song(song_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get all stations
pub async fn get_stations(State(state): State<AppState>) -> Json<Vec<StationResponse>> {
    let radio = state.inner.read().await;
    let stations = radio
        .catalog()
        .stations()
        .into_iter()
        .map(StationResponse::from)
        .collect();
    Json(stations)
}

/// Get one station and its playlist
pub async fn get_station(
    State(state): State<AppState>,
    AppPath(station_id): AppPath<Uuid>,
) -> AppResult<Json<StationResponse>> {
    let station_id = StationId::parse(station_id)?;
    let radio = state.inner.read().await;
    let station = radio.catalog().station(station_id)?;
    Ok(Json(StationResponse::from(station)))
}

/// Create a station, optionally seeded with existing songs
pub async fn create_station(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateStationRequest>,
) -> AppResult<(StatusCode, Json<StationResponse>)> {
    let mut station = Station::new(request.name);
    for song_id in request.songs.unwrap_or_default() {
        station.add_song(SongId::parse(song_id)?);
    }
    let response = StationResponse::from(&station);

    let mut radio = state.inner.write().await;
    radio.add_station(station)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Remove a station; its songs stay in the catalog
pub async fn delete_station(
    State(state): State<AppState>,
    AppPath(station_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let station_id = StationId::parse(station_id)?;
    let mut radio = state.inner.write().await;
    radio.remove_station(station_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Put a song on a station's playlist
pub async fn add_to_station(
    State(state): State<AppState>,
    AppPath((station_id, song_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let station_id = StationId::parse(station_id)?;
    let song_id = SongId::parse(song_id)?;
    let mut radio = state.inner.write().await;
    radio.add_to_station(song_id, station_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Take a song off a station's playlist
pub async fn remove_from_station(
    State(state): State<AppState>,
    AppPath((station_id, song_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let station_id = StationId::parse(station_id)?;
    let song_id = SongId::parse(song_id)?;
    let mut radio = state.inner.write().await;
    radio.remove_from_station(song_id, station_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get every rating a user has on record
pub async fn get_user_ratings(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<RatingResponse>>> {
    let user_id = UserId::parse(user_id)?;
    let radio = state.inner.read().await;
    let ratings = radio
        .user_ratings(user_id)
        .iter()
        .map(RatingResponse::from)
        .collect();
    Ok(Json(ratings))
}

/// Set a user's rating for a song (1 to 5 stars)
pub async fn rate_song(
    State(state): State<AppState>,
    AppPath((user_id, song_id)): AppPath<(Uuid, Uuid)>,
    AppJson(request): AppJson<RateSongRequest>,
) -> AppResult<Json<RateSongResponse>> {
    let user_id = UserId::parse(user_id)?;
    let song_id = SongId::parse(song_id)?;
    let stars = Stars::try_from(request.rating)?;

    let mut radio = state.inner.write().await;
    let previous = radio.rate_song(user_id, song_id, stars)?;

    Ok(Json(RateSongResponse {
        user_id,
        song_id,
        rating: stars,
        previous,
    }))
}

/// Clear a user's rating for a song
pub async fn clear_rating(
    State(state): State<AppState>,
    AppPath((user_id, song_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let user_id = UserId::parse(user_id)?;
    let song_id = SongId::parse(song_id)?;
    let mut radio = state.inner.write().await;
    radio.clear_rating(user_id, song_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Predict the rating a user would give a song
pub async fn predict_rating(
    State(state): State<AppState>,
    AppPath((user_id, song_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<Json<Prediction>> {
    let user_id = UserId::parse(user_id)?;
    let song_id = SongId::parse(song_id)?;
    let radio = state.inner.read().await;
    let prediction = radio.predict_rating(user_id, song_id)?;
    Ok(Json(prediction))
}

/// Suggest a song the user has not rated yet
pub async fn suggest_song(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<SuggestionResponse>> {
    let user_id = UserId::parse(user_id)?;
    tracing::info!(request_id = %request_id, user_id = %user_id, "Processing suggestion request");

    let radio = state.inner.read().await;
    let suggestion = radio.suggest_song(user_id)?;
    let song = radio.catalog().song(suggestion.prediction.song_id)?;

    Ok(Json(suggestion_response(song, suggestion)))
}

/// Suggest a song from one station's playlist
pub async fn suggest_from_station(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppPath((user_id, station_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<Json<SuggestionResponse>> {
    let user_id = UserId::parse(user_id)?;
    let station_id = StationId::parse(station_id)?;
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        station_id = %station_id,
        "Processing station suggestion request"
    );

    let radio = state.inner.read().await;
    let suggestion = radio.suggest_from_station(user_id, station_id)?;
    let song = radio.catalog().song(suggestion.prediction.song_id)?;

    Ok(Json(suggestion_response(song, suggestion)))
}

/// Rank the user's unrated songs by predicted rating
pub async fn rank_songs(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<RankQuery>,
) -> AppResult<Json<Vec<RankedSongResponse>>> {
    let user_id = UserId::parse(user_id)?;
    let limit = query
        .limit
        .unwrap_or(state.max_suggestions)
        .clamp(1, state.max_suggestions);

    let radio = state.inner.read().await;
    let ranked = radio
        .rank_songs(user_id, limit)?
        .into_iter()
        .map(|prediction| -> AppResult<RankedSongResponse> {
            let song = radio.catalog().song(prediction.song_id)?;
            Ok(RankedSongResponse {
                song: SongResponse::from(song),
                predicted_rating: prediction.stars,
                estimate: prediction.estimate,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(ranked))
}

/// Similarity between two users' tastes
pub async fn user_similarity(
    State(state): State<AppState>,
    AppPath((user_id, other_user_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<Json<SimilarityResponse>> {
    let user_id = UserId::parse(user_id)?;
    let other_user_id = UserId::parse(other_user_id)?;
    let radio = state.inner.read().await;
    let similarity = radio.similarity(user_id, other_user_id);
    Ok(Json(SimilarityResponse {
        user_id,
        other_user_id,
        similarity,
    }))
}

fn suggestion_response(song: &Song, suggestion: Suggestion) -> SuggestionResponse {
    SuggestionResponse {
        song: SongResponse::from(song),
        predicted_rating: suggestion.prediction.stars,
        estimate: suggestion.prediction.estimate,
        basis: suggestion.prediction.basis,
        candidates: suggestion.candidates,
        evaluated: suggestion.evaluated,
    }
}
