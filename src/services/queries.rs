//! Ledger and catalog queries shared by the recommendation core.

use std::collections::{BTreeMap, HashSet};

use crate::{
    error::{AppError, AppResult},
    models::{SongId, Stars, StationId, UserId},
};

use super::{catalog::SongCatalog, ledger::RatingSource};

/// Songs in the catalog the user has not rated, in ascending id order
pub fn unrated_songs(
    catalog: &dyn SongCatalog,
    ratings: &dyn RatingSource,
    user_id: UserId,
) -> Vec<SongId> {
    exclude_rated(catalog.song_ids(), ratings, user_id)
}

/// Songs on a station the user has not rated, in ascending id order
pub fn unrated_station_songs(
    catalog: &dyn SongCatalog,
    ratings: &dyn RatingSource,
    user_id: UserId,
    station_id: StationId,
) -> AppResult<Vec<SongId>> {
    let songs = catalog
        .station_song_ids(station_id)
        .ok_or_else(|| AppError::NotFound(format!("station {}", station_id)))?;
    Ok(exclude_rated(songs, ratings, user_id))
}

fn exclude_rated(
    mut songs: Vec<SongId>,
    ratings: &dyn RatingSource,
    user_id: UserId,
) -> Vec<SongId> {
    let rated: HashSet<SongId> = ratings
        .ratings_by_user(user_id)
        .into_iter()
        .map(|(song_id, _)| song_id)
        .collect();
    songs.retain(|song_id| !rated.contains(song_id));
    songs.sort();
    songs.dedup();
    songs
}

/// Pairs up two users' ratings over the songs both have rated
///
/// The pairs come back in ascending song order no matter which order the
/// inputs were in, so any sum over them is identical with the users swapped.
pub fn co_rated(
    left: &[(SongId, Stars)],
    right: &[(SongId, Stars)],
) -> Vec<(SongId, Stars, Stars)> {
    let right: BTreeMap<SongId, Stars> = right.iter().copied().collect();
    let mut pairs: Vec<(SongId, Stars, Stars)> = left
        .iter()
        .filter_map(|(song_id, stars)| right.get(song_id).map(|other| (*song_id, *stars, *other)))
        .collect();
    pairs.sort_by_key(|(song_id, _, _)| *song_id);
    pairs
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
