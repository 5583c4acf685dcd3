use std::collections::{BTreeMap, HashMap};

use crate::{
    error::{AppError, AppResult},
    models::{Rating, SongId, Stars, UserId},
};

/// Read access to the rating matrix, as the recommendation core needs it
#[cfg_attr(test, mockall::automock)]
pub trait RatingSource {
    /// The user's current rating of a song, if any
    fn rating(&self, user_id: UserId, song_id: SongId) -> Option<Stars>;

    /// Every (user, stars) pair on record for a song
    fn ratings_for_song(&self, song_id: SongId) -> Vec<(UserId, Stars)>;

    /// Every (song, stars) pair on record for a user, in ascending song order
    fn ratings_by_user(&self, user_id: UserId) -> Vec<(SongId, Stars)>;

    /// Mean of all ratings on record, `None` when nothing has been rated
    fn global_average(&self) -> Option<f64>;
}

/// Sparse rating matrix indexed both by user and by song
///
/// Both views are updated together on every write, along with a running
/// total so the global average never needs a full scan.
#[derive(Debug, Default)]
pub struct RatingLedger {
    by_user: HashMap<UserId, BTreeMap<SongId, Rating>>,
    by_song: HashMap<SongId, BTreeMap<UserId, Stars>>,
    total_stars: u64,
    rating_count: u64,
}

impl RatingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rating, replacing any earlier one for the same pair
    ///
    /// Returns the stars that were replaced, if any.
    pub fn rate(&mut self, user_id: UserId, song_id: SongId, stars: Stars) -> Option<Stars> {
        let rating = Rating::new(user_id, song_id, stars);
        let previous = self
            .by_user
            .entry(user_id)
            .or_default()
            .insert(song_id, rating)
            .map(|old| old.stars);
        self.by_song
            .entry(song_id)
            .or_default()
            .insert(user_id, stars);

        if let Some(old) = previous {
            self.total_stars -= old.value() as u64;
        } else {
            self.rating_count += 1;
        }
        self.total_stars += stars.value() as u64;

        previous
    }

    /// Removes a rating so that it looks as if it was never made
    pub fn clear(&mut self, user_id: UserId, song_id: SongId) -> AppResult<Rating> {
        let user_ratings = self.by_user.get_mut(&user_id).ok_or_else(|| {
            AppError::NoRatingOnRecord(format!("user {} has not rated song {}", user_id, song_id))
        })?;
        let removed = user_ratings.remove(&song_id).ok_or_else(|| {
            AppError::NoRatingOnRecord(format!("user {} has not rated song {}", user_id, song_id))
        })?;
        if user_ratings.is_empty() {
            self.by_user.remove(&user_id);
        }

        if let Some(song_ratings) = self.by_song.get_mut(&song_id) {
            song_ratings.remove(&user_id);
            if song_ratings.is_empty() {
                self.by_song.remove(&song_id);
            }
        }

        self.total_stars -= removed.stars.value() as u64;
        self.rating_count -= 1;
        Ok(removed)
    }

    /// Drops every rating on a song. Returns how many were removed.
    pub fn purge_song(&mut self, song_id: SongId) -> usize {
        let Some(song_ratings) = self.by_song.remove(&song_id) else {
            return 0;
        };

        for (user_id, stars) in &song_ratings {
            if let Some(user_ratings) = self.by_user.get_mut(user_id) {
                user_ratings.remove(&song_id);
                if user_ratings.is_empty() {
                    self.by_user.remove(user_id);
                }
            }
            self.total_stars -= stars.value() as u64;
            self.rating_count -= 1;
        }

        song_ratings.len()
    }

    /// Full rating records for a user, ordered by song id
    pub fn user_ratings(&self, user_id: UserId) -> Vec<Rating> {
        self.by_user
            .get(&user_id)
            .map(|ratings| ratings.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rating_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.rating_count == 0
    }
}

impl RatingSource for RatingLedger {
    fn rating(&self, user_id: UserId, song_id: SongId) -> Option<Stars> {
        self.by_user
            .get(&user_id)
            .and_then(|ratings| ratings.get(&song_id))
            .map(|rating| rating.stars)
    }

    fn ratings_for_song(&self, song_id: SongId) -> Vec<(UserId, Stars)> {
        self.by_song
            .get(&song_id)
            .map(|ratings| ratings.iter().map(|(user, stars)| (*user, *stars)).collect())
            .unwrap_or_default()
    }

    fn ratings_by_user(&self, user_id: UserId) -> Vec<(SongId, Stars)> {
        self.by_user
            .get(&user_id)
            .map(|ratings| {
                ratings
                    .iter()
                    .map(|(song, rating)| (*song, rating.stars))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn global_average(&self) -> Option<f64> {
        if self.rating_count == 0 {
            return None;
        }
        Some(self.total_stars as f64 / self.rating_count as f64)
    }
}
