use std::time::Instant;

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{SongId, StationId, UserId},
};

use super::{
    catalog::SongCatalog,
    ledger::RatingSource,
    predictor::{Prediction, Predictor},
    queries::{unrated_songs, unrated_station_songs},
};

/// Caps how much work a single suggestion request may do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuggestBudget {
    /// Maximum candidates scored per call; `None` scores all of them
    pub max_candidates: Option<usize>,
}

impl SuggestBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Caps scoring at `max_candidates` songs per call. Zero is raised to one
    /// so a non-empty candidate set always yields a suggestion.
    pub fn with_max_candidates(max_candidates: usize) -> Self {
        Self {
            max_candidates: Some(max_candidates.max(1)),
        }
    }

    fn take(&self, candidates: usize) -> usize {
        self.max_candidates
            .map_or(candidates, |max| candidates.min(max))
    }
}

/// The song picked for a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub prediction: Prediction,
    /// Unrated songs that were eligible
    pub candidates: usize,
    /// Eligible songs that were actually scored
    pub evaluated: usize,
}

/// Picks songs a user is predicted to enjoy
///
/// Candidates are always scanned in ascending song id order. The best
/// prediction wins and ties go to the lowest id, so the same snapshot always
/// yields the same song.
pub struct Suggester<'a> {
    catalog: &'a dyn SongCatalog,
    ratings: &'a dyn RatingSource,
    predictor: Predictor<'a>,
    budget: SuggestBudget,
}

impl<'a> Suggester<'a> {
    pub fn new(
        catalog: &'a dyn SongCatalog,
        ratings: &'a dyn RatingSource,
        budget: SuggestBudget,
    ) -> Self {
        Self {
            catalog,
            ratings,
            predictor: Predictor::new(catalog, ratings),
            budget,
        }
    }

    /// Suggests one catalog song the user has not rated yet
    pub fn suggest(&self, user_id: UserId) -> AppResult<Suggestion> {
        let candidates = unrated_songs(self.catalog, self.ratings, user_id);
        if candidates.is_empty() {
            return Err(AppError::NoCandidates(format!(
                "user {} has rated every song in the catalog",
                user_id
            )));
        }
        self.pick(user_id, &candidates)
    }

    /// Suggests one song from a station's playlist the user has not rated yet
    pub fn suggest_from_station(
        &self,
        user_id: UserId,
        station_id: StationId,
    ) -> AppResult<Suggestion> {
        let candidates = unrated_station_songs(self.catalog, self.ratings, user_id, station_id)?;
        if candidates.is_empty() {
            return Err(AppError::NoCandidates(format!(
                "user {} has rated every song on station {}",
                user_id, station_id
            )));
        }
        self.pick(user_id, &candidates)
    }

    /// Scores the unrated songs and returns the best `limit` of them, ordered
    /// by predicted stars (highest first) and then by song id
    pub fn rank(&self, user_id: UserId, limit: usize) -> AppResult<Vec<Prediction>> {
        let candidates = unrated_songs(self.catalog, self.ratings, user_id);
        if candidates.is_empty() {
            return Err(AppError::NoCandidates(format!(
                "user {} has rated every song in the catalog",
                user_id
            )));
        }

        let evaluated = self.budget.take(candidates.len());
        let mut ranked = candidates[..evaluated]
            .iter()
            .map(|song_id| self.predictor.predict(user_id, *song_id))
            .collect::<AppResult<Vec<Prediction>>>()?;

        ranked.sort_by(|a, b| b.stars.cmp(&a.stars).then(a.song_id.cmp(&b.song_id)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Expects `candidates` sorted ascending and non-empty
    fn pick(&self, user_id: UserId, candidates: &[SongId]) -> AppResult<Suggestion> {
        let start = Instant::now();
        let evaluated = self.budget.take(candidates.len());

        let mut best: Option<Prediction> = None;
        for song_id in &candidates[..evaluated] {
            let prediction = self.predictor.predict(user_id, *song_id)?;
            let better = best
                .as_ref()
                .map_or(true, |incumbent| prediction.stars > incumbent.stars);
            if better {
                best = Some(prediction);
            }
        }

        let prediction = best.ok_or_else(|| {
            AppError::Internal("no candidate was scored".to_string())
        })?;

        tracing::debug!(
            user_id = %user_id,
            song_id = %prediction.song_id,
            stars = prediction.stars.value(),
            candidates = candidates.len(),
            evaluated,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Suggestion picked"
        );

        Ok(Suggestion {
            prediction,
            candidates: candidates.len(),
            evaluated,
        })
    }
}
