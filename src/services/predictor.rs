use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{SongId, Stars, UserId},
};

use super::{
    catalog::SongCatalog,
    ledger::RatingSource,
    similarity::{Similarity, SimilarityEngine},
};

/// Where a predicted rating came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionBasis {
    /// Similarity-weighted average of other users' ratings
    Neighbors,
    /// No usable neighbors; mean of every rating on record
    GlobalAverage,
    /// Nothing rated at all
    NeutralDefault,
}

/// A predicted rating together with how it was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub user_id: UserId,
    pub song_id: SongId,
    /// The estimate rounded and clamped to a valid rating
    pub stars: Stars,
    /// The real-valued estimate before rounding
    pub estimate: f64,
    pub basis: PredictionBasis,
    /// Other raters of the song whose similarity to the user is defined.
    /// Raters with no co-rated songs are not counted.
    pub neighbors: usize,
}

/// User-based collaborative filtering over one catalog/ledger snapshot
pub struct Predictor<'a> {
    catalog: &'a dyn SongCatalog,
    ratings: &'a dyn RatingSource,
    similarity: SimilarityEngine<'a>,
}

impl<'a> Predictor<'a> {
    pub fn new(catalog: &'a dyn SongCatalog, ratings: &'a dyn RatingSource) -> Self {
        Self {
            catalog,
            ratings,
            similarity: SimilarityEngine::new(ratings),
        }
    }

    /// The similarity engine this predictor weights neighbors with
    pub fn similarity(&self) -> &SimilarityEngine<'a> {
        &self.similarity
    }

    /// Predicts the rating `user_id` would give `song_id`
    ///
    /// The estimate is Σ(w·r) / Σ|w| over every other user who rated the song,
    /// where w is their similarity to `user_id`. Raters with undefined
    /// similarity are left out of both sums. When the denominator is zero the
    /// estimate falls back to the global average, or to 3 on an empty ledger.
    ///
    /// Whether the user has already rated the song makes no difference.
    pub fn predict(&self, user_id: UserId, song_id: SongId) -> AppResult<Prediction> {
        if !self.catalog.contains_song(song_id) {
            return Err(AppError::NotFound(format!("song {}", song_id)));
        }

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        let mut neighbors = 0;

        for (other, stars) in self.ratings.ratings_for_song(song_id) {
            if other == user_id {
                continue;
            }
            match self.similarity.similarity(user_id, other) {
                Similarity::Undefined => continue,
                Similarity::Defined(weight) => {
                    neighbors += 1;
                    weighted_sum += weight * f64::from(stars);
                    weight_total += weight.abs();
                }
            }
        }

        let (estimate, basis) = if weight_total > 0.0 {
            (weighted_sum / weight_total, PredictionBasis::Neighbors)
        } else if let Some(average) = self.ratings.global_average() {
            (average, PredictionBasis::GlobalAverage)
        } else {
            (f64::from(Stars::NEUTRAL), PredictionBasis::NeutralDefault)
        };

        let prediction = Prediction {
            user_id,
            song_id,
            stars: Stars::from_estimate(estimate),
            estimate,
            basis,
            neighbors,
        };

        tracing::debug!(
            user_id = %user_id,
            song_id = %song_id,
            stars = prediction.stars.value(),
            estimate,
            neighbors,
            basis = ?basis,
            "Rating predicted"
        );

        Ok(prediction)
    }
}
