use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{SongId, UserId};
use crate::error::AppError;

/// A star rating, always in `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub const MIN: Stars = Stars(1);
    pub const MAX: Stars = Stars(5);
    /// Prediction used when nothing at all has been rated yet
    pub const NEUTRAL: Stars = Stars(3);

    pub fn value(self) -> u8 {
        self.0
    }

    /// Converts a real-valued estimate to stars.
    ///
    /// Rounds to the nearest integer with halves going up (3.5 becomes 4),
    /// then clamps into `1..=5`. Non-finite input yields [`Stars::NEUTRAL`].
    pub fn from_estimate(estimate: f64) -> Stars {
        if !estimate.is_finite() {
            return Stars::NEUTRAL;
        }
        let rounded = (estimate + 0.5).floor();
        let clamped = rounded.clamp(Self::MIN.0 as f64, Self::MAX.0 as f64);
        Stars(clamped as u8)
    }
}

impl TryFrom<i64> for Stars {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN.0 as i64..=Self::MAX.0 as i64).contains(&value) {
            Ok(Stars(value as u8))
        } else {
            Err(AppError::InvalidArgument(format!(
                "rating must be between 1 and 5, got {}",
                value
            )))
        }
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> Self {
        stars.0
    }
}

impl From<Stars> for f64 {
    fn from(stars: Stars) -> Self {
        stars.0 as f64
    }
}

/// A user's rating of a song
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub song_id: SongId,
    pub stars: Stars,
    pub rated_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(user_id: UserId, song_id: SongId, stars: Stars) -> Self {
        Self {
            user_id,
            song_id,
            stars,
            rated_at: Utc::now(),
        }
    }
}
