use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;

use crate::models::UserId;

use super::{
    ledger::RatingSource,
    queries::{co_rated, mean},
};

/// How alike two users' tastes are
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Similarity {
    /// Pearson correlation in `[-1, 1]`
    Defined(f64),
    /// The users have no co-rated songs, so there is nothing to compare
    Undefined,
}

impl Similarity {
    /// The correlation value, or `None` when undefined
    pub fn value(self) -> Option<f64> {
        match self {
            Similarity::Defined(value) => Some(value),
            Similarity::Undefined => None,
        }
    }
}

impl Serialize for Similarity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Computes user-to-user similarity from the rating matrix
///
/// Results are memoized for the lifetime of the engine. An engine borrows
/// the ledger, so the memo can never outlive the snapshot it was built from.
pub struct SimilarityEngine<'a> {
    ratings: &'a dyn RatingSource,
    memo: RefCell<HashMap<(UserId, UserId), Similarity>>,
}

impl<'a> SimilarityEngine<'a> {
    pub fn new(ratings: &'a dyn RatingSource) -> Self {
        Self {
            ratings,
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Pearson correlation of two users over the songs both have rated
    ///
    /// Each user is centered on their own mean over the co-rated songs only.
    /// No co-rated songs gives [`Similarity::Undefined`]; zero variance on
    /// either side gives `Defined(0.0)`.
    pub fn similarity(&self, a: UserId, b: UserId) -> Similarity {
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(cached) = self.memo.borrow().get(&key) {
            return *cached;
        }

        let similarity = self.compute(key.0, key.1);
        self.memo.borrow_mut().insert(key, similarity);
        similarity
    }

    fn compute(&self, a: UserId, b: UserId) -> Similarity {
        let pairs = co_rated(
            &self.ratings.ratings_by_user(a),
            &self.ratings.ratings_by_user(b),
        );
        if pairs.is_empty() {
            return Similarity::Undefined;
        }

        let xs: Vec<f64> = pairs.iter().map(|(_, x, _)| f64::from(*x)).collect();
        let ys: Vec<f64> = pairs.iter().map(|(_, _, y)| f64::from(*y)).collect();
        let (Some(mean_x), Some(mean_y)) = (mean(&xs), mean(&ys)) else {
            return Similarity::Undefined;
        };

        let mut covariance = 0.0;
        let mut variance_x = 0.0;
        let mut variance_y = 0.0;
        for (x, y) in xs.iter().zip(&ys) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            covariance += dx * dy;
            variance_x += dx * dx;
            variance_y += dy * dy;
        }

        if variance_x == 0.0 || variance_y == 0.0 {
            tracing::debug!(user_a = %a, user_b = %b, co_rated = pairs.len(), "Zero variance");
            return Similarity::Defined(0.0);
        }

        let correlation = covariance / (variance_x * variance_y).sqrt();
        Similarity::Defined(correlation.clamp(-1.0, 1.0))
    }
}
