use crate::{
    error::AppResult,
    models::{Rating, Song, SongId, Stars, Station, StationId, UserId},
};

use super::{
    catalog::Catalog,
    ledger::RatingLedger,
    predictor::{Prediction, Predictor},
    similarity::{Similarity, SimilarityEngine},
    suggester::{SuggestBudget, Suggester, Suggestion},
};

/// The streaming radio backend: catalog, stations, ratings and recommendations
///
/// `Radio` is the only owner of mutable state. Every mutation goes through a
/// `&mut self` method, so wrapping it in a lock is enough to give each read
/// operation a consistent snapshot.
#[derive(Debug, Default)]
pub struct Radio {
    catalog: Catalog,
    ledger: RatingLedger,
    budget: SuggestBudget,
}

impl Radio {
    pub fn new(budget: SuggestBudget) -> Self {
        Self {
            catalog: Catalog::new(),
            ledger: RatingLedger::new(),
            budget,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &RatingLedger {
        &self.ledger
    }

    // Catalog

    pub fn add_song(&mut self, song: Song) -> AppResult<()> {
        let song_id = song.id;
        self.catalog.add_song(song)?;
        tracing::info!(song_id = %song_id, "Song added");
        Ok(())
    }

    /// Removes a song along with its station memberships and ratings
    pub fn remove_song(&mut self, song_id: SongId) -> AppResult<Song> {
        let song = self.catalog.remove_song(song_id)?;
        let ratings_removed = self.ledger.purge_song(song_id);
        tracing::info!(song_id = %song_id, ratings_removed, "Song removed");
        Ok(song)
    }

    pub fn add_station(&mut self, station: Station) -> AppResult<()> {
        let station_id = station.id;
        self.catalog.add_station(station)?;
        tracing::info!(station_id = %station_id, "Station added");
        Ok(())
    }

    pub fn remove_station(&mut self, station_id: StationId) -> AppResult<Station> {
        let station = self.catalog.remove_station(station_id)?;
        tracing::info!(station_id = %station_id, "Station removed");
        Ok(station)
    }

    pub fn add_to_station(&mut self, song_id: SongId, station_id: StationId) -> AppResult<()> {
        self.catalog.add_to_station(song_id, station_id)
    }

    pub fn remove_from_station(&mut self, song_id: SongId, station_id: StationId) -> AppResult<()> {
        self.catalog.remove_from_station(song_id, station_id)
    }

    // Ratings

    /// Records a user's rating of an existing song
    ///
    /// Returns the rating it replaced, if any.
    pub fn rate_song(
        &mut self,
        user_id: UserId,
        song_id: SongId,
        stars: Stars,
    ) -> AppResult<Option<Stars>> {
        self.catalog.song(song_id)?;
        let previous = self.ledger.rate(user_id, song_id, stars);
        tracing::debug!(
            user_id = %user_id,
            song_id = %song_id,
            stars = stars.value(),
            replaced = previous.is_some(),
            "Song rated"
        );
        Ok(previous)
    }

    pub fn clear_rating(&mut self, user_id: UserId, song_id: SongId) -> AppResult<Rating> {
        let removed = self.ledger.clear(user_id, song_id)?;
        tracing::debug!(user_id = %user_id, song_id = %song_id, "Rating cleared");
        Ok(removed)
    }

    pub fn user_ratings(&self, user_id: UserId) -> Vec<Rating> {
        self.ledger.user_ratings(user_id)
    }

    // Recommendations

    pub fn similarity(&self, a: UserId, b: UserId) -> Similarity {
        SimilarityEngine::new(&self.ledger).similarity(a, b)
    }

    pub fn predict_rating(&self, user_id: UserId, song_id: SongId) -> AppResult<Prediction> {
        Predictor::new(&self.catalog, &self.ledger).predict(user_id, song_id)
    }

    pub fn suggest_song(&self, user_id: UserId) -> AppResult<Suggestion> {
        self.suggester().suggest(user_id)
    }

    pub fn suggest_from_station(
        &self,
        user_id: UserId,
        station_id: StationId,
    ) -> AppResult<Suggestion> {
        self.suggester().suggest_from_station(user_id, station_id)
    }

    pub fn rank_songs(&self, user_id: UserId, limit: usize) -> AppResult<Vec<Prediction>> {
        self.suggester().rank(user_id, limit)
    }

    fn suggester(&self) -> Suggester<'_> {
        Suggester::new(&self.catalog, &self.ledger, self.budget)
    }
}
