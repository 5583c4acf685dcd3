use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{Song, SongId, Station, StationId},
};

/// Read access to the song universe, as the recommendation core needs it
///
/// The core never mutates the catalog, so this trait is read-only. Keeping the
/// core behind a trait lets tests drive it with a mocked catalog.
#[cfg_attr(test, mockall::automock)]
pub trait SongCatalog {
    /// Whether the song currently exists
    fn contains_song(&self, song_id: SongId) -> bool;

    /// Every song in the catalog, in ascending id order
    fn song_ids(&self) -> Vec<SongId>;

    /// Songs on a station's playlist in ascending id order, or `None` if the
    /// station does not exist
    fn station_song_ids(&self, station_id: StationId) -> Option<Vec<SongId>>;
}

/// In-memory catalog of songs and stations
#[derive(Debug, Default)]
pub struct Catalog {
    songs: HashMap<SongId, Song>,
    stations: HashMap<StationId, Station>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new song to the catalog
    pub fn add_song(&mut self, song: Song) -> AppResult<()> {
        if self.songs.contains_key(&song.id) {
            return Err(AppError::InvalidArgument(format!(
                "song {} already exists",
                song.id
            )));
        }
        self.songs.insert(song.id, song);
        Ok(())
    }

    /// Removes a song and drops it from every station playlist
    ///
    /// Ratings are owned by the ledger; callers must purge those separately.
    pub fn remove_song(&mut self, song_id: SongId) -> AppResult<Song> {
        let song = self
            .songs
            .remove(&song_id)
            .ok_or_else(|| AppError::NotFound(format!("song {}", song_id)))?;

        let mut stations_touched = 0;
        for station in self.stations.values_mut() {
            if station.remove_song(&song_id) {
                stations_touched += 1;
            }
        }

        tracing::debug!(song_id = %song_id, stations_touched, "Song removed from catalog");
        Ok(song)
    }

    pub fn song(&self, song_id: SongId) -> AppResult<&Song> {
        self.songs
            .get(&song_id)
            .ok_or_else(|| AppError::NotFound(format!("song {}", song_id)))
    }

    /// All songs, ordered by id
    pub fn songs(&self) -> Vec<&Song> {
        let mut songs: Vec<&Song> = self.songs.values().collect();
        songs.sort_by_key(|song| song.id);
        songs
    }

    /// Adds a new station
    pub fn add_station(&mut self, station: Station) -> AppResult<()> {
        if self.stations.contains_key(&station.id) {
            return Err(AppError::InvalidArgument(format!(
                "station {} already exists",
                station.id
            )));
        }
        for song_id in &station.songs {
            self.song(*song_id)?;
        }
        self.stations.insert(station.id, station);
        Ok(())
    }

    /// Removes a station. Its songs stay in the catalog.
    pub fn remove_station(&mut self, station_id: StationId) -> AppResult<Station> {
        self.stations
            .remove(&station_id)
            .ok_or_else(|| AppError::NotFound(format!("station {}", station_id)))
    }

    pub fn station(&self, station_id: StationId) -> AppResult<&Station> {
        self.stations
            .get(&station_id)
            .ok_or_else(|| AppError::NotFound(format!("station {}", station_id)))
    }

    /// All stations, ordered by id
    pub fn stations(&self) -> Vec<&Station> {
        let mut stations: Vec<&Station> = self.stations.values().collect();
        stations.sort_by_key(|station| station.id);
        stations
    }

    /// Puts an existing song on an existing station's playlist
    ///
    /// Adding a song that is already on the playlist is a no-op.
    pub fn add_to_station(&mut self, song_id: SongId, station_id: StationId) -> AppResult<()> {
        self.song(song_id)?;
        let station = self
            .stations
            .get_mut(&station_id)
            .ok_or_else(|| AppError::NotFound(format!("station {}", station_id)))?;
        station.add_song(song_id);
        Ok(())
    }

    /// Takes a song off a station's playlist
    pub fn remove_from_station(
        &mut self,
        song_id: SongId,
        station_id: StationId,
    ) -> AppResult<()> {
        self.song(song_id)?;
        let station = self
            .stations
            .get_mut(&station_id)
            .ok_or_else(|| AppError::NotFound(format!("station {}", station_id)))?;
        if !station.remove_song(&song_id) {
            return Err(AppError::NotFound(format!(
                "song {} is not on station {}",
                song_id, station_id
            )));
        }
        Ok(())
    }
}

impl SongCatalog for Catalog {
    fn contains_song(&self, song_id: SongId) -> bool {
        self.songs.contains_key(&song_id)
    }

    fn song_ids(&self) -> Vec<SongId> {
        let mut ids: Vec<SongId> = self.songs.keys().copied().collect();
        ids.sort();
        ids
    }

    fn station_song_ids(&self, station_id: StationId) -> Option<Vec<SongId>> {
        self.stations
            .get(&station_id)
            .map(|station| station.songs.iter().copied().collect())
    }
}
