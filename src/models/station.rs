use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{SongId, StationId};

/// A radio station and the songs on its playlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    /// Unique identifier for the station
    pub id: StationId,
    /// Display name (e.g., "Late Night Jazz")
    pub name: String,
    /// Songs on the playlist. Membership only, the catalog owns the songs.
    pub songs: BTreeSet<SongId>,
}

impl Station {
    /// Creates a new station with an empty playlist
    pub fn new(name: String) -> Self {
        Self {
            id: StationId::new(),
            name,
            songs: BTreeSet::new(),
        }
    }

    /// Adds a song to the playlist. Returns false if it was already there.
    pub fn add_song(&mut self, song_id: SongId) -> bool {
        self.songs.insert(song_id)
    }

    /// Removes a song from the playlist. Returns false if it was not there.
    pub fn remove_song(&mut self, song_id: &SongId) -> bool {
        self.songs.remove(song_id)
    }
}
