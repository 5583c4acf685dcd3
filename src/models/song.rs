use serde::{Deserialize, Serialize};

use super::SongId;

/// A song in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Song {
    /// Unique identifier for the song
    pub id: SongId,
    /// Song title
    pub title: String,
    /// Performing artist
    pub artist: String,
}

impl Song {
    /// Creates a new song with a fresh identifier
    pub fn new(title: String, artist: String) -> Self {
        Self {
            id: SongId::new(),
            title,
            artist,
        }
    }
}
