pub mod ids;
pub mod rating;
pub mod song;
pub mod station;

pub use ids::{SongId, StationId, UserId};
pub use rating::{Rating, Stars};
pub use song::Song;
pub use station::Station;
