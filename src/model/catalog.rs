//! Backend catalog entities and the joined display track

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An authenticated user as reported by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// An artist record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Artist {
    pub artist_id: i64,
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub asset_id: Option<i64>,
}

/// An album record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Album {
    pub album_id: i64,
    pub name: String,
    pub artist_id: i64,
    #[serde(default)]
    pub asset_id: Option<i64>,
}

/// A song record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Song {
    pub song_id: i64,
    pub name: String,
    pub album_id: i64,
    #[serde(default)]
    pub asset_id: Option<i64>,
    /// Duration in seconds, when the backend knows it.
    #[serde(default)]
    pub duration: Option<u32>,
}

/// The catalog index returned by `GET /user/` and `/user/search`.
#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub songs: Vec<Song>,
}

/// A song joined with its album and artist, ready for display and playback.
///
/// Immutable from the client's perspective except through admin mutations.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: i64,
    pub title: String,
    pub artist_name: String,
    pub album_id: i64,
    pub duration_secs: Option<u32>,
    /// Cover asset, falling back from the album's cover to the artist's.
    pub cover_asset: Option<i64>,
    pub audio_asset: Option<i64>,
}

impl CatalogIndex {
    /// Join songs with their album and the album's artist into display tracks.
    pub fn tracks(&self) -> Vec<Track> {
        let albums_by_id: HashMap<i64, &Album> =
            self.albums.iter().map(|a| (a.album_id, a)).collect();
        let artists_by_id: HashMap<i64, &Artist> =
            self.artists.iter().map(|a| (a.artist_id, a)).collect();

        self.songs
            .iter()
            .map(|song| {
                let album = albums_by_id.get(&song.album_id);
                let artist = album.and_then(|al| artists_by_id.get(&al.artist_id));
                let cover_asset = album
                    .and_then(|al| al.asset_id)
                    .or_else(|| artist.and_then(|ar| ar.asset_id));

                Track {
                    id: song.song_id,
                    title: song.name.clone(),
                    artist_name: artist
                        .map(|ar| ar.name.clone())
                        .unwrap_or_else(|| "Unknown artist".to_string()),
                    album_id: song.album_id,
                    duration_secs: song.duration,
                    cover_asset,
                    audio_asset: song.asset_id,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> CatalogIndex {
        CatalogIndex {
            artists: vec![Artist {
                artist_id: 1,
                name: "Artist".into(),
                biography: None,
                asset_id: Some(900),
            }],
            albums: vec![Album {
                album_id: 10,
                name: "Album".into(),
                artist_id: 1,
                asset_id: None,
            }],
            songs: vec![Song {
                song_id: 100,
                name: "Song".into(),
                album_id: 10,
                asset_id: Some(500),
                duration: Some(187),
            }],
        }
    }

    #[test]
    fn join_resolves_artist_through_album() {
        let tracks = index().tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].artist_name, "Artist");
        assert_eq!(tracks[0].audio_asset, Some(500));
    }

    #[test]
    fn cover_falls_back_to_artist_asset() {
        let tracks = index().tracks();
        // Album has no cover, artist does
        assert_eq!(tracks[0].cover_asset, Some(900));
    }

    #[test]
    fn orphan_song_gets_placeholder_artist() {
        let mut idx = index();
        idx.albums.clear();
        let tracks = idx.tracks();
        assert_eq!(tracks[0].artist_name, "Unknown artist");
        assert_eq!(tracks[0].cover_asset, None);
    }
}
