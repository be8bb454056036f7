//! Content view state and data structures for catalog pages and admin tables

use super::catalog::{Album, Artist, Song, Track, User};
use super::types::AdminTab;

/// Which entity list of an index/search page is focused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IndexSection {
    #[default]
    Songs,
    Albums,
    Artists,
}

impl IndexSection {
    pub fn next(self) -> Self {
        match self {
            Self::Songs => Self::Albums,
            Self::Albums => Self::Artists,
            Self::Artists => Self::Songs,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Songs => Self::Artists,
            Self::Albums => Self::Songs,
            Self::Artists => Self::Albums,
        }
    }
}

/// Catalog data shown on the home and search pages
#[derive(Clone, Debug, Default)]
pub struct IndexPage {
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
    pub section: IndexSection,
    pub track_index: usize,
    pub album_index: usize,
    pub artist_index: usize,
}

/// Upload page form state
#[derive(Clone, Debug, Default)]
pub struct UploadForm {
    pub song_name: String,
    pub album_id: String,
    pub audio_path: String,
    pub cover_path: String,
    pub focus: usize,
    pub audio_progress: Option<u8>,
    pub cover_progress: Option<u8>,
    pub status: Option<String>,
    pub in_flight: bool,
    /// Prefetched album choices shown as a hint next to the album field.
    /// Loaded opportunistically; empty when the prefetch failed.
    pub album_choices: Vec<Album>,
}

pub const UPLOAD_FIELD_COUNT: usize = 4;

/// Admin management tables
#[derive(Clone, Debug, Default)]
pub struct AdminPage {
    pub tab: AdminTab,
    pub page: u32,
    pub users: Vec<User>,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub songs: Vec<Song>,
    pub selected_index: usize,
}

impl AdminPage {
    pub fn row_count(&self) -> usize {
        match self.tab {
            AdminTab::Users => self.users.len(),
            AdminTab::Artists => self.artists.len(),
            AdminTab::Albums => self.albums.len(),
            AdminTab::Songs => self.songs.len(),
        }
    }
}

/// Represents the current view in the main content area
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    /// Home page: recent artists, albums and songs from `GET /user/`
    Index(IndexPage),
    /// Search results, same shape as the index
    SearchResults(IndexPage),
    /// Full catalog song list
    AllSongs {
        tracks: Vec<Track>,
        selected_index: usize,
    },
    ArtistDetail {
        artist: Artist,
        albums: Vec<Album>,
        selected_index: usize,
    },
    AlbumDetail {
        album: Album,
        artist_name: String,
        tracks: Vec<Track>,
        selected_index: usize,
    },
    AdminManage(AdminPage),
    Upload(UploadForm),
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub navigation_stack: Vec<ContentView>,
    pub is_loading: bool,
}
