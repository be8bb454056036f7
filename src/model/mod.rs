//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `catalog`: Catalog entities and the track join
//! - `session`: Persisted auth session with change broadcast
//! - `api_client`: Backend REST client
//! - `queue`: Play queue state machine (shuffle, repeat, transitions)
//! - `playback`: Playback timing, settings and UI snapshot types
//! - `types`: Core UI type definitions
//! - `content`: Content view data (index, search, details, admin tables)
//! - `app_model`: Main application model with state management methods

mod app_model;
pub mod api_client;
pub mod catalog;
mod content;
mod playback;
pub mod queue;
pub mod session;
mod types;

pub use types::{
    ActiveSection, AdminForm, AdminTab, AuthField, AuthForm, AuthMode, FormField, LibraryItem,
    SelectedItem, UiState,
};

pub use playback::{PlaybackInfo, PlaybackSettings, PlaybackTiming, DEFAULT_VOLUME_PERCENT};

pub use content::{AdminPage, ContentState, ContentView, IndexPage, IndexSection, UploadForm};

pub use api_client::{ApiClient, ApiError, AssetKind};
pub use catalog::{Album, Artist, CatalogIndex, Song, Track, User};
pub use queue::{PlayQueue, RepeatMode, Transport};
pub use session::SessionStore;

pub use app_model::AppModel;
