//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the playback engine.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `auth`: Login, registration and logout flows
//! - `navigation`: Catalog browsing and search
//! - `playback`: Playback control methods
//! - `admin`: Admin form submission and uploads
//! - `events`: Audio backend event listener

mod admin;
mod auth;
mod events;
mod input;
mod navigation;
mod playback;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::model::{ApiError, AppModel};
use crate::player::Player;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
    pub(crate) player: Arc<Player>,
    /// Bumped for every content load; responses carrying a stale generation
    /// are dropped so the last requested view always wins.
    pub(crate) content_generation: Arc<AtomicU64>,
}

impl AppController {
    pub fn new(model: Arc<AppModel>, player: Arc<Player>) -> Self {
        Self {
            model,
            player,
            content_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn format_error(error: &ApiError) -> String {
        match error {
            ApiError::Network(_) => {
                "Cannot reach the server. Check that the backend is running.".to_string()
            }
            ApiError::Unauthorized => "Session expired. Press 'l' to log in again.".to_string(),
            ApiError::InvalidCredentials => "Wrong username or password.".to_string(),
            ApiError::UsernameTaken => "That username is already taken.".to_string(),
            ApiError::NotFound => "Not found. It may have been deleted.".to_string(),
            ApiError::Validation(msg)
            | ApiError::Conflict(msg)
            | ApiError::UnsupportedFormat(msg) => msg.clone(),
            ApiError::Server(msg) => format!("Server error: {}", msg),
        }
    }
}
