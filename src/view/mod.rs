//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, sidebar)
//! - `content`: Main content area rendering
//! - `progress`: Player bar rendering
//! - `overlays`: Modal overlays (error, auth form, admin form, help)

mod content;
mod layout;
mod overlays;
mod progress;
mod utils;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, PlaybackInfo, UiState};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackInfo,
        ui_state: &UiState,
        content_state: &ContentState,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + account
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Player bar
            ])
            .split(frame.area());

        // Top bar: Search + Account
        layout::render_top_bar(frame, chunks[0], ui_state);

        // Middle: Sidebar (Library) and Main Content
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar
                Constraint::Percentage(70), // Main content
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state);

        let current_track_id = playback.track.as_ref().map(|t| t.id);
        content::render_main_content(
            frame,
            main_chunks[1],
            ui_state,
            content_state,
            current_track_id,
        );

        // Bottom: player bar with track info and controls
        progress::render_player_bar(frame, chunks[2], playback);

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        if ui_state.auth_form.is_some() {
            overlays::render_auth_form(frame, ui_state);
        }

        if ui_state.admin_form.is_some() {
            overlays::render_admin_form(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
