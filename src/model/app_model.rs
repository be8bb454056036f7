//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::api_client::ApiClient;
use super::catalog::{Track, User};
use super::content::{AdminPage, ContentState, ContentView, IndexPage, IndexSection, UploadForm};
use super::types::{
    ActiveSection, AdminForm, AuthField, AuthForm, AuthMode, LibraryItem, SelectedItem, UiState,
};

/// Main application model containing all state
pub struct AppModel {
    pub api: ApiClient,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    /// Applies a new session user: rebuilds the sidebar so admin entries
    /// appear or disappear with the session.
    pub async fn set_user(&self, user: Option<User>) {
        let mut state = self.ui_state.lock().await;
        state.library_items = LibraryItem::for_user(user.as_ref());
        if state.library_selected >= state.library_items.len() {
            state.library_selected = state.library_items.len().saturating_sub(1);
        }
        state.user = user;
    }

    pub async fn current_user(&self) -> Option<User> {
        self.ui_state.lock().await.user.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        if state.active_section == ActiveSection::Library && state.library_selected > 0 {
            state.library_selected -= 1;
        }
    }

    pub async fn move_selection_down(&self) {
        let mut state = self.ui_state.lock().await;
        if state.active_section == ActiveSection::Library
            && state.library_selected < state.library_items.len().saturating_sub(1)
        {
            state.library_selected += 1;
        }
    }

    pub async fn get_selected_library_item(&self) -> Option<LibraryItem> {
        let state = self.ui_state.lock().await;
        state.library_items.get(state.library_selected).copied()
    }

    pub async fn append_to_search(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.pop();
    }

    pub async fn get_search_query(&self) -> String {
        self.ui_state.lock().await.search_query.clone()
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > 5 {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    // ========================================================================
    // Overlays
    // ========================================================================

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn open_auth_form(&self, mode: AuthMode) {
        self.ui_state.lock().await.auth_form = Some(AuthForm::new(mode));
    }

    pub async fn close_auth_form(&self) {
        self.ui_state.lock().await.auth_form = None;
    }

    pub async fn is_auth_form_open(&self) -> bool {
        self.ui_state.lock().await.auth_form.is_some()
    }

    pub async fn auth_form_input(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        if let Some(form) = &mut state.auth_form {
            match form.focus {
                AuthField::Username => form.username.push(c),
                AuthField::Password => form.password.push(c),
            }
        }
    }

    pub async fn auth_form_backspace(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(form) = &mut state.auth_form {
            match form.focus {
                AuthField::Username => {
                    form.username.pop();
                }
                AuthField::Password => {
                    form.password.pop();
                }
            }
        }
    }

    pub async fn auth_form_toggle_focus(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(form) = &mut state.auth_form {
            form.focus = match form.focus {
                AuthField::Username => AuthField::Password,
                AuthField::Password => AuthField::Username,
            };
        }
    }

    pub async fn auth_form_toggle_mode(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(form) = &mut state.auth_form {
            form.mode = match form.mode {
                AuthMode::Login => AuthMode::Register,
                AuthMode::Register => AuthMode::Login,
            };
        }
    }

    pub async fn take_auth_credentials(&self) -> Option<(AuthMode, String, String)> {
        let mut state = self.ui_state.lock().await;
        let form = state.auth_form.as_mut()?;
        if form.in_flight || form.username.is_empty() || form.password.is_empty() {
            return None;
        }
        form.in_flight = true;
        Some((form.mode, form.username.clone(), form.password.clone()))
    }

    pub async fn auth_form_finish(&self, success: bool) {
        let mut state = self.ui_state.lock().await;
        if success {
            state.auth_form = None;
        } else if let Some(form) = &mut state.auth_form {
            form.in_flight = false;
            form.password.clear();
            form.focus = AuthField::Password;
        }
    }

    pub async fn open_admin_form(&self, form: AdminForm) {
        self.ui_state.lock().await.admin_form = Some(form);
    }

    pub async fn close_admin_form(&self) {
        self.ui_state.lock().await.admin_form = None;
    }

    pub async fn is_admin_form_open(&self) -> bool {
        self.ui_state.lock().await.admin_form.is_some()
    }

    pub async fn admin_form_input(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        if let Some(form) = &mut state.admin_form {
            if let Some(field) = form.fields.get_mut(form.focus) {
                field.value.push(c);
            }
        }
    }

    pub async fn admin_form_backspace(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(form) = &mut state.admin_form {
            if let Some(field) = form.fields.get_mut(form.focus) {
                field.value.pop();
            }
        }
    }

    pub async fn admin_form_next_field(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(form) = &mut state.admin_form {
            form.focus = (form.focus + 1) % form.fields.len().max(1);
        }
    }

    pub async fn admin_form_set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        if let Some(form) = &mut state.admin_form {
            form.error = Some(message);
            form.in_flight = false;
        }
    }

    /// Snapshots the admin form for submission, marking it in flight so a
    /// second Enter does not double-submit.
    pub async fn take_admin_form(&self) -> Option<AdminForm> {
        let mut state = self.ui_state.lock().await;
        let form = state.admin_form.as_mut()?;
        if form.in_flight {
            return None;
        }
        form.in_flight = true;
        form.error = None;
        Some(form.clone())
    }

    // ========================================================================
    // Content State
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_content_loading(&self, loading: bool) {
        self.content_state.lock().await.is_loading = loading;
    }

    pub async fn set_index(&self, page: IndexPage) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::Index(page);
        state.is_loading = false;
    }

    pub async fn set_search_results(&self, page: IndexPage) {
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty) {
            state.navigation_stack.clear(); // Clear stack on new search
        }
        state.view = ContentView::SearchResults(page);
        state.is_loading = false;
    }

    pub async fn set_all_songs(&self, tracks: Vec<Track>) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::AllSongs {
            tracks,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_artist_detail(
        &self,
        artist: super::catalog::Artist,
        albums: Vec<super::catalog::Album>,
    ) {
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::ArtistDetail {
            artist,
            albums,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_album_detail(
        &self,
        album: super::catalog::Album,
        artist_name: String,
        tracks: Vec<Track>,
    ) {
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::AlbumDetail {
            album,
            artist_name,
            tracks,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_admin_page(&self, page: AdminPage) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::AdminManage(page);
        state.is_loading = false;
    }

    pub async fn open_upload(&self) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::Upload(UploadForm::default());
        state.is_loading = false;
    }

    pub async fn navigate_back(&self) -> bool {
        let mut state = self.content_state.lock().await;
        if let Some(previous_view) = state.navigation_stack.pop() {
            state.view = previous_view;
            true
        } else {
            state.view = ContentView::Empty;
            false
        }
    }

    pub async fn navigate_content_section(&self, forward: bool) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::Index(page) | ContentView::SearchResults(page) => {
                page.section = if forward {
                    page.section.next()
                } else {
                    page.section.prev()
                };
            }
            _ => {}
        }
    }

    pub async fn content_move_up(&self) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::Index(page) | ContentView::SearchResults(page) => {
                let idx = match page.section {
                    IndexSection::Songs => &mut page.track_index,
                    IndexSection::Albums => &mut page.album_index,
                    IndexSection::Artists => &mut page.artist_index,
                };
                if *idx > 0 {
                    *idx -= 1;
                }
            }
            ContentView::AllSongs { selected_index, .. }
            | ContentView::ArtistDetail { selected_index, .. }
            | ContentView::AlbumDetail { selected_index, .. } => {
                if *selected_index > 0 {
                    *selected_index -= 1;
                }
            }
            ContentView::AdminManage(page) => {
                if page.selected_index > 0 {
                    page.selected_index -= 1;
                }
            }
            ContentView::Upload(form) => {
                if form.focus > 0 {
                    form.focus -= 1;
                }
            }
            ContentView::Empty => {}
        }
    }

    pub async fn content_move_down(&self) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::Index(page) | ContentView::SearchResults(page) => {
                let (idx, max) = match page.section {
                    IndexSection::Songs => (&mut page.track_index, page.tracks.len()),
                    IndexSection::Albums => (&mut page.album_index, page.albums.len()),
                    IndexSection::Artists => (&mut page.artist_index, page.artists.len()),
                };
                if *idx < max.saturating_sub(1) {
                    *idx += 1;
                }
            }
            ContentView::AllSongs {
                tracks,
                selected_index,
            } => {
                if *selected_index < tracks.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::ArtistDetail {
                albums,
                selected_index,
                ..
            } => {
                if *selected_index < albums.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::AlbumDetail {
                tracks,
                selected_index,
                ..
            } => {
                if *selected_index < tracks.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::AdminManage(page) => {
                if page.selected_index < page.row_count().saturating_sub(1) {
                    page.selected_index += 1;
                }
            }
            ContentView::Upload(form) => {
                if form.focus < super::content::UPLOAD_FIELD_COUNT - 1 {
                    form.focus += 1;
                }
            }
            ContentView::Empty => {}
        }
    }

    pub async fn get_selected_content_item(&self) -> Option<SelectedItem> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::Index(page) | ContentView::SearchResults(page) => {
                let source_key = match &state.view {
                    ContentView::Index(_) => "index".to_string(),
                    _ => "search".to_string(),
                };
                match page.section {
                    IndexSection::Songs => {
                        if page.tracks.is_empty() {
                            None
                        } else {
                            Some(SelectedItem::Track {
                                list: page.tracks.clone(),
                                index: page.track_index.min(page.tracks.len() - 1),
                                source_key,
                            })
                        }
                    }
                    IndexSection::Albums => page
                        .albums
                        .get(page.album_index)
                        .map(|a| SelectedItem::Album { id: a.album_id }),
                    IndexSection::Artists => page
                        .artists
                        .get(page.artist_index)
                        .map(|a| SelectedItem::Artist { id: a.artist_id }),
                }
            }
            ContentView::AllSongs {
                tracks,
                selected_index,
            } => {
                if tracks.is_empty() {
                    None
                } else {
                    Some(SelectedItem::Track {
                        list: tracks.clone(),
                        index: (*selected_index).min(tracks.len() - 1),
                        source_key: "all-songs".to_string(),
                    })
                }
            }
            ContentView::ArtistDetail {
                albums,
                selected_index,
                ..
            } => albums
                .get(*selected_index)
                .map(|a| SelectedItem::Album { id: a.album_id }),
            ContentView::AlbumDetail {
                album,
                tracks,
                selected_index,
                ..
            } => {
                if tracks.is_empty() {
                    None
                } else {
                    Some(SelectedItem::Track {
                        list: tracks.clone(),
                        index: (*selected_index).min(tracks.len() - 1),
                        source_key: format!("album:{}", album.album_id),
                    })
                }
            }
            ContentView::AdminManage(_) | ContentView::Upload(_) | ContentView::Empty => None,
        }
    }

    // ========================================================================
    // Upload Form
    // ========================================================================

    pub async fn upload_form_input(&self, c: char) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Upload(form) = &mut state.view {
            if form.in_flight {
                return;
            }
            match form.focus {
                0 => form.song_name.push(c),
                1 => form.album_id.push(c),
                2 => form.audio_path.push(c),
                _ => form.cover_path.push(c),
            }
        }
    }

    pub async fn upload_form_backspace(&self) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Upload(form) = &mut state.view {
            if form.in_flight {
                return;
            }
            match form.focus {
                0 => form.song_name.pop(),
                1 => form.album_id.pop(),
                2 => form.audio_path.pop(),
                _ => form.cover_path.pop(),
            };
        }
    }

    pub async fn take_upload_form(&self) -> Option<UploadForm> {
        let mut state = self.content_state.lock().await;
        if let ContentView::Upload(form) = &mut state.view {
            if form.in_flight {
                return None;
            }
            form.in_flight = true;
            form.status = Some("uploading...".to_string());
            return Some(form.clone());
        }
        None
    }

    pub async fn set_upload_album_choices(&self, albums: Vec<super::catalog::Album>) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Upload(form) = &mut state.view {
            form.album_choices = albums;
        }
    }

    pub async fn set_upload_progress(&self, audio: Option<u8>, cover: Option<u8>) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Upload(form) = &mut state.view {
            if audio.is_some() {
                form.audio_progress = audio;
            }
            if cover.is_some() {
                form.cover_progress = cover;
            }
        }
    }

    pub async fn finish_upload(&self, result: Result<String, String>) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Upload(form) = &mut state.view {
            match result {
                Ok(message) => {
                    let choices = std::mem::take(&mut form.album_choices);
                    *form = UploadForm {
                        status: Some(message),
                        album_choices: choices,
                        ..UploadForm::default()
                    };
                }
                Err(message) => {
                    form.in_flight = false;
                    form.status = Some(message);
                }
            }
        }
    }
}
