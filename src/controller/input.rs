//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::AppController;
use crate::model::{ActiveSection, AuthMode, ContentView};

const SEEK_STEP_MS: i64 = 5_000;
const VOLUME_STEP: i8 = 5;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = &self.model;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
            }
            return Ok(());
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        // Handle login/register overlay
        if model.is_auth_form_open().await {
            return self.handle_auth_form_key(key).await;
        }

        // Handle admin create/edit overlay
        if model.is_admin_form_open().await {
            return self.handle_admin_form_key(key).await;
        }

        let ui_state = model.get_ui_state().await;

        // Handle search input when in search section
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        model.cycle_section_backward().await;
                    } else {
                        model.cycle_section_forward().await;
                    }
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = ui_state.search_query.clone();
                    if !query.is_empty() {
                        self.perform_search(&query).await;
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    let mut state = model.ui_state.lock().await;
                    state.search_query.clear();
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Q still quits even in search mode when Ctrl is pressed
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle MainContent section navigation
        if ui_state.active_section == ActiveSection::MainContent {
            let view = model.get_content_state().await.view;

            // The upload form swallows text input
            if matches!(view, ContentView::Upload(_)) {
                match key.code {
                    KeyCode::Up => {
                        model.content_move_up().await;
                        return Ok(());
                    }
                    KeyCode::Down | KeyCode::Tab => {
                        model.content_move_down().await;
                        return Ok(());
                    }
                    KeyCode::Enter => {
                        self.submit_upload().await;
                        return Ok(());
                    }
                    KeyCode::Backspace => {
                        model.upload_form_backspace().await;
                        return Ok(());
                    }
                    KeyCode::Esc => {
                        model.navigate_back().await;
                        return Ok(());
                    }
                    KeyCode::Char(c) => {
                        model.upload_form_input(c).await;
                        return Ok(());
                    }
                    _ => return Ok(()),
                }
            }

            if let ContentView::AdminManage(page) = &view {
                match key.code {
                    KeyCode::Left => {
                        self.open_admin_tab(page.tab.prev(), 0).await;
                        return Ok(());
                    }
                    KeyCode::Right => {
                        self.open_admin_tab(page.tab.next(), 0).await;
                        return Ok(());
                    }
                    KeyCode::PageDown => {
                        self.open_admin_tab(page.tab, page.page + 1).await;
                        return Ok(());
                    }
                    KeyCode::PageUp => {
                        self.open_admin_tab(page.tab, page.page.saturating_sub(1)).await;
                        return Ok(());
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') => {
                        self.open_create_form(page.tab).await;
                        return Ok(());
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        self.open_edit_form(page).await;
                        return Ok(());
                    }
                    KeyCode::Delete => {
                        self.delete_selected_row(page).await;
                        return Ok(());
                    }
                    _ => {}
                }
            }

            match key.code {
                KeyCode::Up => {
                    model.content_move_up().await;
                    return Ok(());
                }
                KeyCode::Down => {
                    model.content_move_down().await;
                    return Ok(());
                }
                KeyCode::Left => {
                    model.navigate_content_section(false).await;
                    return Ok(());
                }
                KeyCode::Right => {
                    model.navigate_content_section(true).await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    if let Some(item) = model.get_selected_content_item().await {
                        self.handle_selected_item(item).await;
                    }
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    model.navigate_back().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_section_backward().await;
                } else {
                    model.cycle_section_forward().await;
                }
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
            }
            KeyCode::Enter => {
                if ui_state.active_section == ActiveSection::Library {
                    if let Some(item) = model.get_selected_library_item().await {
                        self.open_library_item(item).await;
                    }
                }
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                if let Err(e) = self.player.toggle_play().await {
                    self.model.set_error(Self::format_error(&e)).await;
                }
            }
            // Next track
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.next_track().await;
            }
            // Previous track
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.previous_track().await;
            }
            // Toggle shuffle
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.player.toggle_shuffle().await;
            }
            // Cycle repeat mode
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.player.cycle_repeat().await;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.player.change_volume(VOLUME_STEP).await;
            }
            KeyCode::Char('-') => {
                self.player.change_volume(-VOLUME_STEP).await;
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.player.toggle_mute().await;
            }
            KeyCode::Char('[') => {
                self.player.seek_by(-SEEK_STEP_MS).await;
            }
            KeyCode::Char(']') => {
                self.player.seek_by(SEEK_STEP_MS).await;
            }
            // Focus search
            KeyCode::Char('g') | KeyCode::Char('G') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            // Log in / log out
            KeyCode::Char('l') | KeyCode::Char('L') => {
                if ui_state.user.is_none() {
                    model.open_auth_form(AuthMode::Login).await;
                }
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                if ui_state.user.is_some() {
                    self.logout().await;
                }
            }
            // Show help popup
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_auth_form_key(&self, key: KeyEvent) -> Result<()> {
        let model = &self.model;
        match key.code {
            KeyCode::Esc => {
                model.close_auth_form().await;
            }
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                model.auth_form_toggle_focus().await;
            }
            KeyCode::Left | KeyCode::Right => {
                model.auth_form_toggle_mode().await;
            }
            KeyCode::Backspace => {
                model.auth_form_backspace().await;
            }
            KeyCode::Enter => {
                self.submit_auth_form().await;
            }
            KeyCode::Char(c) => {
                model.auth_form_input(c).await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_admin_form_key(&self, key: KeyEvent) -> Result<()> {
        let model = &self.model;
        match key.code {
            KeyCode::Esc => {
                model.close_admin_form().await;
            }
            KeyCode::Tab | KeyCode::Down => {
                model.admin_form_next_field().await;
            }
            KeyCode::Backspace => {
                model.admin_form_backspace().await;
            }
            KeyCode::Enter => {
                self.submit_admin_form().await;
            }
            KeyCode::Char(c) => {
                model.admin_form_input(c).await;
            }
            _ => {}
        }
        Ok(())
    }
}
