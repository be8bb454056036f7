//! Admin form submission, row deletion and asset uploads

use std::path::Path;

use super::AppController;
use crate::model::{AdminForm, AdminPage, AdminTab, AssetKind, FormField};

fn parse_id(field: &FormField) -> Result<i64, String> {
    field
        .value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("{} must be a number", field.label))
}

fn parse_optional_id(field: &FormField) -> Result<Option<i64>, String> {
    let value = field.value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| format!("{} must be a number", field.label))
}

fn parse_flag(field: &FormField) -> bool {
    matches!(field.value.trim().to_lowercase().as_str(), "y" | "yes" | "true" | "1")
}

fn non_empty(field: &FormField) -> Result<String, String> {
    let value = field.value.trim().to_string();
    if value.is_empty() {
        return Err(format!("{} is required", field.label));
    }
    Ok(value)
}

fn optional(field: &FormField) -> Option<String> {
    let value = field.value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl AppController {
    pub(crate) async fn open_create_form(&self, tab: AdminTab) {
        let fields = match tab {
            AdminTab::Users => vec![
                FormField::new("Username"),
                FormField::new("Password"),
                FormField::new("Admin (y/n)"),
            ],
            AdminTab::Artists => vec![
                FormField::new("Name"),
                FormField::new("Biography"),
                FormField::new("Cover asset id"),
            ],
            AdminTab::Albums => vec![
                FormField::new("Name"),
                FormField::new("Artist id"),
                FormField::new("Cover asset id"),
            ],
            AdminTab::Songs => vec![
                FormField::new("Name"),
                FormField::new("Album id"),
                FormField::new("Audio asset id"),
            ],
        };
        self.model
            .open_admin_form(AdminForm {
                target: tab,
                editing_id: None,
                fields,
                focus: 0,
                error: None,
                in_flight: false,
            })
            .await;
    }

    pub(crate) async fn open_edit_form(&self, page: &AdminPage) {
        let form = match page.tab {
            AdminTab::Users => page.users.get(page.selected_index).map(|user| AdminForm {
                target: AdminTab::Users,
                editing_id: Some(user.user_id),
                fields: vec![
                    FormField::with_value("Username", &user.username),
                    FormField::with_value("Admin (y/n)", if user.is_admin { "y" } else { "n" }),
                ],
                focus: 0,
                error: None,
                in_flight: false,
            }),
            AdminTab::Artists => page.artists.get(page.selected_index).map(|artist| AdminForm {
                target: AdminTab::Artists,
                editing_id: Some(artist.artist_id),
                fields: vec![
                    FormField::with_value("Name", &artist.name),
                    FormField::with_value(
                        "Biography",
                        artist.biography.clone().unwrap_or_default(),
                    ),
                    FormField::with_value(
                        "Cover asset id",
                        artist.asset_id.map(|id| id.to_string()).unwrap_or_default(),
                    ),
                ],
                focus: 0,
                error: None,
                in_flight: false,
            }),
            AdminTab::Albums => page.albums.get(page.selected_index).map(|album| AdminForm {
                target: AdminTab::Albums,
                editing_id: Some(album.album_id),
                fields: vec![
                    FormField::with_value("Name", &album.name),
                    FormField::with_value("Artist id", album.artist_id.to_string()),
                    FormField::with_value(
                        "Cover asset id",
                        album.asset_id.map(|id| id.to_string()).unwrap_or_default(),
                    ),
                ],
                focus: 0,
                error: None,
                in_flight: false,
            }),
            AdminTab::Songs => page.songs.get(page.selected_index).map(|song| AdminForm {
                target: AdminTab::Songs,
                editing_id: Some(song.song_id),
                fields: vec![
                    FormField::with_value("Name", &song.name),
                    FormField::with_value("Album id", song.album_id.to_string()),
                ],
                focus: 0,
                error: None,
                in_flight: false,
            }),
        };

        if let Some(form) = form {
            self.model.open_admin_form(form).await;
        }
    }

    pub(crate) async fn submit_admin_form(&self) {
        let Some(form) = self.model.take_admin_form().await else {
            return;
        };

        let controller = self.clone();
        tokio::spawn(async move {
            match controller.apply_admin_form(&form).await {
                Ok(()) => {
                    controller.model.close_admin_form().await;
                    controller.refresh_admin_tab(form.target).await;
                }
                Err(message) => {
                    controller.model.admin_form_set_error(message).await;
                }
            }
        });
    }

    async fn apply_admin_form(&self, form: &AdminForm) -> Result<(), String> {
        let api = &self.model.api;
        match (form.target, form.editing_id) {
            (AdminTab::Users, None) => {
                let username = non_empty(&form.fields[0])?;
                let password = non_empty(&form.fields[1])?;
                let is_admin = parse_flag(&form.fields[2]);
                api.admin_create_user(&username, &password, is_admin)
                    .await
                    .map_err(|e| Self::format_error(&e))
            }
            (AdminTab::Users, Some(id)) => {
                let username = non_empty(&form.fields[0])?;
                let is_admin = parse_flag(&form.fields[1]);
                api.admin_update_user(id, &username, is_admin)
                    .await
                    .map_err(|e| Self::format_error(&e))
            }
            (AdminTab::Artists, None) => {
                let name = non_empty(&form.fields[0])?;
                let biography = optional(&form.fields[1]);
                let asset_id = parse_optional_id(&form.fields[2])?;
                api.admin_create_artist(&name, biography.as_deref(), asset_id)
                    .await
                    .map(|_| ())
                    .map_err(|e| Self::format_error(&e))
            }
            (AdminTab::Artists, Some(id)) => {
                let name = non_empty(&form.fields[0])?;
                let biography = optional(&form.fields[1]);
                let asset_id = parse_optional_id(&form.fields[2])?;
                api.admin_update_artist(id, &name, biography.as_deref(), asset_id)
                    .await
                    .map_err(|e| Self::format_error(&e))
            }
            (AdminTab::Albums, None) => {
                let name = non_empty(&form.fields[0])?;
                let artist_id = parse_id(&form.fields[1])?;
                let asset_id = parse_optional_id(&form.fields[2])?;
                api.admin_create_album(&name, artist_id, asset_id)
                    .await
                    .map(|_| ())
                    .map_err(|e| Self::format_error(&e))
            }
            (AdminTab::Albums, Some(id)) => {
                let name = non_empty(&form.fields[0])?;
                let artist_id = parse_id(&form.fields[1])?;
                let asset_id = parse_optional_id(&form.fields[2])?;
                api.admin_update_album(id, &name, artist_id, asset_id)
                    .await
                    .map_err(|e| Self::format_error(&e))
            }
            (AdminTab::Songs, None) => {
                let name = non_empty(&form.fields[0])?;
                let album_id = parse_id(&form.fields[1])?;
                let asset_id = parse_id(&form.fields[2])?;
                api.admin_create_song(&name, album_id, asset_id)
                    .await
                    .map(|_| ())
                    .map_err(|e| Self::format_error(&e))
            }
            (AdminTab::Songs, Some(id)) => {
                let name = non_empty(&form.fields[0])?;
                let album_id = parse_id(&form.fields[1])?;
                api.admin_update_song(id, &name, album_id)
                    .await
                    .map_err(|e| Self::format_error(&e))
            }
        }
    }

    pub(crate) async fn delete_selected_row(&self, page: &AdminPage) {
        let api = &self.model.api;
        let result = match page.tab {
            AdminTab::Users => match page.users.get(page.selected_index) {
                Some(user) => api.admin_delete_user(user.user_id).await,
                None => return,
            },
            AdminTab::Artists => match page.artists.get(page.selected_index) {
                Some(artist) => api.admin_delete_artist(artist.artist_id).await,
                None => return,
            },
            AdminTab::Albums => match page.albums.get(page.selected_index) {
                Some(album) => api.admin_delete_album(album.album_id).await,
                None => return,
            },
            AdminTab::Songs => match page.songs.get(page.selected_index) {
                Some(song) => {
                    let result = api.admin_delete_song(song.song_id).await;
                    if result.is_ok() {
                        // A deleted song must also leave the play queue.
                        self.player.remove_track(song.song_id).await;
                    }
                    result
                }
                None => return,
            },
        };

        match result {
            Ok(()) => self.refresh_admin_tab(page.tab).await,
            Err(e) => self.model.set_error(Self::format_error(&e)).await,
        }
    }

    async fn refresh_admin_tab(&self, tab: AdminTab) {
        let page = match self.model.get_content_state().await.view {
            crate::model::ContentView::AdminManage(page) if page.tab == tab => page.page,
            _ => 0,
        };
        self.open_admin_tab(tab, page).await;
    }

    // ========================================================================
    // Upload
    // ========================================================================

    pub(crate) async fn load_upload_album_choices(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            // Hint only; an empty list still allows manual album ids.
            let albums = controller
                .model
                .api
                .admin_list_albums(0)
                .await
                .unwrap_or_default();
            controller.model.set_upload_album_choices(albums).await;
        });
    }

    pub(crate) async fn submit_upload(&self) {
        let Some(form) = self.model.take_upload_form().await else {
            return;
        };

        let controller = self.clone();
        tokio::spawn(async move {
            let result = controller.run_upload(&form).await;
            controller.model.finish_upload(result).await;
        });
    }

    async fn run_upload(&self, form: &crate::model::UploadForm) -> Result<String, String> {
        let api = &self.model.api;
        let name = form.song_name.trim();
        if name.is_empty() {
            return Err("Song name is required".to_string());
        }
        let album_id = form
            .album_id
            .trim()
            .parse::<i64>()
            .map_err(|_| "Album id must be a number".to_string())?;
        if form.audio_path.trim().is_empty() {
            return Err("Audio file is required".to_string());
        }

        let model = self.model.clone();
        let audio = api
            .upload_asset(
                Path::new(form.audio_path.trim()),
                AssetKind::AudioMp3,
                move |pct| {
                    let model = model.clone();
                    tokio::spawn(async move {
                        model.set_upload_progress(Some(pct), None).await;
                    });
                },
            )
            .await
            .map_err(|e| Self::format_error(&e))?;

        let song = api
            .admin_create_song(name, album_id, audio.asset_id)
            .await
            .map_err(|e| Self::format_error(&e))?;

        if !form.cover_path.trim().is_empty() {
            let model = self.model.clone();
            let cover = api
                .upload_asset(
                    Path::new(form.cover_path.trim()),
                    AssetKind::CoverPng,
                    move |pct| {
                        let model = model.clone();
                        tokio::spawn(async move {
                            model.set_upload_progress(None, Some(pct)).await;
                        });
                    },
                )
                .await
                .map_err(|e| Self::format_error(&e))?;

            let album = api.get_album(album_id).await.map_err(|e| Self::format_error(&e))?;
            api.admin_update_album(album_id, &album.name, album.artist_id, Some(cover.asset_id))
                .await
                .map_err(|e| Self::format_error(&e))?;
        }

        tracing::info!(song_id = song.song_id, name = %song.name, "upload finished");
        Ok(format!("Uploaded \"{}\"", song.name))
    }
}
