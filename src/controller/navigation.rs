//! Catalog browsing and search

use std::sync::atomic::Ordering;

use super::AppController;
use crate::model::{
    ActiveSection, AdminPage, AdminTab, ApiError, IndexPage, LibraryItem, SelectedItem, Track,
};

impl AppController {
    fn next_generation(&self) -> u64 {
        self.content_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.content_generation.load(Ordering::SeqCst) == generation
    }

    pub async fn load_index(&self) {
        let generation = self.next_generation();
        self.model.set_content_loading(true).await;

        let controller = self.clone();
        tokio::spawn(async move {
            match controller.model.api.get_index().await {
                Ok(index) => {
                    if !controller.is_current(generation) {
                        return;
                    }
                    tracing::debug!(
                        artists = index.artists.len(),
                        albums = index.albums.len(),
                        songs = index.songs.len(),
                        "index loaded"
                    );
                    let page = IndexPage {
                        tracks: index.tracks(),
                        albums: index.albums,
                        artists: index.artists,
                        ..IndexPage::default()
                    };
                    controller.model.set_index(page).await;
                }
                Err(e) => controller.fail_load(generation, e).await,
            }
        });
    }

    pub async fn load_all_songs(&self) {
        let generation = self.next_generation();
        self.model.set_content_loading(true).await;

        let controller = self.clone();
        tokio::spawn(async move {
            match controller.model.api.get_index().await {
                Ok(index) => {
                    if !controller.is_current(generation) {
                        return;
                    }
                    controller.model.set_all_songs(index.tracks()).await;
                }
                Err(e) => controller.fail_load(generation, e).await,
            }
        });
    }

    pub async fn perform_search(&self, query: &str) {
        tracing::debug!(query, "performing search");
        let generation = self.next_generation();
        self.model.set_content_loading(true).await;

        let controller = self.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            match controller.model.api.search(&query).await {
                Ok(results) => {
                    if !controller.is_current(generation) {
                        return;
                    }
                    tracing::info!(
                        query,
                        artists = results.artists.len(),
                        albums = results.albums.len(),
                        songs = results.songs.len(),
                        "search completed"
                    );
                    let page = IndexPage {
                        tracks: results.tracks(),
                        albums: results.albums,
                        artists: results.artists,
                        ..IndexPage::default()
                    };
                    controller.model.set_search_results(page).await;
                    controller
                        .model
                        .set_active_section(ActiveSection::MainContent)
                        .await;
                }
                Err(e) => controller.fail_load(generation, e).await,
            }
        });
    }

    pub async fn open_artist(&self, artist_id: i64) {
        let generation = self.next_generation();
        self.model.set_content_loading(true).await;

        let controller = self.clone();
        tokio::spawn(async move {
            let api = &controller.model.api;
            let (artist, albums) =
                tokio::join!(api.get_artist(artist_id), api.get_artist_albums(artist_id));
            match (artist, albums) {
                (Ok(artist), Ok(albums)) => {
                    if !controller.is_current(generation) {
                        return;
                    }
                    controller.model.set_artist_detail(artist, albums).await;
                }
                (Err(e), _) | (_, Err(e)) => controller.fail_load(generation, e).await,
            }
        });
    }

    pub async fn open_album(&self, album_id: i64) {
        let generation = self.next_generation();
        self.model.set_content_loading(true).await;

        let controller = self.clone();
        tokio::spawn(async move {
            let api = &controller.model.api;
            let (album, songs) = tokio::join!(api.get_album(album_id), api.get_album_songs(album_id));
            let (album, songs) = match (album, songs) {
                (Ok(album), Ok(songs)) => (album, songs),
                (Err(e), _) | (_, Err(e)) => return controller.fail_load(generation, e).await,
            };

            // Artist name is only needed for display; degrade quietly.
            let artist = api.get_artist(album.artist_id).await.ok();
            if !controller.is_current(generation) {
                return;
            }

            let artist_name = artist
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown artist".to_string());
            let cover = album.asset_id.or(artist.and_then(|a| a.asset_id));
            let tracks: Vec<Track> = songs
                .into_iter()
                .map(|song| Track {
                    id: song.song_id,
                    title: song.name,
                    artist_name: artist_name.clone(),
                    album_id: album.album_id,
                    duration_secs: song.duration,
                    cover_asset: cover,
                    audio_asset: song.asset_id,
                })
                .collect();
            controller.model.set_album_detail(album, artist_name, tracks).await;
        });
    }

    pub async fn open_library_item(&self, item: LibraryItem) {
        match item {
            LibraryItem::Home => self.load_index().await,
            LibraryItem::AllSongs => self.load_all_songs().await,
            LibraryItem::AdminManage => self.open_admin_tab(AdminTab::default(), 0).await,
            LibraryItem::AdminUpload => {
                self.model.open_upload().await;
                self.load_upload_album_choices().await;
            }
        }
        self.model.set_active_section(ActiveSection::MainContent).await;
    }

    pub async fn open_admin_tab(&self, tab: AdminTab, page: u32) {
        let generation = self.next_generation();
        self.model.set_content_loading(true).await;

        let controller = self.clone();
        tokio::spawn(async move {
            let api = &controller.model.api;
            let mut table = AdminPage {
                tab,
                page,
                ..AdminPage::default()
            };
            let result = match tab {
                AdminTab::Users => api.admin_list_users(page).await.map(|r| table.users = r),
                AdminTab::Artists => api.admin_list_artists(page).await.map(|r| table.artists = r),
                AdminTab::Albums => api.admin_list_albums(page).await.map(|r| table.albums = r),
                AdminTab::Songs => api.admin_list_songs(page).await.map(|r| table.songs = r),
            };
            match result {
                Ok(()) => {
                    if !controller.is_current(generation) {
                        return;
                    }
                    controller.model.set_admin_page(table).await;
                }
                Err(e) => controller.fail_load(generation, e).await,
            }
        });
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        match item {
            SelectedItem::Track {
                list,
                index,
                source_key,
            } => self.play_selected(list, index, source_key).await,
            SelectedItem::Artist { id } => self.open_artist(id).await,
            SelectedItem::Album { id } => self.open_album(id).await,
        }
    }

    async fn fail_load(&self, generation: u64, error: ApiError) {
        tracing::error!(error = %error, "content load failed");
        if !self.is_current(generation) {
            return;
        }
        self.model.set_content_loading(false).await;
        self.model.set_error(Self::format_error(&error)).await;
    }
}
