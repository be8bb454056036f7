//! Playback control methods

use super::AppController;
use crate::model::Track;

impl AppController {
    pub(crate) async fn play_selected(&self, list: Vec<Track>, index: usize, source_key: String) {
        let controller = self.clone();
        tokio::spawn(async move {
            if let Err(e) = controller
                .player
                .play_from_list(list, index, &source_key)
                .await
            {
                controller.model.set_error(Self::format_error(&e)).await;
            }
        });
    }

    pub(crate) async fn next_track(&self) {
        if let Err(e) = self.player.next_track().await {
            self.model.set_error(Self::format_error(&e)).await;
        }
    }

    pub(crate) async fn previous_track(&self) {
        if let Err(e) = self.player.prev_track().await {
            self.model.set_error(Self::format_error(&e)).await;
        }
    }
}
