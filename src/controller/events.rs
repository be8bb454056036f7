//! Background listeners for audio backend events and session changes

use tokio::sync::mpsc::UnboundedReceiver;

use super::AppController;
use crate::player::PlayerEvent;

impl AppController {
    /// Forwards audio backend events into the playback engine and the model.
    pub fn start_player_event_listener(&self, mut events: UnboundedReceiver<PlayerEvent>) {
        let controller = self.clone();
        tracing::info!("starting audio event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if controller.model.should_quit().await {
                    tracing::debug!("audio event listener shutting down");
                    break;
                }

                match event {
                    PlayerEvent::PositionChanged {
                        position_ms,
                        is_playing,
                    } => {
                        tracing::trace!(position_ms, is_playing, "PlayerEvent::PositionChanged");
                        controller.player.update_position(position_ms, is_playing).await;
                    }
                    PlayerEvent::TrackEnded => {
                        tracing::debug!("PlayerEvent::TrackEnded");
                        if let Err(e) = controller.player.handle_track_ended().await {
                            controller.model.set_error(Self::format_error(&e)).await;
                        }
                    }
                    PlayerEvent::PlaybackRejected { message } => {
                        tracing::warn!(message = %message, "PlayerEvent::PlaybackRejected");
                        controller.player.mark_rejected().await;
                        controller.model.set_error(message).await;
                    }
                }
            }
        });
    }

    /// Mirrors session changes into the UI so the sidebar and top bar react
    /// to login state no matter where the change originated.
    pub fn start_session_listener(&self) {
        let mut changes = self.model.api.session().subscribe();
        let controller = self.clone();

        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let user = changes.borrow_and_update().clone();
                tracing::debug!(logged_in = user.is_some(), "session changed");
                controller.model.set_user(user).await;
            }
        });
    }
}
