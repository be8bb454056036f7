//! Playback engine
//!
//! Owns the play queue and the audio backend. Track selection, transport
//! transitions and volume live here; the controller only forwards intent and
//! backend events.

pub mod sink;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::model::api_client::ApiError;
use crate::model::queue::{PlayQueue, RemoveOutcome, Transport};
use crate::model::{ApiClient, PlaybackInfo, PlaybackSettings, PlaybackTiming, Track};

pub use sink::{MediaSink, NullSink, PlayerEvent, RodioSink};

/// Source of raw audio bytes for a catalog asset, abstracted so the engine
/// can be exercised without a backend.
pub trait AudioFetcher: Send + Sync {
    fn fetch(&self, asset_id: i64) -> BoxFuture<'_, Result<Vec<u8>, ApiError>>;
}

impl AudioFetcher for ApiClient {
    fn fetch(&self, asset_id: i64) -> BoxFuture<'_, Result<Vec<u8>, ApiError>> {
        Box::pin(self.fetch_asset(asset_id))
    }
}

pub struct Player {
    sink: Arc<dyn MediaSink>,
    fetcher: Arc<dyn AudioFetcher>,
    queue: Mutex<PlayQueue>,
    timing: Mutex<PlaybackTiming>,
    settings: Mutex<PlaybackSettings>,
    /// Bumped on every load so a slow fetch cannot clobber a newer one.
    load_generation: AtomicU64,
    /// Whether the sink currently holds a playable source. Cleared when the
    /// queue runs out or the source is released, so resuming knows to reload
    /// instead of unpausing an empty sink.
    source_loaded: AtomicBool,
}

impl Player {
    pub fn new(sink: Arc<dyn MediaSink>, fetcher: Arc<dyn AudioFetcher>) -> Self {
        let settings = PlaybackSettings::default();
        sink.set_volume(settings.volume);
        Self {
            sink,
            fetcher,
            queue: Mutex::new(PlayQueue::new()),
            timing: Mutex::new(PlaybackTiming::default()),
            settings: Mutex::new(settings),
            load_generation: AtomicU64::new(0),
            source_loaded: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Selection & transport
    // ========================================================================

    /// Plays `index` out of `list`. When the selected track is already the
    /// current one this toggles pause instead; when the list is the queue's
    /// own source the existing queue order (including shuffle) is kept.
    pub async fn play_from_list(
        &self,
        list: Vec<Track>,
        index: usize,
        source_key: &str,
    ) -> Result<(), ApiError> {
        let selected_id = match list.get(index) {
            Some(track) => track.id,
            None => return Ok(()),
        };

        let to_start = {
            let mut queue = self.queue.lock().await;
            if queue.matches_source(source_key)
                && queue.current_track().map(|t| t.id) == Some(selected_id)
            {
                None
            } else if queue.matches_source(source_key) {
                match queue.position_of(selected_id) {
                    Some(pos) => queue.select_index(pos).cloned(),
                    // The source list changed since the queue was built.
                    None => {
                        let mut rng = rand::thread_rng();
                        queue.replace(list, index, source_key.to_string(), &mut rng);
                        queue.current_track().cloned()
                    }
                }
            } else {
                let mut rng = rand::thread_rng();
                queue.replace(list, index, source_key.to_string(), &mut rng);
                queue.current_track().cloned()
            }
        };

        match to_start {
            Some(track) => self.start_track(track).await,
            None => self.toggle_play().await,
        }
    }

    pub async fn toggle_play(&self) -> Result<(), ApiError> {
        let current = self.queue.lock().await.current_track().cloned();
        let track = match current {
            Some(track) => track,
            None => return Ok(()),
        };
        // After the queue runs out the current track stays selected but the
        // sink holds nothing; resuming starts it over instead of unpausing.
        if !self.source_loaded.load(Ordering::SeqCst) {
            return self.start_track(track).await;
        }
        let mut timing = self.timing.lock().await;
        let now_playing = !timing.is_playing;
        self.sink.set_paused(!now_playing);
        timing.set_playing(now_playing);
        Ok(())
    }

    pub async fn next_track(&self) -> Result<(), ApiError> {
        let transport = self.queue.lock().await.select_next();
        self.apply_transport(transport).await
    }

    pub async fn prev_track(&self) -> Result<(), ApiError> {
        let transport = self.queue.lock().await.select_prev();
        self.apply_transport(transport).await
    }

    /// Queue transition after the backend reports the current track finished.
    pub async fn handle_track_ended(&self) -> Result<(), ApiError> {
        let transport = self.queue.lock().await.handle_track_ended();
        self.apply_transport(transport).await
    }

    async fn apply_transport(&self, transport: Transport) -> Result<(), ApiError> {
        match transport {
            Transport::Advance(track) | Transport::Restart(track) => {
                self.start_track(track).await
            }
            Transport::Stop => {
                self.sink.stop();
                self.source_loaded.store(false, Ordering::SeqCst);
                *self.timing.lock().await = PlaybackTiming::default();
                Ok(())
            }
        }
    }

    async fn start_track(&self, track: Track) -> Result<(), ApiError> {
        let asset_id = match track.audio_asset {
            Some(id) => id,
            None => {
                self.source_loaded.store(false, Ordering::SeqCst);
                self.timing.lock().await.set_playing(false);
                return Err(ApiError::Validation(format!(
                    "\"{}\" has no playable audio",
                    track.title
                )));
            }
        };

        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.source_loaded.store(false, Ordering::SeqCst);
        let data = self.fetcher.fetch(asset_id).await?;
        if self.load_generation.load(Ordering::SeqCst) != generation {
            debug!(track_id = track.id, "load superseded, dropping audio");
            return Ok(());
        }

        info!(track_id = track.id, title = %track.title, "starting track");
        self.sink.load(data);
        self.source_loaded.store(true, Ordering::SeqCst);
        let volume = self.settings.lock().await.volume;
        self.sink.set_volume(volume);

        let mut timing = self.timing.lock().await;
        timing.position_ms = 0;
        timing.pending_seek_ms = None;
        timing.duration_ms = track.duration_secs.map(|s| s as u64 * 1000).unwrap_or(0);
        timing.is_playing = true;
        timing.last_update = Instant::now();
        Ok(())
    }

    // ========================================================================
    // Modes, seeking, volume
    // ========================================================================

    pub async fn toggle_shuffle(&self) {
        let shuffle = {
            let mut queue = self.queue.lock().await;
            let mut rng = rand::thread_rng();
            queue.toggle_shuffle(&mut rng);
            queue.shuffle
        };
        self.settings.lock().await.shuffle = shuffle;
    }

    pub async fn cycle_repeat(&self) {
        let repeat = {
            let mut queue = self.queue.lock().await;
            queue.cycle_repeat();
            queue.repeat
        };
        self.settings.lock().await.repeat = repeat;
    }

    /// Seek relative to the current position, clamped to the track bounds.
    /// While the duration is still unknown the target is recorded and the
    /// actual seek happens once metadata arrives.
    pub async fn seek_by(&self, delta_ms: i64) {
        if self.queue.lock().await.current_track().is_none() {
            return;
        }
        let mut timing = self.timing.lock().await;
        let duration = if timing.duration_ms > 0 {
            timing.duration_ms
        } else {
            self.sink.duration_ms()
        };
        let current = timing.current_position_ms() as i64;
        if duration == 0 {
            let target = current.saturating_add(delta_ms).max(0) as u64;
            timing.pending_seek_ms = Some(target);
            timing.position_ms = target;
            timing.last_update = Instant::now();
            return;
        }
        let target = (current + delta_ms).clamp(0, duration as i64) as u64;
        self.sink.seek_to(target);
        timing.position_ms = target;
        timing.last_update = Instant::now();
    }

    pub async fn change_volume(&self, delta: i8) {
        let mut settings = self.settings.lock().await;
        let volume = (settings.volume as i16 + delta as i16).clamp(0, 100) as u8;
        settings.volume = volume;
        if volume > 0 {
            settings.volume_before_mute = volume;
        }
        self.sink.set_volume(volume);
    }

    pub async fn toggle_mute(&self) {
        let mut settings = self.settings.lock().await;
        if settings.volume == 0 {
            settings.volume = settings.volume_before_mute;
        } else {
            settings.volume_before_mute = settings.volume;
            settings.volume = 0;
        }
        self.sink.set_volume(settings.volume);
    }

    // ========================================================================
    // Queue maintenance
    // ========================================================================

    /// Drops a track from the queue, stopping playback when it was the
    /// current one.
    pub async fn remove_track(&self, track_id: i64) -> RemoveOutcome {
        let outcome = self.queue.lock().await.remove_by_id(track_id);
        if outcome.was_current {
            self.load_generation.fetch_add(1, Ordering::SeqCst);
            self.sink.stop();
            self.source_loaded.store(false, Ordering::SeqCst);
            *self.timing.lock().await = PlaybackTiming::default();
        }
        outcome
    }

    /// Clears everything playback-related; used on logout.
    pub async fn reset(&self) {
        self.load_generation.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().await.reset();
        self.sink.stop();
        self.source_loaded.store(false, Ordering::SeqCst);
        *self.timing.lock().await = PlaybackTiming::default();
    }

    // ========================================================================
    // Backend feedback & snapshots
    // ========================================================================

    pub async fn update_position(&self, position_ms: u64, is_playing: bool) {
        let mut timing = self.timing.lock().await;
        if timing.duration_ms == 0 {
            timing.duration_ms = self.sink.duration_ms();
        }
        if timing.duration_ms > 0 {
            if let Some(target) = timing.pending_seek_ms.take() {
                let target = target.min(timing.duration_ms);
                self.sink.seek_to(target);
                timing.position_ms = target;
                timing.last_update = Instant::now();
                timing.is_playing = is_playing;
                return;
            }
        }
        timing.update_position(position_ms, is_playing);
    }

    pub async fn mark_rejected(&self) {
        self.source_loaded.store(false, Ordering::SeqCst);
        self.timing.lock().await.set_playing(false);
    }

    pub async fn playback_info(&self) -> PlaybackInfo {
        let track = self.queue.lock().await.current_track().cloned();
        let timing = self.timing.lock().await;
        let settings = self.settings.lock().await.clone();
        PlaybackInfo {
            track,
            progress_ms: timing.current_position_ms(),
            duration_ms: timing.duration_ms,
            is_playing: timing.is_playing,
            settings,
        }
    }

    /// `(current position, queue length)` for the status line, 1-based.
    pub async fn queue_summary(&self) -> Option<(usize, usize)> {
        let queue = self.queue.lock().await;
        queue.current_index().map(|i| (i + 1, queue.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeSink {
        commands: StdMutex<Vec<String>>,
        duration_ms: AtomicU64,
    }

    impl FakeSink {
        fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }

        fn push(&self, cmd: String) {
            self.commands.lock().unwrap().push(cmd);
        }
    }

    impl MediaSink for FakeSink {
        fn load(&self, data: Vec<u8>) {
            self.push(format!("load:{}", data.len()));
        }

        fn set_paused(&self, paused: bool) {
            self.push(format!("paused:{paused}"));
        }

        fn stop(&self) {
            self.push("stop".to_string());
        }

        fn seek_to(&self, position_ms: u64) {
            self.push(format!("seek:{position_ms}"));
        }

        fn set_volume(&self, percent: u8) {
            self.push(format!("volume:{percent}"));
        }

        fn duration_ms(&self) -> u64 {
            self.duration_ms.load(Ordering::Relaxed)
        }
    }

    struct FakeFetcher;

    impl AudioFetcher for FakeFetcher {
        fn fetch(&self, _asset_id: i64) -> BoxFuture<'_, Result<Vec<u8>, ApiError>> {
            Box::pin(async { Ok(vec![0u8; 16]) })
        }
    }

    fn track(id: i64, duration: u32) -> Track {
        Track {
            id,
            title: format!("track-{id}"),
            artist_name: "artist".to_string(),
            album_id: 1,
            duration_secs: Some(duration),
            cover_asset: None,
            audio_asset: Some(100 + id),
        }
    }

    fn player() -> (Player, Arc<FakeSink>) {
        let sink = Arc::new(FakeSink::default());
        let player = Player::new(sink.clone(), Arc::new(FakeFetcher));
        (player, sink)
    }

    #[tokio::test]
    async fn play_from_list_starts_playing() {
        let (player, sink) = player();
        player
            .play_from_list(vec![track(1, 10), track(2, 20)], 0, "all-songs")
            .await
            .unwrap();

        let info = player.playback_info().await;
        assert!(info.is_playing);
        assert_eq!(info.track.unwrap().id, 1);
        assert_eq!(info.duration_ms, 10_000);
        assert!(sink.commands().iter().any(|c| c.starts_with("load:")));
    }

    #[tokio::test]
    async fn selecting_current_track_toggles_pause() {
        let (player, sink) = player();
        let list = vec![track(1, 10), track(2, 20)];
        player.play_from_list(list.clone(), 0, "all-songs").await.unwrap();
        player.play_from_list(list, 0, "all-songs").await.unwrap();

        let info = player.playback_info().await;
        assert!(!info.is_playing);
        assert!(sink.commands().contains(&"paused:true".to_string()));
    }

    #[tokio::test]
    async fn selecting_other_track_in_same_source_switches() {
        let (player, _sink) = player();
        let list = vec![track(1, 10), track(2, 20)];
        player.play_from_list(list.clone(), 0, "all-songs").await.unwrap();
        player.play_from_list(list, 1, "all-songs").await.unwrap();

        let info = player.playback_info().await;
        assert!(info.is_playing);
        assert_eq!(info.track.unwrap().id, 2);
    }

    #[tokio::test]
    async fn seek_clamps_to_track_bounds() {
        let (player, sink) = player();
        player
            .play_from_list(vec![track(1, 10)], 0, "all-songs")
            .await
            .unwrap();

        player.seek_by(60_000).await;
        assert!(sink.commands().contains(&"seek:10000".to_string()));

        player.seek_by(-99_000).await;
        assert!(sink.commands().contains(&"seek:0".to_string()));
    }

    #[tokio::test]
    async fn resume_after_queue_end_restarts_current_track() {
        let (player, sink) = player();
        player
            .play_from_list(vec![track(1, 10)], 0, "all-songs")
            .await
            .unwrap();
        player.next_track().await.unwrap();

        let info = player.playback_info().await;
        assert!(!info.is_playing);
        assert_eq!(info.track.as_ref().unwrap().id, 1);

        player.toggle_play().await.unwrap();
        let info = player.playback_info().await;
        assert!(info.is_playing);
        assert_eq!(info.track.unwrap().id, 1);

        let loads = sink
            .commands()
            .iter()
            .filter(|c| c.starts_with("load:"))
            .count();
        assert_eq!(loads, 2);
    }

    #[tokio::test]
    async fn seek_before_duration_known_is_applied_later() {
        let (player, sink) = player();
        let mut unknown = track(1, 10);
        unknown.duration_secs = None;
        player
            .play_from_list(vec![unknown], 0, "all-songs")
            .await
            .unwrap();

        player.seek_by(5_000).await;
        assert!(!sink.commands().iter().any(|c| c.starts_with("seek:")));
        assert_eq!(player.playback_info().await.progress_ms, 5_000);

        sink.duration_ms.store(10_000, Ordering::Relaxed);
        player.update_position(0, true).await;
        assert!(sink.commands().contains(&"seek:5000".to_string()));
        assert_eq!(player.playback_info().await.duration_ms, 10_000);
    }

    #[tokio::test]
    async fn seek_without_track_is_ignored() {
        let (player, sink) = player();
        player.seek_by(5_000).await;
        assert!(!sink.commands().iter().any(|c| c.starts_with("seek:")));
    }

    #[tokio::test]
    async fn removing_current_track_goes_idle() {
        let (player, sink) = player();
        player
            .play_from_list(vec![track(1, 10), track(2, 20)], 0, "all-songs")
            .await
            .unwrap();

        let outcome = player.remove_track(1).await;
        assert!(outcome.removed);
        assert!(outcome.was_current);

        let info = player.playback_info().await;
        assert!(info.track.is_none());
        assert!(!info.is_playing);
        assert!(sink.commands().contains(&"stop".to_string()));
    }

    #[tokio::test]
    async fn track_without_audio_is_rejected() {
        let (player, _sink) = player();
        let mut silent = track(1, 10);
        silent.audio_asset = None;

        let result = player.play_from_list(vec![silent], 0, "all-songs").await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(!player.playback_info().await.is_playing);
    }

    #[tokio::test]
    async fn mute_round_trips_volume() {
        let (player, sink) = player();
        player.change_volume(-30).await; // 80 -> 50
        player.toggle_mute().await;
        assert_eq!(player.playback_info().await.settings.volume, 0);

        player.toggle_mute().await;
        assert_eq!(player.playback_info().await.settings.volume, 50);
        assert!(sink.commands().contains(&"volume:0".to_string()));
    }

    #[tokio::test]
    async fn reset_clears_queue_and_playback() {
        let (player, _sink) = player();
        player
            .play_from_list(vec![track(1, 10)], 0, "all-songs")
            .await
            .unwrap();
        player.reset().await;

        let info = player.playback_info().await;
        assert!(info.track.is_none());
        assert!(!info.is_playing);
        assert_eq!(player.queue_summary().await, None);
    }
}
