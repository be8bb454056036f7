//! Playback-related types and state management

use std::time::Instant;

use super::catalog::Track;
use super::queue::RepeatMode;

pub const DEFAULT_VOLUME_PERCENT: u8 = 80;

/// Internal timing state for smooth progress bar updates
#[derive(Clone)]
pub struct PlaybackTiming {
    pub position_ms: u64,
    pub last_update: Instant,
    pub is_playing: bool,
    pub duration_ms: u64,
    /// Seek requested while the duration was still unknown; applied once
    /// the backend reports metadata.
    pub pending_seek_ms: Option<u64>,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            position_ms: 0,
            last_update: Instant::now(),
            is_playing: false,
            duration_ms: 0,
            pending_seek_ms: None,
        }
    }
}

impl PlaybackTiming {
    pub fn current_position_ms(&self) -> u64 {
        if self.is_playing && self.duration_ms > 0 {
            let elapsed = self.last_update.elapsed().as_millis() as u64;
            self.position_ms
                .saturating_add(elapsed)
                .min(self.duration_ms)
        } else if self.duration_ms > 0 {
            self.position_ms.min(self.duration_ms)
        } else {
            self.position_ms
        }
    }

    pub fn update_position(&mut self, new_position_ms: u64, is_playing: bool) {
        let current_calculated = self.current_position_ms();
        let diff = new_position_ms as i64 - current_calculated as i64;

        let state_changed = self.is_playing != is_playing;
        let significant_jump = diff.abs() > 2000;
        let was_paused = !self.is_playing;
        let acceptable_sync = diff >= -100;

        if state_changed || significant_jump || was_paused || acceptable_sync {
            self.position_ms = new_position_ms;
            self.last_update = Instant::now();
        }
        self.is_playing = is_playing;
    }

    pub fn set_playing(&mut self, is_playing: bool) {
        self.position_ms = self.current_position_ms();
        self.is_playing = is_playing;
        self.last_update = Instant::now();
    }
}

/// Settings related to playback (shuffle, repeat, volume)
#[derive(Clone, Debug)]
pub struct PlaybackSettings {
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub volume: u8,
    /// Volume before the last mute, restored by the mute toggle.
    pub volume_before_mute: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat: RepeatMode::Off,
            volume: DEFAULT_VOLUME_PERCENT,
            volume_before_mute: DEFAULT_VOLUME_PERCENT,
        }
    }
}

/// Complete playback information for rendering the UI
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub track: Option<Track>,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub is_playing: bool,
    pub settings: PlaybackSettings,
}
