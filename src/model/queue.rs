//! Play queue state machine: ordering, shuffle, repeat, removal
//!
//! The queue is a snapshot of whichever source list started playback; later
//! mutations to the source never reorder a queue that is already playing.
//! All transitions here are pure so the transport rules can be tested
//! without an audio device.

use rand::Rng;

use super::catalog::Track;

/// Repeat mode, cycled `Off → All → One → Off`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// What the transport layer must do after a queue transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Transport {
    /// Load and play this track from position zero.
    Advance(Track),
    /// Restart the current track from position zero (repeat-one).
    Restart(Track),
    /// Stop playback; the current index is unchanged.
    Stop,
}

/// Outcome of removing a track from the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: bool,
    pub was_current: bool,
}

/// Ordered play queue with a distinguished current index.
///
/// Invariants: `current` is `None` exactly when there is no current track,
/// otherwise a valid index into `tracks`; enabling shuffle keeps the
/// currently playing track at position 0 of the reshuffled order.
#[derive(Clone, Debug, Default)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    /// Pre-shuffle order, kept while shuffle is enabled so disabling it
    /// restores the queue exactly.
    unshuffled: Option<Vec<Track>>,
    current: Option<usize>,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    /// Identity of the source list this queue was built from, used to decide
    /// whether a "play this list" request targets the active queue.
    source_key: Option<String>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn matches_source(&self, source_key: &str) -> bool {
        self.source_key.as_deref() == Some(source_key)
    }

    pub fn position_of(&self, track_id: i64) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track_id)
    }

    /// Install a new queue from a source list snapshot and select `index`.
    /// If shuffle is enabled the new queue is shuffled with the selected
    /// track moved to the front.
    pub fn replace<R: Rng>(
        &mut self,
        tracks: Vec<Track>,
        index: usize,
        source_key: String,
        rng: &mut R,
    ) {
        self.tracks = tracks;
        self.unshuffled = None;
        self.source_key = Some(source_key);
        self.current = if self.tracks.is_empty() {
            None
        } else {
            Some(index.min(self.tracks.len() - 1))
        };

        if self.shuffle && !self.tracks.is_empty() {
            self.shuffle_keeping_current(rng);
        }
    }

    /// Jump directly to a position within the active queue.
    pub fn select_index(&mut self, index: usize) -> Option<&Track> {
        if index < self.tracks.len() {
            self.current = Some(index);
            self.current_track()
        } else {
            None
        }
    }

    /// Manual skip forward. Cancels repeat-one as a side effect.
    pub fn select_next(&mut self) -> Transport {
        if self.repeat == RepeatMode::One {
            self.repeat = RepeatMode::Off;
        }
        self.advance()
    }

    /// Manual skip backward. Cancels repeat-one as a side effect.
    pub fn select_prev(&mut self) -> Transport {
        if self.repeat == RepeatMode::One {
            self.repeat = RepeatMode::Off;
        }
        let Some(current) = self.current else {
            return Transport::Stop;
        };
        if current > 0 {
            self.current = Some(current - 1);
            Transport::Advance(self.tracks[current - 1].clone())
        } else if self.repeat == RepeatMode::All && !self.tracks.is_empty() {
            let last = self.tracks.len() - 1;
            self.current = Some(last);
            Transport::Advance(self.tracks[last].clone())
        } else {
            Transport::Stop
        }
    }

    /// Natural end of track. Repeat-one restarts the same track without
    /// changing the index; otherwise this behaves exactly like a manual
    /// skip forward (without cancelling repeat-one).
    pub fn handle_track_ended(&mut self) -> Transport {
        if self.repeat == RepeatMode::One {
            return match self.current_track() {
                Some(track) => Transport::Restart(track.clone()),
                None => Transport::Stop,
            };
        }
        self.advance()
    }

    fn advance(&mut self) -> Transport {
        let Some(current) = self.current else {
            return Transport::Stop;
        };
        if current + 1 < self.tracks.len() {
            self.current = Some(current + 1);
            Transport::Advance(self.tracks[current + 1].clone())
        } else if self.repeat == RepeatMode::All && !self.tracks.is_empty() {
            self.current = Some(0);
            Transport::Advance(self.tracks[0].clone())
        } else {
            // End of queue: stop without advancing past the last index.
            Transport::Stop
        }
    }

    /// Toggle shuffle. Enabling generates a uniform permutation and swaps
    /// the current track into position 0; disabling restores the exact
    /// pre-shuffle order. The current *track* never changes, only its
    /// position.
    pub fn toggle_shuffle<R: Rng>(&mut self, rng: &mut R) {
        if self.shuffle {
            self.shuffle = false;
            let current_id = self.current_track().map(|t| t.id);
            if let Some(original) = self.unshuffled.take() {
                self.tracks = original;
            }
            self.current = current_id.and_then(|id| self.position_of(id));
        } else {
            self.shuffle = true;
            if !self.tracks.is_empty() {
                self.shuffle_keeping_current(rng);
            }
        }
    }

    fn shuffle_keeping_current<R: Rng>(&mut self, rng: &mut R) {
        self.unshuffled = Some(self.tracks.clone());
        let current_id = self.current_track().map(|t| t.id);

        // Fisher-Yates, last-to-first.
        for i in (1..self.tracks.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.tracks.swap(i, j);
        }

        if let Some(id) = current_id {
            if let Some(pos) = self.position_of(id) {
                self.tracks.swap(0, pos);
            }
            self.current = Some(0);
        }
    }

    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.cycle();
    }

    /// Remove a track wherever it appears (active and pre-shuffle orders),
    /// fixing up the current index.
    pub fn remove_by_id(&mut self, track_id: i64) -> RemoveOutcome {
        let Some(pos) = self.position_of(track_id) else {
            return RemoveOutcome {
                removed: false,
                was_current: false,
            };
        };
        let was_current = self.current == Some(pos);
        self.tracks.remove(pos);
        if let Some(original) = self.unshuffled.as_mut() {
            original.retain(|t| t.id != track_id);
        }

        self.current = if was_current {
            None
        } else {
            self.current.map(|c| if c > pos { c - 1 } else { c })
        };
        RemoveOutcome {
            removed: true,
            was_current,
        }
    }

    /// Drop the current selection without touching the queue contents.
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Forget everything (logout).
    pub fn reset(&mut self) {
        *self = PlayQueue {
            repeat: RepeatMode::Off,
            shuffle: false,
            ..PlayQueue::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn track(id: i64, duration: u32) -> Track {
        Track {
            id,
            title: format!("track-{}", id),
            artist_name: "artist".into(),
            album_id: 1,
            duration_secs: Some(duration),
            cover_asset: None,
            audio_asset: Some(id + 1000),
        }
    }

    fn queue_of(n: i64) -> PlayQueue {
        let mut q = PlayQueue::new();
        let tracks: Vec<Track> = (0..n).map(|i| track(i, 180)).collect();
        let mut rng = StdRng::seed_from_u64(1);
        q.replace(tracks, 0, "test".into(), &mut rng);
        q
    }

    #[test]
    fn replace_selects_requested_index() {
        let mut q = PlayQueue::new();
        let tracks: Vec<Track> = (0..5).map(|i| track(i, 60)).collect();
        let mut rng = StdRng::seed_from_u64(1);
        q.replace(tracks.clone(), 3, "list".into(), &mut rng);
        assert_eq!(q.current_track().unwrap().id, tracks[3].id);
        assert!(q.matches_source("list"));
    }

    #[test]
    fn shuffle_toggle_restores_exact_order() {
        let mut q = queue_of(10);
        let original: Vec<i64> = q.tracks().iter().map(|t| t.id).collect();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..3 {
            q.toggle_shuffle(&mut rng);
            q.toggle_shuffle(&mut rng);
            let restored: Vec<i64> = q.tracks().iter().map(|t| t.id).collect();
            assert_eq!(restored, original);
        }
    }

    #[test]
    fn shuffle_keeps_current_track_at_position_zero() {
        let mut q = queue_of(20);
        q.select_index(7);
        let current_id = q.current_track().unwrap().id;

        let mut rng = StdRng::seed_from_u64(42);
        q.toggle_shuffle(&mut rng);

        assert_eq!(q.current_index(), Some(0));
        assert_eq!(q.tracks()[0].id, current_id);
        assert_eq!(q.current_track().unwrap().id, current_id);
    }

    #[test]
    fn disabling_shuffle_keeps_current_track_identity() {
        let mut q = queue_of(20);
        q.select_index(7);
        let mut rng = StdRng::seed_from_u64(9);
        q.toggle_shuffle(&mut rng);

        // Advance a few positions inside the shuffled order
        q.select_next();
        q.select_next();
        let current_id = q.current_track().unwrap().id;

        q.toggle_shuffle(&mut rng);
        assert_eq!(q.current_track().unwrap().id, current_id);
    }

    #[test]
    fn repeat_all_wraps_after_exactly_queue_length_skips() {
        let mut q = queue_of(4);
        q.repeat = RepeatMode::All;
        let start = q.current_track().unwrap().id;

        for _ in 0..4 {
            assert!(matches!(q.select_next(), Transport::Advance(_)));
        }
        assert_eq!(q.current_track().unwrap().id, start);
    }

    #[test]
    fn next_on_last_with_repeat_off_stops_without_moving() {
        let mut q = queue_of(3);
        q.select_index(2);
        assert_eq!(q.select_next(), Transport::Stop);
        assert_eq!(q.current_index(), Some(2));
    }

    #[test]
    fn natural_end_with_repeat_one_restarts_same_index() {
        let mut q = queue_of(3);
        q.select_index(1);
        q.repeat = RepeatMode::One;

        for _ in 0..50 {
            match q.handle_track_ended() {
                Transport::Restart(t) => assert_eq!(t.id, 1),
                other => panic!("expected restart, got {:?}", other),
            }
            assert_eq!(q.current_index(), Some(1));
        }
    }

    #[test]
    fn manual_next_cancels_repeat_one() {
        let mut q = queue_of(3);
        q.repeat = RepeatMode::One;
        q.select_next();
        assert_eq!(q.repeat, RepeatMode::Off);
    }

    #[test]
    fn natural_end_without_repeat_behaves_like_next() {
        let mut q = queue_of(3);
        assert!(matches!(q.handle_track_ended(), Transport::Advance(t) if t.id == 1));
        q.select_index(2);
        assert_eq!(q.handle_track_ended(), Transport::Stop);
    }

    #[test]
    fn example_scenario_wraps_to_first_track() {
        // Queue [A(3s), B(4s), C(5s)], shuffle off, repeat all.
        let mut q = PlayQueue::new();
        let tracks = vec![track(0, 3), track(1, 4), track(2, 5)];
        let mut rng = StdRng::seed_from_u64(1);
        q.replace(tracks, 0, "test".into(), &mut rng);
        q.repeat = RepeatMode::All;

        q.select_next(); // B
        q.select_next(); // C
        q.select_next(); // wraps to A
        assert_eq!(q.current_track().unwrap().id, 0);
    }

    #[test]
    fn removing_current_track_clears_selection() {
        let mut q = queue_of(3);
        q.select_index(1);
        let outcome = q.remove_by_id(1);
        assert!(outcome.removed && outcome.was_current);
        assert_eq!(q.current_index(), None);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn removing_other_track_keeps_current() {
        let mut q = queue_of(3);
        q.select_index(2);
        let outcome = q.remove_by_id(0);
        assert!(outcome.removed && !outcome.was_current);
        // Index shifts down but still points at the same track
        assert_eq!(q.current_track().unwrap().id, 2);
    }

    #[test]
    fn removal_also_updates_preshuffle_order() {
        let mut q = queue_of(5);
        let mut rng = StdRng::seed_from_u64(3);
        q.toggle_shuffle(&mut rng);
        q.remove_by_id(3);
        q.toggle_shuffle(&mut rng);
        assert!(q.tracks().iter().all(|t| t.id != 3));
        assert_eq!(q.len(), 4);
    }

    #[test]
    fn prev_at_start_with_repeat_all_wraps_to_last() {
        let mut q = queue_of(3);
        q.repeat = RepeatMode::All;
        assert!(matches!(q.select_prev(), Transport::Advance(t) if t.id == 2));
    }

    #[test]
    fn repeat_cycles_off_all_one() {
        let mut q = PlayQueue::new();
        assert_eq!(q.repeat, RepeatMode::Off);
        q.cycle_repeat();
        assert_eq!(q.repeat, RepeatMode::All);
        q.cycle_repeat();
        assert_eq!(q.repeat, RepeatMode::One);
        q.cycle_repeat();
        assert_eq!(q.repeat, RepeatMode::Off);
    }
}
