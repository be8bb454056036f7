//! Audio output backed by rodio
//!
//! The OS audio stream is not `Send`, so a dedicated thread owns it and the
//! rest of the application talks to it through a command channel. Progress
//! flows back through a [`PlayerEvent`] channel; the decoded duration is
//! shared through an atomic.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStreamBuilder, Sink, Source};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Events emitted by the audio backend towards the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    PositionChanged { position_ms: u64, is_playing: bool },
    TrackEnded,
    /// The backend could not start the requested track.
    PlaybackRejected { message: String },
}

/// Abstraction over the audio output so the playback engine can be tested
/// without an audio device.
pub trait MediaSink: Send + Sync {
    /// Decode and start playing `data` from position zero.
    fn load(&self, data: Vec<u8>);
    fn set_paused(&self, paused: bool);
    fn stop(&self);
    fn seek_to(&self, position_ms: u64);
    /// Volume in percent, 0..=100.
    fn set_volume(&self, percent: u8);
    /// Duration of the loaded track, 0 while unknown.
    fn duration_ms(&self) -> u64;
}

/// No-op sink used when the host has no usable audio output, so the rest
/// of the UI stays functional.
pub struct NullSink;

impl MediaSink for NullSink {
    fn load(&self, _data: Vec<u8>) {}
    fn set_paused(&self, _paused: bool) {}
    fn stop(&self) {}
    fn seek_to(&self, _position_ms: u64) {}
    fn set_volume(&self, _percent: u8) {}
    fn duration_ms(&self) -> u64 {
        0
    }
}

enum SinkCommand {
    Load(Vec<u8>),
    SetPaused(bool),
    Stop,
    Seek(u64),
    SetVolume(u8),
}

/// rodio-backed [`MediaSink`] running on its own thread.
pub struct RodioSink {
    tx: mpsc::Sender<SinkCommand>,
    duration_ms: Arc<AtomicU64>,
}

const TICK: Duration = Duration::from_millis(100);

impl RodioSink {
    /// Opens the default output device. Fails when the host has no usable
    /// audio output.
    pub fn new(events: UnboundedSender<PlayerEvent>) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel::<SinkCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), String>>();
        let duration_ms = Arc::new(AtomicU64::new(0));

        let duration = Arc::clone(&duration_ms);
        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let stream = match OutputStreamBuilder::from_default_device()
                    .and_then(|b| b.open_stream_or_fallback())
                {
                    Ok(stream) => {
                        let _ = init_tx.send(Ok(()));
                        stream
                    }
                    Err(err) => {
                        let _ = init_tx.send(Err(err.to_string()));
                        return;
                    }
                };
                let sink = Sink::connect_new(stream.mixer());
                audio_loop(stream, sink, rx, events, duration);
            })?;

        init_rx
            .recv()
            .map_err(|_| anyhow::anyhow!("audio thread exited during startup"))?
            .map_err(|msg| anyhow::anyhow!("failed to open audio output: {msg}"))?;

        Ok(Self { tx, duration_ms })
    }

    fn send(&self, command: SinkCommand) {
        // The audio thread only exits when this sender is dropped.
        let _ = self.tx.send(command);
    }
}

impl MediaSink for RodioSink {
    fn load(&self, data: Vec<u8>) {
        self.send(SinkCommand::Load(data));
    }

    fn set_paused(&self, paused: bool) {
        self.send(SinkCommand::SetPaused(paused));
    }

    fn stop(&self) {
        self.send(SinkCommand::Stop);
    }

    fn seek_to(&self, position_ms: u64) {
        self.send(SinkCommand::Seek(position_ms));
    }

    fn set_volume(&self, percent: u8) {
        self.send(SinkCommand::SetVolume(percent));
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms.load(Ordering::Relaxed)
    }
}

fn audio_loop(
    stream: rodio::OutputStream,
    mut sink: Sink,
    rx: mpsc::Receiver<SinkCommand>,
    events: UnboundedSender<PlayerEvent>,
    duration: Arc<AtomicU64>,
) {
    let mut track_loaded = false;
    let mut volume_percent: u8 = 100;

    loop {
        match rx.recv_timeout(TICK) {
            Ok(SinkCommand::Load(data)) => {
                // Replace the sink so stale samples never bleed into the
                // next track.
                sink.stop();
                sink = Sink::connect_new(stream.mixer());
                sink.set_volume(volume_percent as f32 / 100.0);

                match Decoder::new(Cursor::new(data)) {
                    Ok(source) => {
                        let total = source
                            .total_duration()
                            .map(|d| d.as_millis() as u64)
                            .unwrap_or(0);
                        duration.store(total, Ordering::Relaxed);
                        sink.append(source);
                        sink.play();
                        track_loaded = true;
                        debug!(duration_ms = total, "track loaded");
                    }
                    Err(err) => {
                        track_loaded = false;
                        duration.store(0, Ordering::Relaxed);
                        let _ = events.send(PlayerEvent::PlaybackRejected {
                            message: format!("cannot decode audio: {err}"),
                        });
                    }
                }
            }
            Ok(SinkCommand::SetPaused(paused)) => {
                if paused {
                    sink.pause();
                } else {
                    sink.play();
                }
            }
            Ok(SinkCommand::Stop) => {
                sink.stop();
                track_loaded = false;
                duration.store(0, Ordering::Relaxed);
            }
            Ok(SinkCommand::Seek(target_ms)) => {
                if track_loaded {
                    if let Err(err) = sink.try_seek(Duration::from_millis(target_ms)) {
                        warn!(target_ms, error = %err, "seek failed");
                    }
                }
            }
            Ok(SinkCommand::SetVolume(percent)) => {
                volume_percent = percent.min(100);
                sink.set_volume(volume_percent as f32 / 100.0);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if track_loaded {
            if sink.empty() {
                track_loaded = false;
                if events.send(PlayerEvent::TrackEnded).is_err() {
                    break;
                }
            } else {
                let pos = sink.get_pos().as_millis() as u64;
                if events
                    .send(PlayerEvent::PositionChanged {
                        position_ms: pos,
                        is_playing: !sink.is_paused(),
                    })
                    .is_err()
                {
                    break;
                }
            }
        }
    }
}
