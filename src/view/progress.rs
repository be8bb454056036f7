//! Player bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use super::utils::format_duration;
use crate::model::{PlaybackInfo, RepeatMode};

pub fn render_player_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let status_text = match &playback.track {
        None => " No track playing".to_string(),
        Some(track) if playback.is_playing => {
            format!(" ▶ {} | {}", track.title, track.artist_name)
        }
        Some(track) => format!(" ⏸ {} | {}", track.title, track.artist_name),
    };

    let shuffle_text = if playback.settings.shuffle {
        "Shuffle: On"
    } else {
        "Shuffle: Off"
    };
    let repeat_text = match playback.settings.repeat {
        RepeatMode::Off => "Repeat: Off",
        RepeatMode::All => "Repeat: All",
        RepeatMode::One => "Repeat: One",
    };
    let volume_text = if playback.settings.volume == 0 {
        "Vol: muted".to_string()
    } else {
        format!("Vol: {}%", playback.settings.volume)
    };

    let time_str = format!(
        "{} / {}",
        format_duration(playback.progress_ms),
        format_duration(playback.duration_ms)
    );

    let progress_ratio = if playback.duration_ms > 0 {
        (playback.progress_ms as f64 / playback.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let title = format!("{} ", status_text);
    let controls_info = format!(" {} | {} | {} ", shuffle_text, repeat_text, volume_text);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
