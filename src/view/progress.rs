//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackInfo, UiState};
use super::utils::format_duration;

pub fn render_progress_bar(
    frame: &mut Frame,
    area: Rect,
    playback: &PlaybackInfo,
    ui_state: &UiState,
) {
    let status_text = match &playback.track {
        None => " No track playing".to_string(),
        Some(track) => {
            let icon = if playback.is_playing { " ▶" } else { "⏸ " };
            format!("{} {} | {} ({})", icon, track.name(), track.artist(), track.album())
        }
    };

    let shuffle_text = if playback.shuffle { "Shuffle: On" } else { "Shuffle: Off" };
    let repeat_text = format!("Repeat: {}", playback.repeat.label());
    let volume_text = format!("Vol: {}%", (playback.volume * 100.0).round() as u32);
    let queue_text = if playback.queue.is_empty() {
        "Queue: empty".to_string()
    } else {
        format!("Queue: {}/{}", playback.position + 1, playback.queue.len())
    };

    let time_str = format!(
        "{} / {}",
        format_duration(playback.elapsed),
        format_duration(playback.duration)
    );

    let progress_ratio = if !playback.duration.is_zero() {
        (playback.elapsed.as_secs_f64() / playback.duration.as_secs_f64()).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let title = format!("{} ", status_text);
    let controls_info = format!(
        " {} | {} | {} | {} ",
        queue_text, shuffle_text, repeat_text, volume_text
    );

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(Line::from(controls_info).right_aligned());
    if let Some(info) = &ui_state.info_message {
        block = block.title_bottom(
            Line::from(format!(" {} ", info))
                .left_aligned()
                .style(Style::default().fg(Color::Yellow)),
        );
    }

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
