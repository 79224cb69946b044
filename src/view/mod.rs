//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, sidebar)
//! - `content`: Main content area rendering
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (error, forms, confirmations, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, ContentView, PlaybackInfo, UiState};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackInfo,
        ui_state: &UiState,
        content_state: &ContentState,
        liked: &HashSet<String>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Route + user
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state);

        if let ContentView::Auth { form } = &content_state.view {
            overlays::render_auth_screen(frame, chunks[1], form);
        } else {
            let main_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(25), // Sidebar (Navigation + Playlists)
                    Constraint::Percentage(75), // Main content
                ])
                .split(chunks[1]);

            layout::render_sidebar(frame, main_chunks[0], ui_state);
            content::render_main_content(frame, main_chunks[1], ui_state, content_state, playback, liked);
        }

        // Bottom: Progress bar with track info and controls
        progress::render_progress_bar(frame, chunks[2], playback, ui_state);

        if let Some(form) = &ui_state.overlay_form {
            overlays::render_form_popup(frame, form);
        }

        if let Some(picker) = &ui_state.playlist_picker {
            overlays::render_playlist_picker(frame, ui_state, picker.selected);
        }

        if let Some(confirm) = &ui_state.confirm {
            overlays::render_confirm(frame, &confirm.prompt());
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }
    }
}
