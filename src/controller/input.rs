//! Key event handling

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, ContentView, Route, SelectedItem};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            model.set_should_quit(true).await;
            return Ok(());
        }

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
                drop(model);
                self.player.clear_error().await;
            }
            return Ok(());
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('?')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        if model.has_confirm().await {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    drop(model);
                    self.confirm_pending().await;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    model.set_confirm(None).await;
                }
                _ => {}
            }
            return Ok(());
        }

        if model.is_playlist_picker_open().await {
            match key.code {
                KeyCode::Up => model.playlist_picker_move(false).await,
                KeyCode::Down => model.playlist_picker_move(true).await,
                KeyCode::Enter => {
                    drop(model);
                    self.add_to_chosen_playlist().await;
                }
                KeyCode::Esc => model.close_playlist_picker().await,
                _ => {}
            }
            return Ok(());
        }

        if model.has_overlay_form().await {
            if key.code == KeyCode::Esc {
                model.close_overlay_form().await;
                return Ok(());
            }
            drop(model);
            self.handle_form_key(key).await;
            return Ok(());
        }

        let route = model.current_route().await;
        if route.is_auth_screen() {
            drop(model);
            self.handle_auth_key(key, route).await;
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        // Handle search input when the search screen has focus
        if ui_state.active_section == ActiveSection::MainContent && route == Route::Search {
            let debounce = Duration::from_millis(self.settings.ui.search_debounce_ms);
            match key.code {
                KeyCode::Tab => {
                    model.cycle_section_forward().await;
                    return Ok(());
                }
                KeyCode::BackTab => {
                    model.cycle_section_backward().await;
                    return Ok(());
                }
                KeyCode::Left | KeyCode::Right => {
                    let forward = key.code == KeyCode::Right;
                    model
                        .with_view(|view| {
                            if let ContentView::Search { tab, .. } = view {
                                *tab = if forward { tab.next() } else { tab.prev() };
                            }
                        })
                        .await;
                    drop(model);
                    self.perform_search().await;
                    return Ok(());
                }
                KeyCode::Up => {
                    model.content_move_up().await;
                    return Ok(());
                }
                KeyCode::Down => {
                    model.content_move_down(0).await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    if let Some(item) = selected {
                        self.handle_selected_item(item).await;
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    let had_query = model
                        .with_view(|view| match view {
                            ContentView::Search { query, .. } if !query.is_empty() => {
                                query.clear();
                                true
                            }
                            _ => false,
                        })
                        .await;
                    if had_query {
                        model.schedule_search(Duration::ZERO).await;
                    } else {
                        drop(model);
                        self.navigate_back().await;
                    }
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model
                        .with_view(|view| {
                            if let ContentView::Search { query, .. } = view {
                                query.pop();
                            }
                        })
                        .await;
                    model.schedule_search(debounce).await;
                    return Ok(());
                }
                KeyCode::Char(c) if !ctrl => {
                    model
                        .with_view(|view| {
                            if let ContentView::Search { query, .. } = view {
                                query.push(c);
                            }
                        })
                        .await;
                    model.schedule_search(debounce).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle MainContent section navigation
        if ui_state.active_section == ActiveSection::MainContent {
            match key.code {
                KeyCode::Up => {
                    model.content_move_up().await;
                    return Ok(());
                }
                KeyCode::Down => {
                    drop(model);
                    let queue_len = self.player.queue_len().await;
                    self.model.lock().await.content_move_down(queue_len).await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    if let Some(item) = selected {
                        self.handle_selected_item(item).await;
                    }
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    drop(model);
                    self.navigate_back().await;
                    return Ok(());
                }
                KeyCode::Char('t') => {
                    model.toggle_detail_focus().await;
                    return Ok(());
                }
                KeyCode::Char('x') => {
                    drop(model);
                    self.toggle_like_selected().await;
                    return Ok(());
                }
                KeyCode::Char('X') => {
                    drop(model);
                    self.toggle_like_playlist().await;
                    return Ok(());
                }
                KeyCode::Char('k') | KeyCode::Char('K') => {
                    drop(model);
                    self.add_selected_to_queue().await;
                    return Ok(());
                }
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    drop(model);
                    self.open_playlist_picker().await;
                    return Ok(());
                }
                KeyCode::Char('i') | KeyCode::Char('I') => {
                    drop(model);
                    self.open_selected_song().await;
                    return Ok(());
                }
                KeyCode::Char('w') | KeyCode::Char('W') => {
                    drop(model);
                    self.download_selected().await;
                    return Ok(());
                }
                KeyCode::Char('c') => {
                    drop(model);
                    if route == Route::Playlists {
                        self.open_create_playlist_form().await;
                    } else {
                        self.open_comment_form().await;
                    }
                    return Ok(());
                }
                KeyCode::Char('e') | KeyCode::Char('E') => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    match selected {
                        Some(SelectedItem::Comment { comment }) => {
                            self.edit_comment(comment).await;
                        }
                        _ => self.open_edit_playlist_form().await,
                    }
                    return Ok(());
                }
                KeyCode::Char('u') if ctrl => {
                    drop(model);
                    self.open_upload_form().await;
                    return Ok(());
                }
                KeyCode::Char('C') if route == Route::Queue => {
                    drop(model);
                    self.clear_queue().await;
                    return Ok(());
                }
                KeyCode::Delete | KeyCode::Char('d') | KeyCode::Char('D') => {
                    drop(model);
                    if route == Route::Queue {
                        self.remove_selected_from_queue().await;
                    } else {
                        self.request_delete().await;
                    }
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                model.cycle_section_forward().await;
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
            }
            KeyCode::Esc => {
                model.set_active_section(ActiveSection::MainContent).await;
            }
            KeyCode::Enter => match ui_state.active_section {
                ActiveSection::Navigation => {
                    if let Some(route) = model.get_selected_nav_route().await {
                        drop(model);
                        self.navigate(route).await;
                    }
                }
                ActiveSection::Playlists => {
                    if let Some(playlist) = model.get_selected_playlist().await {
                        drop(model);
                        self.navigate(Route::Playlist(playlist.id)).await;
                    }
                }
                ActiveSection::MainContent => {}
            },
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_track().await;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_track().await;
            }
            KeyCode::Left => {
                drop(model);
                self.seek(false).await;
            }
            KeyCode::Right => {
                drop(model);
                self.seek(true).await;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                drop(model);
                self.toggle_shuffle().await;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                drop(model);
                self.cycle_repeat().await;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.volume_up().await;
            }
            KeyCode::Char('-') => {
                drop(model);
                self.volume_down().await;
            }
            // Focus search
            KeyCode::Char('g') | KeyCode::Char('G') | KeyCode::Char('/') => {
                drop(model);
                self.navigate(Route::Search).await;
            }
            // Focus playlists
            KeyCode::Char('l') | KeyCode::Char('L') => {
                model.set_active_section(ActiveSection::Playlists).await;
            }
            // Show queue
            KeyCode::Char('u') | KeyCode::Char('U') => {
                drop(model);
                self.navigate(Route::Queue).await;
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                drop(model);
                self.logout().await;
            }
            // Show help popup
            KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_form_key(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_form().await,
            KeyCode::Tab | KeyCode::Down => {
                self.with_active_form(|form| form.focus_next()).await;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.with_active_form(|form| form.focus_prev()).await;
            }
            KeyCode::Backspace => {
                self.with_active_form(|form| form.pop_char()).await;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.with_active_form(|form| form.push_char(c)).await;
            }
            _ => {}
        }
    }

    /// Login, register and password screens: the form plus switching between them
    async fn handle_auth_key(&self, key: KeyEvent, route: Route) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            let target = match key.code {
                KeyCode::Char('l') => Some(Route::Login),
                KeyCode::Char('r') => Some(Route::Register),
                KeyCode::Char('f') => Some(Route::ForgotPassword),
                _ => None,
            };
            if let Some(target) = target
                && target != route
            {
                self.show_route(target).await;
            }
            return;
        }
        if key.code == KeyCode::Esc {
            if route == Route::Login {
                self.model.lock().await.set_should_quit(true).await;
            } else {
                self.show_route(Route::Login).await;
            }
            return;
        }
        self.handle_form_key(key).await;
    }
}
