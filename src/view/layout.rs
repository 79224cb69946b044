//! Layout rendering (top bar, sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, UiState};
use super::utils::border_style;

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Current route
            Constraint::Length(28), // Signed-in user
        ])
        .split(area);

    let location = Paragraph::new(ui_state.route.path())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tunestream ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(location, chunks[0]);

    let (user_text, user_style) = match &ui_state.user_name {
        Some(name) => (format!("👤 {}", name), Style::default().fg(Color::Cyan)),
        None => ("Not signed in".to_string(), Style::default().fg(Color::DarkGray)),
    };
    let user = Paragraph::new(user_text)
        .style(user_style)
        .block(Block::default().borders(Borders::ALL).title(" User "));
    frame.render_widget(user, chunks[1]);
}

fn sidebar_style(is_selected: bool, is_focused: bool) -> Style {
    if is_selected && is_focused {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let nav_height = ui_state.nav_items.len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(nav_height), // Navigation items + borders
            Constraint::Min(0),             // Playlists (fills remaining space)
        ])
        .split(area);

    let nav_focused = ui_state.active_section == ActiveSection::Navigation;
    let nav_items: Vec<ListItem> = ui_state
        .nav_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let is_current = item.route == ui_state.route;
            let marker = if is_current { "● " } else { "  " };
            ListItem::new(format!("{}{}", marker, item.name))
                .style(sidebar_style(i == ui_state.nav_selected, nav_focused))
        })
        .collect();

    let navigation = List::new(nav_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Browse ")
            .padding(Padding::horizontal(1))
            .border_style(border_style(nav_focused)),
    );
    frame.render_widget(navigation, chunks[0]);

    let playlists_focused = ui_state.active_section == ActiveSection::Playlists;
    let playlist_items: Vec<ListItem> = if ui_state.playlists.is_empty() {
        vec![ListItem::new("No playlists yet").style(Style::default().fg(Color::DarkGray))]
    } else {
        ui_state
            .playlists
            .iter()
            .enumerate()
            .map(|(i, item)| {
                ListItem::new(item.name.clone())
                    .style(sidebar_style(i == ui_state.playlist_selected, playlists_focused))
            })
            .collect()
    };

    let playlists = List::new(playlist_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Playlists ")
                .padding(Padding::horizontal(1))
                .border_style(border_style(playlists_focused)),
        )
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.playlist_selected));

    frame.render_stateful_widget(playlists, chunks[1], &mut list_state);
}
