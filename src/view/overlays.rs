//! Overlay rendering (error notification, forms, confirmations, playlist picker, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{Form, FormKind, UiState};
use super::utils::centered_rect;

pub fn render_error_notification(frame: &mut Frame, ui_state: &UiState) {
    if let Some(ref error_msg) = ui_state.error_message {
        let area = frame.area();

        // Fixed width popup (responsive to screen size)
        let popup_width = 52.min(area.width.saturating_sub(4));
        let inner_width = popup_width.saturating_sub(4).max(1) as usize;

        let error_line_count = error_msg.chars().count().div_ceil(inner_width) as u16;

        // Height: top border (1) + error lines + bottom border (1)
        let popup_area = centered_rect(area, popup_width, 2 + error_line_count.max(1));

        frame.render_widget(Clear, popup_area);

        let error_widget = Paragraph::new(error_msg.to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Error (Esc to dismiss) ")
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                    .style(Style::default().bg(Color::Black)),
            );

        frame.render_widget(error_widget, popup_area);
    }
}

fn form_lines(form: &Form) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let is_focused = i == form.focused;
        let label_style = if is_focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let value = if field.checkbox {
            if field.is_checked() { "[x]".to_string() } else { "[ ]".to_string() }
        } else if field.secret {
            "•".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let cursor = if is_focused && !field.checkbox { "▏" } else { "" };

        lines.push(Line::from(Span::styled(format!("{}:", field.label), label_style)));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(value, Style::default().fg(Color::White)),
            Span::styled(cursor, Style::default().fg(Color::Green)),
        ]));
    }

    lines.push(Line::from(""));
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "Working...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(message) = &form.message {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Green),
        )));
    }
    lines
}

fn form_hint(kind: &FormKind) -> &'static str {
    match kind {
        FormKind::Login => "Enter: log in · Ctrl+R: register · Ctrl+F: forgot password · Esc: quit",
        FormKind::Register => "Enter: create account · Ctrl+L: log in · Esc: back",
        FormKind::ForgotPassword => "Enter: send reset link · Ctrl+L: log in · Esc: back",
        FormKind::ResetPassword { .. } => "Enter: save password · Esc: back",
        FormKind::CreatePlaylist | FormKind::EditPlaylist { .. } => {
            "Enter: save · Tab: next field · Space toggles Public · Esc: cancel"
        }
        FormKind::Comment { .. } => "Enter: post · Esc: cancel",
        FormKind::UploadSong { .. } => "Enter: upload · Tab: next field · Esc: cancel",
    }
}

/// Login/register/password screens take over the content area
pub fn render_auth_screen(frame: &mut Frame, area: Rect, form: &Form) {
    let height = form.fields.len() as u16 * 2 + 5;
    let popup_area = centered_rect(area, 64, height);

    let widget = Paragraph::new(form_lines(form))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(format!(" {} ", form.kind.title()))
                .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                .title_bottom(Line::from(format!(" {} ", form_hint(&form.kind))).centered())
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, popup_area);
}

pub fn render_form_popup(frame: &mut Frame, form: &Form) {
    let height = form.fields.len() as u16 * 2 + 5;
    let popup_area = centered_rect(frame.area(), 64, height);

    frame.render_widget(Clear, popup_area);

    let widget = Paragraph::new(form_lines(form))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} ", form.kind.title()))
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .title_bottom(Line::from(format!(" {} ", form_hint(&form.kind))).centered())
                .padding(Padding::horizontal(1))
                .style(Style::default().bg(Color::Black)),
        );
    frame.render_widget(widget, popup_area);
}

pub fn render_confirm(frame: &mut Frame, prompt: &str) {
    let popup_area = centered_rect(frame.area(), 50, 5);

    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(Span::styled(prompt.to_string(), Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" confirm   "),
            Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]),
    ];

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Confirm ")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .padding(Padding::horizontal(1))
                .style(Style::default().bg(Color::Black)),
        );
    frame.render_widget(widget, popup_area);
}

pub fn render_playlist_picker(frame: &mut Frame, ui_state: &UiState, selected: usize) {
    let area = frame.area();

    let max_name_len = ui_state
        .playlists
        .iter()
        .map(|p| p.name.chars().count() + 4)
        .max()
        .unwrap_or(30);

    let popup_width = (max_name_len as u16 + 6).clamp(35, 60);
    let popup_height = (ui_state.playlists.len() as u16 + 2).max(5);
    let popup_area = centered_rect(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = ui_state
        .playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let style = if i == selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("♫ {}", playlist.name)).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Add to playlist (↑↓ Enter Esc) ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(selected));

    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = vec![
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓", "Move selection"),
        ("Enter", "Open / Play"),
        ("Backspace / Esc", "Go back"),
        ("G or /", "Search (← / → switch filter)"),
        ("L", "Focus playlists"),
        ("U", "Show queue"),
        ("t", "Switch tracks / comments"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("N / P", "Next / Previous track"),
        ("← / →", "Seek backward / forward"),
        ("S", "Toggle shuffle"),
        ("R", "Cycle repeat (off → all → one)"),
        ("+ / -", "Volume up / down"),
        ("", ""),
        ("", "── Library ──"),
        ("x / X", "Like song / playlist"),
        ("K", "Add to queue"),
        ("A", "Add to playlist"),
        ("I", "Song details"),
        ("W", "Download song"),
        ("c", "Comment / New playlist"),
        ("E", "Edit comment / playlist"),
        ("Ctrl+U", "Upload song to playlist"),
        ("D / Delete", "Remove / Delete"),
        ("C", "Clear queue (on queue)"),
        ("", ""),
        ("", "── General ──"),
        ("O", "Log out"),
        ("H / ?", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_area = centered_rect(area, 62, keybindings.len() as u16 + 2);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (H or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
