//! Overlay rendering (error notification, auth form, admin form, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::model::{AdminTab, AuthField, AuthMode, UiState};

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

pub fn render_error_notification(frame: &mut Frame, ui_state: &UiState) {
    if let Some(ref error_msg) = ui_state.error_message {
        let area = frame.area();

        // Fixed width popup (responsive to screen size)
        let popup_width = 52.min(area.width.saturating_sub(4));
        let inner_width = popup_width.saturating_sub(4) as usize; // account for borders

        // Calculate how many lines the error message will take when wrapped
        let error_line_count =
            ((error_msg.chars().count() as f32) / (inner_width as f32)).ceil() as u16;
        let popup_height = (2 + error_line_count.max(1)).min(area.height.saturating_sub(4));

        let popup_area = centered_rect(area, popup_width, popup_height);
        frame.render_widget(Clear, popup_area);

        let error_widget = Paragraph::new(error_msg.to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(ratatui::widgets::Wrap { trim: false })
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

pub fn render_auth_form(frame: &mut Frame, ui_state: &UiState) {
    let Some(form) = &ui_state.auth_form else {
        return;
    };

    let area = frame.area();
    let popup_area = centered_rect(area, 46, 8);
    frame.render_widget(Clear, popup_area);

    let title = match form.mode {
        AuthMode::Login => " Log in (←/→ to switch to register) ",
        AuthMode::Register => " Register (←/→ to switch to log in) ",
    };

    let field_line = |label: &str, value: &str, focused: bool, mask: bool| {
        let label_style = if focused {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let shown = if mask {
            "•".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("{:>10}: ", label), label_style),
            Span::raw(format!("{}{}", shown, cursor)),
        ])
    };

    let mut lines = vec![
        Line::raw(""),
        field_line(
            "Username",
            &form.username,
            form.focus == AuthField::Username,
            false,
        ),
        field_line(
            "Password",
            &form.password,
            form.focus == AuthField::Password,
            true,
        ),
        Line::raw(""),
    ];
    if form.in_flight {
        lines.push(Line::styled(
            "  working...",
            Style::default().fg(Color::Yellow),
        ));
    } else {
        lines.push(Line::styled(
            "  Enter: submit   Esc: cancel",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(widget, popup_area);
}

pub fn render_admin_form(frame: &mut Frame, ui_state: &UiState) {
    let Some(form) = &ui_state.admin_form else {
        return;
    };

    let area = frame.area();
    let height = form.fields.len() as u16 + 6;
    let popup_area = centered_rect(area, 56, height);
    frame.render_widget(Clear, popup_area);

    let entity = match form.target {
        AdminTab::Users => "user",
        AdminTab::Artists => "artist",
        AdminTab::Albums => "album",
        AdminTab::Songs => "song",
    };
    let title = match form.editing_id {
        Some(id) => format!(" Edit {} #{} ", entity, id),
        None => format!(" New {} ", entity),
    };

    let mut lines = vec![Line::raw("")];
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus && !form.in_flight;
        let label_style = if focused {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>16}: ", field.label), label_style),
            Span::raw(format!("{}{}", field.value, cursor)),
        ]));
    }
    lines.push(Line::raw(""));
    if let Some(error) = &form.error {
        lines.push(Line::styled(
            format!("  {}", error),
            Style::default().fg(Color::Red),
        ));
    } else if form.in_flight {
        lines.push(Line::styled(
            "  saving...",
            Style::default().fg(Color::Yellow),
        ));
    } else {
        lines.push(Line::styled(
            "  Tab: next field   Enter: save   Esc: cancel",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = vec![
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓", "Move selection"),
        ("← / →", "Switch category / admin tab"),
        ("Enter", "Select / Play"),
        ("Backspace / Esc", "Go back"),
        ("G", "Focus search"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("N", "Next track"),
        ("P", "Previous track"),
        ("S", "Toggle shuffle"),
        ("R", "Cycle repeat (off → all → one)"),
        ("[ / ]", "Seek back / forward"),
        ("+ / -", "Volume up / down"),
        ("M", "Mute / Unmute"),
        ("", ""),
        ("", "── Account ──"),
        ("L", "Log in / register"),
        ("O", "Log out"),
        ("", ""),
        ("", "── General ──"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_width = 62;
    let popup_height = (keybindings.len() as u16 + 2).min(area.height.saturating_sub(4));
    let popup_area = centered_rect(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
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
