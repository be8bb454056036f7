//! Layout rendering (top bar, sidebar, main area structure)

use ratatui::widgets::Padding;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(28), // Account
        ])
        .split(area);

    let search_style = if ui_state.active_section == ActiveSection::Search {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() {
        "Type to search..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .padding(Padding::horizontal(1))
            .border_style(if ui_state.active_section == ActiveSection::Search {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(search, chunks[0]);

    let (account_text, account_style) = match &ui_state.user {
        Some(user) if user.is_admin => (
            format!("♪ {} (admin)", user.username),
            Style::default().fg(Color::Cyan),
        ),
        Some(user) => (
            format!("♪ {}", user.username),
            Style::default().fg(Color::Cyan),
        ),
        None => (
            "not logged in ('l')".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let account = Paragraph::new(account_text)
        .style(account_style)
        .block(Block::default().borders(Borders::ALL).title(" Account "));
    frame.render_widget(account, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let library_items: Vec<ListItem> = ui_state
        .library_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == ui_state.library_selected
                && ui_state.active_section == ActiveSection::Library
            {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if i == ui_state.library_selected {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(item.label()).style(style)
        })
        .collect();

    let library_border_style = if ui_state.active_section == ActiveSection::Library {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let library = List::new(library_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Library ")
            .padding(Padding::horizontal(1))
            .border_style(library_border_style),
    );
    frame.render_widget(library, area);
}
